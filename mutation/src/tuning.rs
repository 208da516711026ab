//! Compile-time tuning constants for the operator set and dispatcher.
//!
//! Everything a caller configures at runtime lives in
//! [`crate::config::MutationConfig`] instead; this module only holds the
//! numbers that are part of how the engine mutates, not what it mutates.

pub mod block {
    /// Upper bound on the length any single-block operator (`MemSet`,
    /// `MemCopy*`, `Random*`, `Splice*`, ...) will touch in one call.
    pub const MAX_BLOCK: usize = 512;
}

pub mod byte_repeat {
    /// `ByteRepeatOverwrite`/`Insert` reuse `block::MAX_BLOCK` for their
    /// fill length; no separate cap is needed.
    pub const MIN_BYTES: usize = 1;
    pub const MAX_BYTES: usize = 2;
}

pub mod ascii_num {
    /// A 64-bit signed integer formatted in decimal never needs more than
    /// 20 characters (`-9223372036854775808`); the reference pads/truncates
    /// to 19, matching `%-19" PRId64`.
    pub const FIELD_WIDTH: usize = 19;
    pub const MIN_PREFIX: usize = 2;
    pub const MAX_PREFIX: usize = 8;
}

pub mod expand {
    /// Small-growth draws dominate `Expand` 15-to-1 over a full-range draw,
    /// keeping most mutations incremental.
    pub const SMALL_GROWTH_CHANCE_OF_16: u64 = 15;
    pub const SMALL_GROWTH_MAX: usize = 16;
}

pub mod shrink {
    /// Mirrors `expand::SMALL_GROWTH_CHANCE_OF_16`: most shrinks trim a
    /// small suffix rather than collapsing the buffer.
    pub const SMALL_SHRINK_CHANCE_OF_16: u64 = 15;
    pub const SMALL_SHRINK_MAX: usize = 16;
}

pub mod add_sub {
    /// Per-width symmetric delta range for `AddSub`, indexed by
    /// `log2(width)`.
    pub const RANGE: [u64; 4] = [16, 4096, 1 << 20, 1 << 28];
}

pub mod dispatch {
    /// Mutation-count floors per `slow_factor` bracket (spec's dispatcher
    /// step 3).
    pub const SLOW_FACTOR_FAST_MAX: u32 = 2;
    pub const SLOW_FACTOR_MEDIUM_MAX: u32 = 4;
    pub const SLOW_FACTOR_SLOW_MAX: u32 = 9;

    pub const MIN_CHANGES_MEDIUM: u64 = 5;
    pub const MIN_CHANGES_SLOW: u64 = 7;
    pub const MIN_CHANGES_VERY_SLOW: u64 = 10;

    /// A splice is considered before the main loop once this many
    /// milliseconds have passed without a coverage gain.
    pub const STALE_COV_MS: u64 = 1_000;
    /// Conditioned on staleness, a splice fires with this probability
    /// (expressed as a 1-in-N chance via `rnd_get(0, N-1) != 0`).
    pub const STALE_SPLICE_CHANCE_OF_3: u64 = 2;

    /// `Shrink` is listed this many times in the operator table to
    /// counterbalance the many growth-biased operators.
    pub const SHRINK_WEIGHT: usize = 4;
}

pub mod resize {
    /// Bucket count for the `Resize` categorical draw (spec §4.4).
    pub const BUCKET_COUNT: u64 = 33;
}
