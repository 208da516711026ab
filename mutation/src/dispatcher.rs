//! The entry point: decides how many operators to run this call, handles
//! the empty-buffer bootstrap and the slow-input adaptive policy, and
//! issues the cross-pollination splice before the main operator loop.

use std::sync::atomic::{fence, Ordering};

use anyhow::{Context, Result};
use common::random::FastRand;
use enum_index::IndexEnum;
use enum_index_derive::IndexEnum;
use once_cell::sync::OnceCell;
use rand_distr::{Distribution, WeightedAliasIndex};
use variant_count::VariantCount;

use crate::{
    buffer::Buffer,
    config::MutationConfig,
    host::MutationHost,
    operators::{self, Ctx},
    resize,
    rng,
    timing::CoverageTiming,
    tuning,
};

type OperatorFn = fn(&mut Ctx, bool);

/// One variant per operator, in the order the reference's function table
/// lists them. `Shrink` gets its own selection weight below rather than
/// being repeated in the table, since every `*Insert`/`Expand` grows the
/// buffer and `Shrink` needs to be picked about as often as the rest
/// combined to keep long-run size drift roughly neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IndexEnum, VariantCount)]
enum OperatorKind {
    Shrink,
    Expand,
    Bit,
    IncByte,
    DecByte,
    NegByte,
    AddSub,
    MemSet,
    MemCopyOverwrite,
    MemCopyInsert,
    BytesOverwrite,
    BytesInsert,
    AsciiNumOverwrite,
    AsciiNumInsert,
    ByteRepeatOverwrite,
    ByteRepeatInsert,
    MagicOverwrite,
    MagicInsert,
    DictionaryOverwrite,
    DictionaryInsert,
    ConstFeedbackOverwrite,
    ConstFeedbackInsert,
    RandomOverwrite,
    RandomInsert,
    SpliceOverwrite,
    SpliceInsert,
}

impl OperatorKind {
    fn operator_fn(self) -> OperatorFn {
        match self {
            Self::Shrink => operators::shrink,
            Self::Expand => operators::expand,
            Self::Bit => operators::bit,
            Self::IncByte => operators::inc_byte,
            Self::DecByte => operators::dec_byte,
            Self::NegByte => operators::neg_byte,
            Self::AddSub => operators::add_sub,
            Self::MemSet => operators::mem_set,
            Self::MemCopyOverwrite => operators::mem_copy_overwrite,
            Self::MemCopyInsert => operators::mem_copy_insert,
            Self::BytesOverwrite => operators::bytes_overwrite,
            Self::BytesInsert => operators::bytes_insert,
            Self::AsciiNumOverwrite => operators::ascii_num_overwrite,
            Self::AsciiNumInsert => operators::ascii_num_insert,
            Self::ByteRepeatOverwrite => operators::byte_repeat_overwrite,
            Self::ByteRepeatInsert => operators::byte_repeat_insert,
            Self::MagicOverwrite => operators::magic_overwrite,
            Self::MagicInsert => operators::magic_insert,
            Self::DictionaryOverwrite => operators::dictionary_overwrite,
            Self::DictionaryInsert => operators::dictionary_insert,
            Self::ConstFeedbackOverwrite => operators::const_feedback_overwrite,
            Self::ConstFeedbackInsert => operators::const_feedback_insert,
            Self::RandomOverwrite => operators::random_overwrite,
            Self::RandomInsert => operators::random_insert,
            Self::SpliceOverwrite => operators::splice_overwrite,
            Self::SpliceInsert => operators::splice_insert,
        }
    }
}

static OPERATOR_DISTRIBUTION: OnceCell<WeightedAliasIndex<usize>> = OnceCell::new();

fn operator_distribution() -> Result<&'static WeightedAliasIndex<usize>> {
    OPERATOR_DISTRIBUTION.get_or_try_init(|| {
        let mut weights = vec![1usize; OperatorKind::VARIANT_COUNT];
        weights[OperatorKind::Shrink as usize] = tuning::dispatch::SHRINK_WEIGHT as usize;
        WeightedAliasIndex::new(weights).context("failed to build the operator selection distribution")
    })
}

fn pick_operator() -> OperatorFn {
    let distribution =
        operator_distribution().expect("operator weights are a fixed, valid distribution");
    let index = distribution.sample(&mut FastRand);
    OperatorKind::index_enum(index)
        .expect("distribution only samples in-range indices")
        .operator_fn()
}

fn changes_cnt_for(slow_factor: u32, mutations_per_run: u64) -> u64 {
    use tuning::dispatch::*;

    if slow_factor <= SLOW_FACTOR_FAST_MAX {
        rng::rnd_get(1, mutations_per_run)
    } else if slow_factor <= SLOW_FACTOR_MEDIUM_MAX {
        mutations_per_run.max(MIN_CHANGES_MEDIUM)
    } else if slow_factor <= SLOW_FACTOR_SLOW_MAX {
        mutations_per_run.max(MIN_CHANGES_SLOW)
    } else {
        mutations_per_run.max(MIN_CHANGES_VERY_SLOW)
    }
}

/// The only entry point the fuzz loop calls. `slow_factor` is a
/// host-provided hint: how slowly the current input executes, which
/// drives how many operators get applied in one call so that expensive
/// inputs still get a meaningful shake-up per execution.
pub fn mutate(
    buffer: &mut Buffer,
    config: &MutationConfig,
    host: &mut dyn MutationHost,
    timing: &CoverageTiming,
    slow_factor: u32,
) {
    if config.mutations_per_run() == 0 {
        return;
    }

    let printable = config.only_printable();

    if buffer.size() == 0 {
        resize::resize(buffer, printable);
    }

    let changes_cnt = changes_cnt_for(slow_factor, config.mutations_per_run());

    let now_ms = host.now_ms();
    if timing.is_stale(now_ms, tuning::dispatch::STALE_COV_MS)
        && rng::rnd_get(0, 2) < tuning::dispatch::STALE_SPLICE_CHANCE_OF_3
    {
        let mut ctx = Ctx {
            buffer: &mut *buffer,
            config,
            host: &mut *host,
        };
        if rng::rnd64() & 1 == 0 {
            operators::splice_overwrite(&mut ctx, printable);
        } else {
            operators::splice_insert(&mut ctx, printable);
        }
    }

    for _ in 0..changes_cnt {
        let mut ctx = Ctx {
            buffer: &mut *buffer,
            config,
            host: &mut *host,
        };
        let operator = pick_operator();
        operator(&mut ctx, printable);
    }

    // Publishes the final writes to readers that observe the buffer from a
    // sibling thread or process (e.g. an executor sharing it via mapping).
    fence(Ordering::Release);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct NoPrior;
    impl MutationHost for NoPrior {
        fn fetch_random_prior(&mut self) -> Option<Vec<u8>> {
            None
        }
    }

    #[test]
    fn zero_mutations_per_run_is_a_true_noop() {
        let mut buf = Buffer::from_bytes(b"unchanged", 64);
        let before = buf.clone();
        let config = MutationConfig::new(64, 0, false);
        let mut host = NoPrior;
        let timing = CoverageTiming::new(0);
        mutate(&mut buf, &config, &mut host, &timing, 0);
        assert_eq!(buf, before);
    }

    #[test]
    fn empty_buffer_bootstraps_to_nonempty() {
        let mut buf = Buffer::with_capacity(64);
        let config = MutationConfig::new(64, 3, true);
        let mut host = NoPrior;
        let timing = CoverageTiming::new(0);
        mutate(&mut buf, &config, &mut host, &timing, 0);
        assert!(buf.size() >= 1);
        assert!(buf.as_slice().iter().all(|&b| (0x20..=0x7e).contains(&b)));
    }

    #[test]
    fn size_never_exceeds_capacity_over_many_runs() {
        let mut buf = Buffer::from_bytes(&[1u8; 32], 64);
        let config = MutationConfig::new(64, 20, false);
        let mut host = NoPrior;
        let timing = CoverageTiming::new(0);
        for _ in 0..200 {
            mutate(&mut buf, &config, &mut host, &timing, 0);
            assert!(buf.size() <= 64);
        }
    }

    #[test]
    fn printable_mode_preserves_printable_invariant() {
        let mut buf = Buffer::from_bytes(b"hello world", 64);
        let config = MutationConfig::new(64, 30, true);
        let mut host = NoPrior;
        let timing = CoverageTiming::new(0);
        for _ in 0..100 {
            mutate(&mut buf, &config, &mut host, &timing, 0);
        }
        assert!(buf.as_slice().iter().all(|&b| (0x20..=0x7e).contains(&b)));
    }
}
