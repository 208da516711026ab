//! The shared RNG facility and the biased length sampler used across the
//! operator set.
//!
//! The engine does not carry its own PRNG state; it rides on the process-wide
//! `fastrand` thread-local generator the same way `common::random::FastRand`
//! adapts it to `rand_core::RngCore` for `rand_distr` elsewhere in this
//! crate. What this module adds on top is one-time seed hardening: mix in a
//! few wall-clock microsecond samples so a weak initial entropy source (e.g.
//! a container with little boot-time entropy) doesn't produce a predictable
//! first draw.

use std::{
    collections::hash_map::RandomState,
    hash::{BuildHasher, Hasher},
    sync::Once,
    time::{SystemTime, UNIX_EPOCH},
};

static INIT: Once = Once::new();

/// Seed the global RNG exactly once. Idempotent, cheap to call from every
/// entry point that needs randomness - the `Once` makes repeat calls free.
pub fn ensure_seeded() {
    INIT.call_once(|| {
        let mut seed = os_entropy_seed();
        seed ^= micros() << 0;
        seed ^= micros() << 24;
        seed ^= micros() << 48;
        fastrand::seed(seed);
        log::trace!("mutation RNG seeded");
    });
}

fn micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_micros()))
        .unwrap_or(0)
}

/// Best-effort OS entropy: `RandomState`'s own seed is itself sourced from
/// the OS (`getrandom`/`/dev/urandom` depending on platform) the first time
/// std needs one. Good enough as a seed mix component; this crate makes no
/// cryptographic claims.
fn os_entropy_seed() -> u64 {
    RandomState::new().build_hasher().finish()
}

/// `rnd64() -> u64`
pub fn rnd64() -> u64 {
    ensure_seeded();
    fastrand::u64(..)
}

/// `rndGet(min, max) -> u64`, uniform in `[min, max]` inclusive.
pub fn rnd_get(min: u64, max: u64) -> u64 {
    debug_assert!(min <= max, "rnd_get: min ({min}) > max ({max})");
    ensure_seeded();
    fastrand::u64(min..=max)
}

/// `rndBuf(dst, len)`
pub fn rnd_buf(dst: &mut [u8]) {
    ensure_seeded();
    for byte in dst.iter_mut() {
        *byte = fastrand::u8(..);
    }
}

/// `rndBufPrintable(dst, len)`
pub fn rnd_buf_printable(dst: &mut [u8]) {
    ensure_seeded();
    for byte in dst.iter_mut() {
        *byte = rnd_printable();
    }
}

/// `rndPrintable() -> byte`
pub fn rnd_printable() -> u8 {
    ensure_seeded();
    fastrand::u8(0x20..=0x7e)
}

/// Deterministic printable remap used by `overwrite`/`Bit`/primitives that
/// need to force an arbitrary byte into the printable range without
/// drawing fresh randomness: `b -> (b mod 95) + 32`.
pub fn to_printable(b: u8) -> u8 {
    (b % 95) + 32
}

/// `turnToPrintable(dst, len)`
pub fn turn_to_printable(dst: &mut [u8]) {
    for byte in dst.iter_mut() {
        *byte = to_printable(*byte);
    }
}

/// Biased length sampler: returns a value in `[1, max]` whose
/// density decreases with value (an x^2 shape), so most draws are small.
///
/// `max == 1` always returns `1`. `max == 0` is a programmer error - every
/// caller in this crate guarantees a non-empty buffer before asking for a
/// length within it.
pub fn get_len(max: usize) -> usize {
    assert!(max != 0, "get_len: max == 0");
    if max == 1 {
        return 1;
    }

    let max = max as u128;
    let max2 = max * max;
    let max3 = max2 * max;
    let rnd = rnd_get(1, (max2 - 1) as u64) as u128;

    let ret = (rnd * rnd) / max3 + 1;
    debug_assert!(ret >= 1 && ret <= max);
    ret as usize
}

/// `getOffset()`: a size-clamped offset biased toward the buffer head.
pub fn get_offset(size: usize) -> usize {
    get_len(size) - 1
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn get_len_of_one_is_always_one() {
        for _ in 0..100 {
            assert_eq!(get_len(1), 1);
        }
    }

    #[test]
    fn get_len_never_leaves_bounds() {
        let max = 777;
        for _ in 0..10_000 {
            let len = get_len(max);
            assert!((1..=max).contains(&len));
        }
    }

    #[test]
    fn get_len_mean_is_within_tolerance_of_the_x_squared_distribution() {
        // The x^2-shaped sampler's mean is max/4; a 10% tolerance absorbs sampling noise.
        let max = 1000usize;
        let draws = 200_000;
        let sum: u64 = (0..draws).map(|_| get_len(max) as u64).sum();
        let mean = sum as f64 / draws as f64;
        let expected = max as f64 / 4.0;
        assert!(
            (mean - expected).abs() / expected < 0.1,
            "mean {mean} too far from expected {expected}"
        );
    }

    #[test]
    fn to_printable_stays_in_ascii_range() {
        for b in 0..=u8::MAX {
            assert!((0x20..=0x7e).contains(&to_printable(b)));
        }
    }
}
