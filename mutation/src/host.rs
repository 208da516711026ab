//! The callback surface the engine calls on the enclosing fuzz loop.

/// Supplies prior corpus inputs for the `Splice*` operators. The fuzz loop
/// implements this over its own corpus store; the engine never sees more
/// of the corpus than one random sample per splice attempt.
pub trait MutationHost {
    /// A random prior input, or `None` if the corpus has nothing to offer
    /// yet (e.g. the very first run). Splice operators fall through to
    /// their `Bytes*` counterpart in that case.
    fn fetch_random_prior(&mut self) -> Option<Vec<u8>>;

    /// Wall-clock in milliseconds. Defaults to the process clock; hosts
    /// that need a virtual/deterministic clock (tests, replay) override it.
    fn now_ms(&self) -> u64 {
        common::time::now_ms()
    }
}
