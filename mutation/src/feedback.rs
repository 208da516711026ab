//! The comparison-feedback snapshot: a cross-thread token source the
//! coverage instrumentation fills in and the engine only ever reads.
//!
//! Every field is read through a relaxed-ordering atomic load. A torn read
//! is tolerated by construction: `cnt` is always clamped against the
//! backing array's real length before indexing, and a chosen entry whose
//! `len` reads back as `0` is treated the same as "no feedback yet" rather
//! than an error.

use std::sync::atomic::{AtomicU32, Ordering};

/// One feedback-harvested token: up to `MAX_VAL_LEN` bytes, `len` of which
/// are significant. `val` itself is fixed-size and never mutated by the
/// engine - only the instrumentation side writes it, which this type does
/// not model since the engine is read-only with respect to `CmpFeedback`.
pub const MAX_VAL_LEN: usize = 32;

pub struct FeedbackEntry {
    pub val: [u8; MAX_VAL_LEN],
    pub len: AtomicU32,
}

impl FeedbackEntry {
    pub const fn empty() -> Self {
        Self {
            val: [0; MAX_VAL_LEN],
            len: AtomicU32::new(0),
        }
    }
}

impl Default for FeedbackEntry {
    fn default() -> Self {
        Self::empty()
    }
}

/// Snapshot of comparison-feedback tokens harvested by the target's
/// instrumentation. Shared (likely via a memory mapping) with whatever
/// process or thread updates it; the mutation engine holds only a shared
/// reference and never writes through it.
pub struct CmpFeedback {
    cnt: AtomicU32,
    val_arr: Vec<FeedbackEntry>,
}

impl CmpFeedback {
    pub fn new(capacity: usize) -> Self {
        let mut val_arr = Vec::with_capacity(capacity);
        val_arr.resize_with(capacity, FeedbackEntry::empty);
        Self {
            cnt: AtomicU32::new(0),
            val_arr,
        }
    }

    pub fn capacity(&self) -> usize {
        self.val_arr.len()
    }

    /// Atomic read of the valid-entry count, clamped to the backing array's
    /// length so a racing writer can never make the engine index past it.
    fn len(&self) -> usize {
        (self.cnt.load(Ordering::Relaxed) as usize).min(self.val_arr.len())
    }

    /// Uniformly choose a feedback token. Returns `None` when there are no
    /// valid entries, or when the chosen entry's `len` reads back as `0`
    /// (a benign race with the writer) - either case is the fall-through
    /// signal the `ConstFeedback*` operators use.
    pub fn random_entry(&self) -> Option<&[u8]> {
        let len = self.len();
        if len == 0 {
            return None;
        }

        let idx = crate::rng::rnd_get(0, (len - 1) as u64) as usize;
        let entry = &self.val_arr[idx];
        let entry_len = (entry.len.load(Ordering::Relaxed) as usize).min(MAX_VAL_LEN);
        if entry_len == 0 {
            return None;
        }

        Some(&entry.val[..entry_len])
    }

    /// Test/host-side helper to publish a token; production writers live
    /// outside this crate and write through their own shared mapping.
    #[cfg(test)]
    fn set(&mut self, idx: usize, bytes: &[u8]) {
        let entry = &mut self.val_arr[idx];
        let len = bytes.len().min(MAX_VAL_LEN);
        entry.val[..len].copy_from_slice(&bytes[..len]);
        entry.len.store(len as u32, Ordering::Relaxed);
        if idx as u32 >= self.cnt.load(Ordering::Relaxed) {
            self.cnt.store(idx as u32 + 1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_feedback_has_no_entry() {
        let fb = CmpFeedback::new(8);
        assert_eq!(fb.random_entry(), None);
    }

    #[test]
    fn cnt_is_clamped_to_capacity() {
        let fb = CmpFeedback::new(4);
        fb.cnt.store(1000, Ordering::Relaxed);
        // every entry still has len == 0, so this must fall through, not panic.
        assert_eq!(fb.random_entry(), None);
    }

    #[test]
    fn published_entry_is_visible() {
        // idx 0 so `cnt` becomes 1 and `random_entry`'s draw is forced to it;
        // a higher idx would leave lower-indexed zero-length entries in the
        // draw range, making the assertion flaky.
        let mut fb = CmpFeedback::new(4);
        fb.set(0, b"needle");
        assert_eq!(fb.random_entry(), Some(&b"needle"[..]));
    }

    #[test]
    fn zero_length_entry_is_treated_as_absent() {
        let fb = CmpFeedback::new(1);
        fb.cnt.store(1, Ordering::Relaxed);
        assert_eq!(fb.random_entry(), None);
    }
}
