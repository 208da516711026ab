//! The size controller: a categorical draw that grows, shrinks, or leaves
//! the buffer's logical size untouched.

use crate::{buffer::Buffer, rng, tuning::resize::BUCKET_COUNT};

/// Picks a new size from 33 weighted buckets (mostly "do nothing", a few
/// small nudges, rarely a full re-roll or a big jump) and resizes `buffer`
/// to it. When growing under `printable`, the newly exposed tail is filled
/// with ASCII space.
pub fn resize(buffer: &mut Buffer, printable: bool) {
    let old_size = buffer.size() as i64;
    let max_input_sz = buffer.capacity() as i64;

    let choice = rng::rnd_get(0, BUCKET_COUNT - 1);
    let new_size = match choice {
        0 => rng::rnd_get(1, max_input_sz as u64) as i64,
        1..=4 => old_size + rng::rnd_get(0, 8) as i64,
        5 => old_size + rng::rnd_get(9, 128) as i64,
        6..=9 => old_size - rng::rnd_get(0, 8) as i64,
        10 => old_size - rng::rnd_get(9, 128) as i64,
        _ => old_size,
    };

    let new_size = new_size.clamp(1, max_input_sz) as usize;
    buffer.set_size(new_size);

    if new_size > old_size as usize && printable {
        buffer.fill(old_size as usize, new_size - old_size as usize, b' ');
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn never_exceeds_capacity() {
        let mut buf = Buffer::from_bytes(&[1; 64], 64);
        for _ in 0..200 {
            resize(&mut buf, false);
            assert!(buf.size() <= 64);
            assert!(buf.size() >= 1);
        }
    }

    #[test]
    fn growth_fills_tail_when_printable() {
        let mut buf = Buffer::with_capacity(256);
        buf.set_size(4);
        buf.as_mut_slice().copy_from_slice(b"abcd");
        for _ in 0..500 {
            let before = buf.size();
            resize(&mut buf, true);
            if buf.size() > before {
                assert!(buf.as_slice()[before..].iter().all(|&b| b == b' '));
                break;
            }
        }
    }
}
