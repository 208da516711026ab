//! The user dictionary token source: an ordered list of byte strings the
//! `Dictionary{Overwrite,Insert}` operators draw from uniformly.

use std::{
    ascii::escape_default,
    fmt::{self, Write},
};

use common::random::FastRand;
use rand_distr::{Distribution, Uniform};

const MIN_LEN: usize = 4;
const MAX_LEN: usize = 64;

#[derive(Debug, Default)]
pub struct Dictionary {
    entries: Vec<Entry>,
    distribution: Option<Uniform<usize>>,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Entry(Vec<u8>);

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self
            .0
            .iter()
            .copied()
            .flat_map(|byte| char::from_u32(byte as u32))
        {
            f.write_char(c)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;

        for c in self
            .0
            .iter()
            .copied()
            .flat_map(escape_default)
            .flat_map(|byte| char::from_u32(byte as u32))
        {
            f.write_char(c)?;
        }

        f.write_char('"')
    }
}

impl Dictionary {
    /// Build a dictionary from the caller-supplied token list
    /// (`MutationConfig::dictionary`). Empty tokens are dropped; they would
    /// turn `overwrite`/`insert` into no-ops anyway.
    pub fn from_tokens<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Vec<u8>>,
    {
        let mut dict = Self::default();
        dict.entries = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t| !t.is_empty())
            .map(Entry)
            .collect();
        dict.rebuild_distribution();
        dict
    }

    /// Heuristically extracts printable ASCII strings out of an arbitrary
    /// block of memory (e.g. the target binary's rodata), the way a
    /// dictionary gets auto-seeded when the user supplies none. Kept as an
    /// opt-in builder for the demonstration binary; the library itself never
    /// calls this.
    pub fn scan_memory_block(&mut self, memory_block: &[u8]) {
        let mut buffer = vec![];
        let mut heuristic_bad = 0;
        let mut heuristic_good = 0;
        let mut valid = false;

        for (idx, byte) in memory_block.iter().copied().enumerate() {
            let valid_byte = matches!(byte, b'\r' | b'\n' | b'\t' | 0x20..=0x7e);
            if valid_byte {
                if byte.is_ascii_alphanumeric()
                    || matches!(byte, b' ' | b'_' | b'-' | b'=' | b'/' | b'.' | b'\'' | b'"')
                {
                    heuristic_good += 1;
                } else if buffer.last() == Some(&b'\r') && byte == b'\n' {
                    // count '\r\n' as one bad char (newline)
                } else {
                    heuristic_bad += 1;
                }

                buffer.push(byte);
                valid = true;
            }

            let last_byte = idx == memory_block.len() - 1;
            if valid && (!valid_byte || last_byte) {
                let entry = Entry(buffer);
                log::trace!("found printable ASCII string: {:?}", entry);

                if entry.0.len() >= MIN_LEN && entry.0.len() <= MAX_LEN && heuristic_bad * 3 < heuristic_good {
                    log::debug!("add dict entry: {:?}", entry);
                    self.entries.push(entry);
                }

                buffer = vec![];
                heuristic_bad = 0;
                heuristic_good = 0;
                valid = false;
            }
        }

        self.entries.sort_unstable();
        self.entries.dedup();
        self.rebuild_distribution();
    }

    fn rebuild_distribution(&mut self) {
        self.distribution = (!self.entries.is_empty()).then(|| Uniform::new(0, self.entries.len()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uniform draw over the dictionary. `None` when empty, the signal
    /// operators use to fall through to `Bytes{Overwrite,Insert}`.
    pub fn random_entry(&self) -> Option<&[u8]> {
        self.distribution
            .map(|dist| dist.sample(&mut FastRand))
            .and_then(|idx| self.entries.get(idx))
            .map(Entry::as_ref)
    }
}

impl AsRef<[u8]> for Entry {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_dictionary_has_no_entry() {
        let dict = Dictionary::default();
        assert_eq!(dict.random_entry(), None);
    }

    #[test]
    fn from_tokens_drops_empty_entries() {
        let dict = Dictionary::from_tokens(vec![b"GET".to_vec(), b"".to_vec(), b"POST".to_vec()]);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn random_entry_is_one_of_the_tokens() {
        let dict = Dictionary::from_tokens(vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        let picked = dict.random_entry().unwrap();
        assert!([&b"a"[..], &b"b"[..], &b"c"[..]].contains(&picked));
    }

    #[test]
    fn scan_memory_block_extracts_good_strings() {
        let mut dict = Dictionary::default();
        let mut blob = vec![0u8, 1, 2, 3];
        blob.extend_from_slice(b"Content-Type");
        blob.extend_from_slice(&[0, 0]);
        dict.scan_memory_block(&blob);
        assert!(dict.random_entry().is_some());
    }
}
