//! The runtime, caller-supplied configuration the dispatcher and operator
//! set read from for the lifetime of the engine.

use crate::{dict::Dictionary, feedback::CmpFeedback};

/// Process-wide, read-only once constructed. The fuzz loop builds one of
/// these at startup and shares it (by reference) across every worker.
pub struct MutationConfig {
    max_input_sz: usize,
    mutations_per_run: u64,
    only_printable: bool,
    dictionary: Dictionary,
    cmp_feedback: Option<CmpFeedback>,
}

impl MutationConfig {
    /// `max_input_sz` must be `>= 1`.
    pub fn new(max_input_sz: usize, mutations_per_run: u64, only_printable: bool) -> Self {
        assert!(max_input_sz >= 1, "max_input_sz must be >= 1");
        Self {
            max_input_sz,
            mutations_per_run,
            only_printable,
            dictionary: Dictionary::default(),
            cmp_feedback: None,
        }
    }

    pub fn with_dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn with_cmp_feedback(mut self, cmp_feedback: CmpFeedback) -> Self {
        self.cmp_feedback = Some(cmp_feedback);
        self
    }

    pub fn max_input_sz(&self) -> usize {
        self.max_input_sz
    }

    pub fn mutations_per_run(&self) -> u64 {
        self.mutations_per_run
    }

    pub fn only_printable(&self) -> bool {
        self.only_printable
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn cmp_feedback(&self) -> Option<&CmpFeedback> {
        self.cmp_feedback.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_have_no_dictionary_or_feedback() {
        let config = MutationConfig::new(64, 8, false);
        assert!(config.dictionary().is_empty());
        assert!(config.cmp_feedback().is_none());
    }

    #[test]
    #[should_panic(expected = "max_input_sz")]
    fn rejects_zero_capacity() {
        MutationConfig::new(0, 8, false);
    }
}
