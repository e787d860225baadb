//! Candidate word list

use log::debug;
use std::collections::BTreeSet;

/// Normalized set of candidate words.
///
/// Entries are trimmed and upper-cased. Anything that is not a run of ASCII letters cannot be
/// written into a grid cell by cell, so it is dropped instead of rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    words: BTreeSet<String>,
}

impl Vocabulary {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::default();
        for word in words {
            vocabulary.insert(word.as_ref());
        }
        vocabulary
    }

    /// Add a word, returning whether it was accepted as a new entry
    pub fn insert(&mut self, word: &str) -> bool {
        match Self::normalize(word) {
            Some(normalized) => self.words.insert(normalized),
            None => {
                if !word.trim().is_empty() {
                    debug!("Skipping vocabulary entry {:?}: not purely alphabetic", word);
                }
                false
            }
        }
    }

    /// Canonical form of a word, or `None` if it can never fill a slot
    pub fn normalize(word: &str) -> Option<String> {
        let word = word.trim();
        if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        Some(word.to_ascii_uppercase())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let vocabulary = Vocabulary::new(["cat", " Dog ", "ACE", "cat"]);
        assert_eq!(vocabulary.len(), 3);
        assert!(vocabulary.contains("CAT"));
        assert!(vocabulary.contains("DOG"));
        assert!(!vocabulary.contains("cat"));
    }

    #[test]
    fn test_invalid_entries_are_excluded() {
        let vocabulary = Vocabulary::new(["o'clock", "two words", "", "  ", "café", "ok"]);
        assert_eq!(vocabulary.iter().collect::<Vec<_>>(), vec!["OK"]);
    }
}
