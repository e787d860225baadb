//! Per-variable candidate sets and the unary (length) constraint

use crate::crossword::{Crossword, VariableId, Vocabulary};
use log::debug;
use std::collections::BTreeSet;

/// Current candidate words for each variable, indexed by `VariableId`.
///
/// Sets are ordered so that iteration, and therefore every tie-break built on it, is
/// lexicographic and reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStore {
    domains: Vec<BTreeSet<String>>,
}

impl DomainStore {
    /// Every variable starts out with the full vocabulary
    pub fn initialize(vocabulary: &Vocabulary, crossword: &Crossword) -> Self {
        let all_words: BTreeSet<String> = vocabulary.iter().map(str::to_owned).collect();
        Self {
            domains: vec![all_words; crossword.variable_count()],
        }
    }

    /// Drop every word whose length differs from its variable's length.
    /// Returns the number of words removed.
    pub fn enforce_node_consistency(&mut self, crossword: &Crossword) -> usize {
        let mut removed = 0;
        for id in crossword.ids() {
            let length = crossword.variable(id).length;
            let wrong_length: Vec<String> = self.domains[id]
                .iter()
                .filter(|word| word.len() != length)
                .cloned()
                .collect();
            removed += self.remove_all(id, &wrong_length);
        }
        debug!("Node consistency removed {} candidates", removed);
        removed
    }

    pub fn domain(&self, variable: VariableId) -> &BTreeSet<String> {
        &self.domains[variable]
    }

    /// Number of candidates left for a variable
    pub fn size(&self, variable: VariableId) -> usize {
        self.domains[variable].len()
    }

    /// Sum of all domain sizes
    pub fn total_size(&self) -> usize {
        self.domains.iter().map(BTreeSet::len).sum()
    }

    pub fn variable_count(&self) -> usize {
        self.domains.len()
    }

    pub fn has_empty_domain(&self) -> bool {
        self.domains.iter().any(BTreeSet::is_empty)
    }

    /// Remove a batch of words from one domain, returning how many were present
    pub(crate) fn remove_all(&mut self, variable: VariableId, words: &[String]) -> usize {
        let domain = &mut self.domains[variable];
        words.iter().filter(|word| domain.remove(*word)).count()
    }
}
