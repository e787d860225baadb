//! Variable-to-word assignments

use crate::crossword::{Crossword, VariableId};
use std::collections::BTreeMap;

/// A partial or complete mapping from variables to chosen words
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    words: BTreeMap<VariableId, String>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: VariableId) -> Option<&str> {
        self.words.get(&variable).map(String::as_str)
    }

    pub fn contains(&self, variable: VariableId) -> bool {
        self.words.contains_key(&variable)
    }

    /// Bind a variable, returning its previous word
    pub fn insert(&mut self, variable: VariableId, word: String) -> Option<String> {
        self.words.insert(variable, word)
    }

    pub fn remove(&mut self, variable: VariableId) -> Option<String> {
        self.words.remove(&variable)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Bindings in variable id order
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &str)> {
        self.words.iter().map(|(&id, word)| (id, word.as_str()))
    }

    /// Whether every variable of the crossword has a word
    pub fn is_complete(&self, crossword: &Crossword) -> bool {
        crossword.ids().all(|id| self.contains(id))
    }

    /// Letters per grid cell; cells not covered by any bound word are `None`
    pub fn letter_grid(&self, crossword: &Crossword) -> Vec<Vec<Option<char>>> {
        let mut letters = vec![vec![None; crossword.width()]; crossword.height()];
        for (id, word) in self.iter() {
            let variable = crossword.variable(id);
            for ((row, col), letter) in variable.cells().zip(word.chars()) {
                letters[row][col] = Some(letter);
            }
        }
        letters
    }
}
