//! Solved grid representation handed to renderers and written to disk

use super::FillStatistics;
use crate::crossword::{Crossword, Variable};
use crate::csp::Assignment;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A filled crossword
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub width: usize,
    pub height: usize,
    /// One string per row: letters for filled cells, '#' for blocked cells
    pub grid: Vec<String>,
    pub entries: Vec<Entry>,
    pub statistics: FillStatistics,
}

/// A word placed in a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(flatten)]
    pub variable: Variable,
    pub word: String,
}

impl Solution {
    pub fn new(crossword: &Crossword, assignment: &Assignment, statistics: FillStatistics) -> Self {
        let letters = assignment.letter_grid(crossword);
        let grid = letters
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(col, letter)| match letter {
                        _ if !crossword.structure().is_open(row, col) => '#',
                        Some(letter) => *letter,
                        None => ' ',
                    })
                    .collect()
            })
            .collect();

        let entries = assignment
            .iter()
            .map(|(id, word)| Entry {
                variable: *crossword.variable(id),
                word: word.to_string(),
            })
            .collect();

        Self {
            width: crossword.width(),
            height: crossword.height(),
            grid,
            entries,
            statistics,
        }
    }

    /// Rebuild the assignment against a crossword; every entry must name one of its slots
    pub fn to_assignment(&self, crossword: &Crossword) -> Result<Assignment> {
        let mut assignment = Assignment::new();
        for entry in &self.entries {
            let id = crossword
                .id_of(&entry.variable)
                .with_context(|| format!("Solution names unknown slot {}", entry.variable))?;
            if assignment.insert(id, entry.word.clone()).is_some() {
                anyhow::bail!("Solution fills slot {} twice", entry.variable);
            }
        }
        Ok(assignment)
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save to file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write solution: {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Load from file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read solution: {}", path.as_ref().display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse solution: {}", path.as_ref().display()))
    }
}
