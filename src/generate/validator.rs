//! Independent re-check of a filled grid.
//!
//! Works from grid cells rather than the overlap table: every word is written into a
//! letter grid and any cell that receives two different letters is a conflict.

use crate::crossword::{Crossword, Variable, Vocabulary};
use crate::csp::Assignment;
use std::collections::HashMap;
use std::fmt;

/// Validates assignments against a crossword and its vocabulary
pub struct SolutionValidator<'a> {
    crossword: &'a Crossword,
    vocabulary: &'a Vocabulary,
}

/// Result of solution validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
    pub cells_checked: usize,
}

/// A single broken invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Unassigned {
        variable: Variable,
    },
    LengthMismatch {
        variable: Variable,
        word: String,
    },
    DuplicateWord {
        word: String,
        first: Variable,
        second: Variable,
    },
    UnknownWord {
        variable: Variable,
        word: String,
    },
    CellConflict {
        row: usize,
        col: usize,
        letters: (char, char),
    },
}

impl<'a> SolutionValidator<'a> {
    pub fn new(crossword: &'a Crossword, vocabulary: &'a Vocabulary) -> Self {
        Self {
            crossword,
            vocabulary,
        }
    }

    /// Check completeness, lengths, uniqueness, vocabulary membership and letter agreement
    pub fn validate(&self, assignment: &Assignment) -> ValidationResult {
        let mut violations = Vec::new();
        let mut letters: HashMap<(usize, usize), char> = HashMap::new();
        let mut owners: HashMap<&str, Variable> = HashMap::new();
        let mut cells_checked = 0;

        for id in self.crossword.ids() {
            let variable = *self.crossword.variable(id);
            let Some(word) = assignment.get(id) else {
                violations.push(Violation::Unassigned { variable });
                continue;
            };

            if word.chars().count() != variable.length {
                violations.push(Violation::LengthMismatch {
                    variable,
                    word: word.to_string(),
                });
            }

            if !self.vocabulary.contains(word) {
                violations.push(Violation::UnknownWord {
                    variable,
                    word: word.to_string(),
                });
            }

            if let Some(&first) = owners.get(word) {
                violations.push(Violation::DuplicateWord {
                    word: word.to_string(),
                    first,
                    second: variable,
                });
            } else {
                owners.insert(word, variable);
            }

            for ((row, col), letter) in variable.cells().zip(word.chars()) {
                cells_checked += 1;
                match letters.get(&(row, col)) {
                    Some(&existing) if existing != letter => {
                        violations.push(Violation::CellConflict {
                            row,
                            col,
                            letters: (existing, letter),
                        });
                    }
                    Some(_) => {}
                    None => {
                        letters.insert((row, col), letter);
                    }
                }
            }
        }

        ValidationResult {
            is_valid: violations.is_empty(),
            violations,
            cells_checked,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Unassigned { variable } => write!(f, "{} has no word", variable),
            Violation::LengthMismatch { variable, word } => {
                write!(f, "{} does not fit {}", word, variable)
            }
            Violation::DuplicateWord {
                word,
                first,
                second,
            } => write!(f, "{} is used by both {} and {}", word, first, second),
            Violation::UnknownWord { variable, word } => {
                write!(f, "{} at {} is not in the vocabulary", word, variable)
            }
            Violation::CellConflict { row, col, letters } => write!(
                f,
                "cell ({}, {}) holds both '{}' and '{}'",
                row, col, letters.0, letters.1
            ),
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation Result:")?;
        writeln!(f, "  Valid: {}", self.is_valid)?;
        writeln!(f, "  Cells checked: {}", self.cells_checked)?;
        for violation in &self.violations {
            writeln!(f, "  - {}", violation)?;
        }
        Ok(())
    }
}
