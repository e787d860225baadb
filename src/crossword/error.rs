//! Structural errors raised while building a puzzle model

use thiserror::Error;

/// A malformed grid description
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("structure is empty or contains no rows")]
    EmptyStructure,

    #[error("structure row {row} is empty")]
    EmptyRow { row: usize },

    #[error("row {row} has width {width}, expected {expected} (all rows must have the same width)")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },

    #[error("invalid character '{ch}' at position ({row}, {col}); only '_' and '#' are allowed")]
    InvalidCell { ch: char, row: usize, col: usize },
}
