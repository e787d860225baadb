//! Word slots in the grid

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a variable in its crossword's variable list
pub type VariableId = usize;

/// Direction a word slot runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Across,
    Down,
}

/// A word slot: a maximal run of open cells starting at `(row, col)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Self {
        Self {
            row,
            col,
            direction,
            length,
        }
    }

    /// Grid coordinates of the `k`-th letter of this slot
    pub fn cell(&self, k: usize) -> (usize, usize) {
        match self.direction {
            Direction::Across => (self.row, self.col + k),
            Direction::Down => (self.row + k, self.col),
        }
    }

    /// Grid coordinates of every cell, in word order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.length).map(move |k| self.cell(k))
    }

    /// Position within the word of a grid cell, if this slot covers it
    pub fn position_of(&self, (row, col): (usize, usize)) -> Option<usize> {
        let k = match self.direction {
            Direction::Across if row == self.row && col >= self.col => col - self.col,
            Direction::Down if col == self.col && row >= self.row => row - self.row,
            _ => return None,
        };
        (k < self.length).then_some(k)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {} : {}", self.row, self.col, self.direction, self.length)
    }
}
