//! Grid geometry: which cells are open for letters and which are blocked

use super::PuzzleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Open/blocked layout of a crossword grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub width: usize,
    pub height: usize,
    /// Row-major, `true` for open cells
    pub cells: Vec<bool>,
}

impl Structure {
    /// Create a structure from rows of open flags
    pub fn from_cells(cells: Vec<Vec<bool>>) -> Result<Self, PuzzleError> {
        if cells.is_empty() {
            return Err(PuzzleError::EmptyStructure);
        }

        let height = cells.len();
        let width = cells[0].len();

        if width == 0 {
            return Err(PuzzleError::EmptyRow { row: 0 });
        }

        for (row, cells_in_row) in cells.iter().enumerate() {
            if cells_in_row.len() != width {
                return Err(PuzzleError::RaggedRow {
                    row,
                    width: cells_in_row.len(),
                    expected: width,
                });
            }
        }

        Ok(Self {
            width,
            height,
            cells: cells.into_iter().flatten().collect(),
        })
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    /// Whether a cell can hold a letter. Out of bounds cells count as blocked.
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.cells[self.index(row, col)]
    }

    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|&&open| open).count()
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                write!(f, "{}", if self.is_open(row, col) { '_' } else { '#' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_from_cells() {
        let cells = vec![
            vec![true, true, false],
            vec![false, true, true],
        ];
        let structure = Structure::from_cells(cells).unwrap();
        assert_eq!(structure.width, 3);
        assert_eq!(structure.height, 2);
        assert_eq!(structure.open_count(), 4);
        assert!(structure.is_open(1, 2));
        assert!(!structure.is_open(0, 2));
        assert!(!structure.is_open(5, 5));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let cells = vec![vec![true, true], vec![true]];
        assert_eq!(
            Structure::from_cells(cells),
            Err(PuzzleError::RaggedRow { row: 1, width: 1, expected: 2 })
        );
    }

    #[test]
    fn test_empty_structure_rejected() {
        assert_eq!(Structure::from_cells(vec![]), Err(PuzzleError::EmptyStructure));
        assert_eq!(
            Structure::from_cells(vec![vec![]]),
            Err(PuzzleError::EmptyRow { row: 0 })
        );
    }

    #[test]
    fn test_display() {
        let structure = Structure::from_cells(vec![vec![false, true], vec![false, false]]).unwrap();
        assert_eq!(structure.open_count(), 1);
        assert_eq!(structure.to_string(), "#_\n##\n");
    }
}
