//! Crossword Constraint Solver
//!
//! This library fills crossword grids from a word list by treating every slot as a
//! constraint-satisfaction variable: node and arc consistency prune the candidate words,
//! then a heuristic backtracking search completes the grid.

pub mod config;
pub mod crossword;
pub mod csp;
pub mod generate;
pub mod utils;

pub use config::Settings;
pub use generate::{CrosswordProblem, FillOutcome, FillReport, Solution};

use anyhow::Result;

/// Main entry point for filling a crossword described by the settings
pub fn fill_crossword(settings: Settings) -> Result<FillReport> {
    let problem = CrosswordProblem::new(settings)?;
    problem.solve()
}
