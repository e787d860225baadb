//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::crossword::{Direction, Structure};
use crate::generate::{FillOutcome, Solution};
use anyhow::{Context, Result};
use std::path::Path;

/// Format filled grids for display
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// One line per row, blocked cells drawn as blocks
    pub fn format_grid(solution: &Solution) -> String {
        let mut output = String::new();
        for row in &solution.grid {
            output.extend(row.chars().map(|c| if c == '#' { '█' } else { c }));
            output.push('\n');
        }
        output
    }

    /// Grid followed by the across and down word lists
    pub fn format_solution(solution: &Solution) -> String {
        let mut output = Self::format_grid(solution);

        for (heading, direction) in [("Across", Direction::Across), ("Down", Direction::Down)] {
            let entries: Vec<_> = solution
                .entries
                .iter()
                .filter(|entry| entry.variable.direction == direction)
                .collect();
            if entries.is_empty() {
                continue;
            }

            output.push_str(&format!("\n{}:\n", heading));
            for entry in entries {
                output.push_str(&format!(
                    "  ({}, {}) {}\n",
                    entry.variable.row, entry.variable.col, entry.word
                ));
            }
        }

        output
    }

    /// Format an unfilled structure with coordinates
    pub fn format_structure_with_coords(structure: &Structure) -> String {
        let mut output = String::new();

        // Header with column numbers
        output.push_str("   ");
        for col in 0..structure.width {
            output.push_str(&format!("{:2}", col % 10));
        }
        output.push('\n');

        // Rows with row numbers
        for row in 0..structure.height {
            output.push_str(&format!("{:2} ", row));
            for col in 0..structure.width {
                output.push_str(if structure.is_open(row, col) { "··" } else { "██" });
            }
            output.push('\n');
        }

        output
    }

    /// Write a solution in the requested format
    pub fn save_solution<P: AsRef<Path>>(
        solution: &Solution,
        path: P,
        format: OutputFormat,
    ) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        match format {
            OutputFormat::Text => {
                std::fs::write(path, Self::format_solution(solution))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            OutputFormat::Json => solution.save_to_file(path)?,
        }

        Ok(())
    }
}

/// Colored console messages; plain text when `NO_COLOR` is set or the terminal is dumb
pub struct ColorOutput;

impl ColorOutput {
    pub fn colored(text: &str, color: Color) -> String {
        let plain = std::env::var_os("NO_COLOR").is_some()
            || std::env::var("TERM").is_ok_and(|term| term == "dumb");
        if plain {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", color as u8, text)
        }
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    /// Headline for a fill attempt
    pub fn fill_outcome(outcome: &FillOutcome) -> String {
        match outcome {
            FillOutcome::Filled(assignment) => {
                Self::success(&format!("Filled {} slots.", assignment.len()))
            }
            FillOutcome::NoSolution => Self::warning("No solution."),
            FillOutcome::BudgetExhausted => {
                Self::warning("Search budget exhausted before a fill was found.")
            }
        }
    }
}

/// ANSI foreground codes
#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red = 31,
    Green = 32,
    Yellow = 33,
}
