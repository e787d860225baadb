//! File I/O for structure and word files

use super::{PuzzleError, Structure, Vocabulary};
use anyhow::{Context, Result};
use std::path::Path;

/// Load a structure from a text file.
/// Format: each line is a row, with '_' for open cells and '#' for blocked cells
pub fn load_structure_from_file<P: AsRef<Path>>(path: P) -> Result<Structure> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read structure file: {}", path.as_ref().display()))?;

    parse_structure_from_string(&content)
        .with_context(|| format!("Failed to parse structure file: {}", path.as_ref().display()))
}

/// Parse a structure from its text representation
pub fn parse_structure_from_string(content: &str) -> Result<Structure, PuzzleError> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();

    let mut cells = Vec::with_capacity(lines.len());

    for (row, line) in lines.iter().enumerate() {
        let row_cells = line
            .chars()
            .enumerate()
            .map(|(col, ch)| match ch {
                '_' => Ok(true),
                '#' => Ok(false),
                _ => Err(PuzzleError::InvalidCell { ch, row, col }),
            })
            .collect::<Result<Vec<bool>, _>>()?;
        cells.push(row_cells);
    }

    Structure::from_cells(cells)
}

/// Load a word list, one word per line
pub fn load_vocabulary_from_file<P: AsRef<Path>>(path: P) -> Result<Vocabulary> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read words file: {}", path.as_ref().display()))?;

    Ok(parse_vocabulary_from_string(&content))
}

pub fn parse_vocabulary_from_string(content: &str) -> Vocabulary {
    Vocabulary::new(content.lines())
}

/// Write a small sample puzzle for `setup`
pub fn create_example_puzzles<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let structure = "#___#\n#_##_\n#_##_\n#_##_\n#____\n";
    std::fs::write(dir.join("structure0.txt"), structure)
        .context("Failed to write structure0.txt")?;

    let words = "one\ntwo\nthree\nfour\nfive\nsix\nseven\neight\nnine\nten\n";
    std::fs::write(dir.join("words0.txt"), words).context("Failed to write words0.txt")?;

    Ok(())
}
