//! Configuration management for the crossword filler

pub mod settings;

pub use settings::{CliOverrides, InputConfig, OutputConfig, OutputFormat, SearchConfig, Settings};
