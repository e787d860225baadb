//! Configuration settings for the crossword filler

use crate::csp::SearchBudget;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub search: SearchConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Split the root of the search across the rayon pool
    pub parallel: bool,
    pub max_nodes: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub structure_file: PathBuf,
    pub words_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Where to save the filled grid; printed only when unset
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                parallel: false,
                max_nodes: None,
                timeout_seconds: None,
            },
            input: InputConfig {
                structure_file: PathBuf::from("data/structure0.txt"),
                words_file: PathBuf::from("data/words0.txt"),
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_file: None,
            },
        }
    }
}

impl SearchConfig {
    /// Search limits described by this configuration
    pub fn budget(&self) -> SearchBudget {
        SearchBudget {
            max_nodes: self.max_nodes,
            timeout: self.timeout_seconds.map(Duration::from_secs),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.search.max_nodes == Some(0) {
            anyhow::bail!("Node budget must be positive");
        }

        if self.search.timeout_seconds == Some(0) {
            anyhow::bail!("Timeout must be positive");
        }

        if !self.input.structure_file.exists() {
            anyhow::bail!(
                "Structure file does not exist: {}",
                self.input.structure_file.display()
            );
        }

        if !self.input.words_file.exists() {
            anyhow::bail!("Words file does not exist: {}", self.input.words_file.display());
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(ref structure_file) = cli_overrides.structure_file {
            self.input.structure_file = structure_file.clone();
        }
        if let Some(ref words_file) = cli_overrides.words_file {
            self.input.words_file = words_file.clone();
        }
        if let Some(ref output_file) = cli_overrides.output_file {
            self.output.output_file = Some(output_file.clone());
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if cli_overrides.parallel {
            self.search.parallel = true;
        }
        if let Some(max_nodes) = cli_overrides.max_nodes {
            self.search.max_nodes = Some(max_nodes);
        }
        if let Some(timeout_seconds) = cli_overrides.timeout_seconds {
            self.search.timeout_seconds = Some(timeout_seconds);
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub structure_file: Option<PathBuf>,
    pub words_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub parallel: bool,
    pub max_nodes: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_yaml_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config/default.yaml");

        let mut settings = Settings::default();
        settings.search.max_nodes = Some(1000);
        settings.output.format = OutputFormat::Json;
        settings.to_file(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_cli_overrides() {
        let mut settings = Settings::default();
        settings.merge_with_cli(&CliOverrides {
            structure_file: Some(PathBuf::from("grid.txt")),
            parallel: true,
            timeout_seconds: Some(5),
            ..Default::default()
        });

        assert_eq!(settings.input.structure_file, PathBuf::from("grid.txt"));
        assert_eq!(settings.input.words_file, PathBuf::from("data/words0.txt"));
        assert!(settings.search.parallel);
        assert_eq!(
            settings.search.budget(),
            SearchBudget::unlimited().with_timeout(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_validation() {
        let temp_dir = tempdir().unwrap();
        let structure = temp_dir.path().join("structure.txt");
        let words = temp_dir.path().join("words.txt");
        std::fs::write(&structure, "__\n").unwrap();
        std::fs::write(&words, "on\n").unwrap();

        let mut settings = Settings::default();
        settings.input.structure_file = structure;
        assert!(settings.validate().is_err());

        settings.input.words_file = words;
        assert!(settings.validate().is_ok());

        settings.search.max_nodes = Some(0);
        assert!(settings.validate().is_err());
    }
}
