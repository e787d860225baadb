//! Main CLI application for the crossword solver

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossword_csp::{
    config::{CliOverrides, OutputFormat, Settings},
    crossword::{create_example_puzzles, load_structure_from_file, load_vocabulary_from_file, Crossword},
    generate::{CrosswordProblem, FillOutcome, Solution, SolutionValidator},
    utils::{ColorOutput, SolutionFormatter},
};
use log::debug;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crossword_csp")]
#[command(about = "Crossword constraint solver")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a crossword structure from a word list
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Structure file (overrides config)
        #[arg(short, long)]
        structure: Option<PathBuf>,

        /// Words file (overrides config)
        #[arg(short, long)]
        words: Option<PathBuf>,

        /// Save the filled grid here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Split the search across threads
        #[arg(long)]
        parallel: bool,

        /// Give up after visiting this many search nodes
        #[arg(long)]
        max_nodes: Option<u64>,

        /// Give up after this many seconds of search
        #[arg(long)]
        timeout: Option<u64>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run node and arc consistency without searching
    Analyze {
        #[arg(short, long)]
        structure: PathBuf,

        #[arg(short, long)]
        words: PathBuf,
    },

    /// Check a saved JSON solution against its puzzle
    Validate {
        #[arg(short, long)]
        structure: PathBuf,

        #[arg(short, long)]
        words: PathBuf,

        /// Solution file written by `solve --format json`
        #[arg(long)]
        solution: PathBuf,
    },

    /// Create example configuration and puzzle files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Solve { verbose: true, .. });
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" }),
    )
    .init();

    match cli.command {
        Commands::Solve {
            config,
            structure,
            words,
            output,
            format,
            parallel,
            max_nodes,
            timeout,
            verbose,
        } => {
            let overrides = CliOverrides {
                structure_file: structure,
                words_file: words,
                output_file: output,
                format,
                parallel,
                max_nodes,
                timeout_seconds: timeout,
            };
            solve_command(config, overrides, verbose)
        }
        Commands::Analyze { structure, words } => analyze_command(structure, words),
        Commands::Validate {
            structure,
            words,
            solution,
        } => validate_command(structure, words, solution),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn solve_command(config_path: PathBuf, overrides: CliOverrides, verbose: bool) -> Result<()> {
    let mut settings = if config_path.exists() {
        Settings::from_file(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        debug!("Config file {} not found, using defaults", config_path.display());
        Settings::default()
    };
    settings.merge_with_cli(&overrides);

    if verbose {
        println!("Configuration:");
        println!("  Structure: {}", settings.input.structure_file.display());
        println!("  Words: {}", settings.input.words_file.display());
        println!("  Parallel: {}", settings.search.parallel);
        println!();
    }

    settings
        .validate()
        .context("Configuration validation failed")?;

    let problem = CrosswordProblem::new(settings.clone()).context("Failed to load puzzle")?;
    let report = problem.solve().context("Failed to fill crossword")?;

    if verbose {
        println!("{}", report.statistics);
    }

    println!("{}", ColorOutput::fill_outcome(&report.outcome));
    let FillOutcome::Filled(assignment) = &report.outcome else {
        return Ok(());
    };

    let solution = Solution::new(problem.crossword(), assignment, report.statistics.clone());

    match &settings.output.output_file {
        Some(path) => {
            SolutionFormatter::save_solution(&solution, path, settings.output.format)
                .context("Failed to save solution")?;
            println!(
                "{}",
                ColorOutput::success(&format!("Solution saved to {}", path.display()))
            );
        }
        None => match settings.output.format {
            OutputFormat::Text => print!("{}", SolutionFormatter::format_solution(&solution)),
            OutputFormat::Json => println!("{}", solution.to_json()?),
        },
    }

    Ok(())
}

fn analyze_command(structure_path: PathBuf, words_path: PathBuf) -> Result<()> {
    let structure = load_structure_from_file(&structure_path)?;
    let vocabulary = load_vocabulary_from_file(&words_path)?;

    println!(
        "Structure ({}x{}, {} open cells):",
        structure.width,
        structure.height,
        structure.open_count()
    );
    println!("{}", SolutionFormatter::format_structure_with_coords(&structure));

    let problem =
        CrosswordProblem::with_puzzle(Settings::default(), Crossword::new(structure), vocabulary);
    let report = problem.analyze();
    println!("{}", report);

    if !report.consistent {
        println!("{}", ColorOutput::warning("Propagation proved there is no solution."));
    }

    Ok(())
}

fn validate_command(structure_path: PathBuf, words_path: PathBuf, solution_path: PathBuf) -> Result<()> {
    let crossword = Crossword::new(load_structure_from_file(&structure_path)?);
    let vocabulary = load_vocabulary_from_file(&words_path)?;
    let solution = Solution::load_from_file(&solution_path)?;

    let assignment = solution
        .to_assignment(&crossword)
        .context("Solution does not match the structure")?;
    let result = SolutionValidator::new(&crossword, &vocabulary).validate(&assignment);

    println!("{}", result);
    if result.is_valid {
        println!("{}", ColorOutput::success("Solution is valid!"));
    } else {
        println!("{}", ColorOutput::error("Solution is invalid"));
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    let config_dir = directory.join("config");
    let data_dir = directory.join("data");

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    if !data_dir.join("structure0.txt").exists() || force {
        create_example_puzzles(&data_dir).context("Failed to create example puzzles")?;
        println!("Created example puzzle in: {}", data_dir.display());
    } else {
        println!("Skipped: {} (already exists)", data_dir.display());
    }

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nRun: cargo run -- solve --config config/default.yaml");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "crossword_csp",
            "solve",
            "--structure",
            "grid.txt",
            "--format",
            "json",
            "--max-nodes",
            "500",
            "--parallel",
        ])
        .unwrap();

        match cli.command {
            Commands::Solve {
                structure,
                format,
                max_nodes,
                parallel,
                ..
            } => {
                assert_eq!(structure, Some(PathBuf::from("grid.txt")));
                assert_eq!(format, Some(OutputFormat::Json));
                assert_eq!(max_nodes, Some(500));
                assert!(parallel);
            }
            _ => panic!("expected solve"),
        }

        assert!(Cli::try_parse_from(["crossword_csp", "analyze", "--structure", "s.txt"]).is_err());
        assert!(Cli::try_parse_from([
            "crossword_csp",
            "validate",
            "-s",
            "s.txt",
            "-w",
            "w.txt",
            "--solution",
            "out.json"
        ])
        .is_ok());
    }

    #[test]
    fn test_setup_then_solve() {
        let temp_dir = tempdir().unwrap();
        setup_command(temp_dir.path().to_path_buf(), false).unwrap();

        let config_path = temp_dir.path().join("config/default.yaml");
        assert!(config_path.exists());
        assert!(temp_dir.path().join("data/words0.txt").exists());

        let output = temp_dir.path().join("solution.json");
        let overrides = CliOverrides {
            structure_file: Some(temp_dir.path().join("data/structure0.txt")),
            words_file: Some(temp_dir.path().join("data/words0.txt")),
            output_file: Some(output.clone()),
            format: Some(OutputFormat::Json),
            ..Default::default()
        };
        solve_command(config_path, overrides, false).unwrap();

        validate_command(
            temp_dir.path().join("data/structure0.txt"),
            temp_dir.path().join("data/words0.txt"),
            output,
        )
        .unwrap();
    }
}
