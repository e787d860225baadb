//! Crossword fill problem: propagation followed by search

use super::SolutionValidator;
use crate::config::Settings;
use crate::crossword::{load_structure_from_file, load_vocabulary_from_file, Crossword, Variable, Vocabulary};
use crate::csp::{
    ac3, parallel_backtrack, Assignment, BacktrackingSearch, DomainStore, SearchOutcome,
    SearchStatistics,
};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// A crossword structure paired with the vocabulary used to fill it
pub struct CrosswordProblem {
    settings: Settings,
    crossword: Crossword,
    vocabulary: Vocabulary,
}

/// How a fill attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    Filled(Assignment),
    NoSolution,
    /// The search stopped on its node or time limit before reaching an answer
    BudgetExhausted,
}

#[derive(Debug, Clone)]
pub struct FillReport {
    pub outcome: FillOutcome,
    pub statistics: FillStatistics,
}

/// Counters gathered across every phase of a fill
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillStatistics {
    pub variables: usize,
    pub overlaps: usize,
    pub vocabulary_size: usize,
    /// Sum of domain sizes before any pruning
    pub initial_candidates: usize,
    pub after_node_consistency: usize,
    pub after_arc_consistency: usize,
    /// Absent when propagation alone proved the puzzle unsolvable
    pub search: Option<SearchStatistics>,
    #[serde(skip)]
    pub propagation_time: Duration,
    #[serde(skip)]
    pub total_time: Duration,
}

/// Domains after node and arc consistency, without any search
#[derive(Debug, Clone)]
pub struct PropagationReport {
    pub consistent: bool,
    pub domain_sizes: Vec<(Variable, usize)>,
    pub statistics: FillStatistics,
}

impl CrosswordProblem {
    /// Load the structure and word files named in the settings
    pub fn new(settings: Settings) -> Result<Self> {
        let structure = load_structure_from_file(&settings.input.structure_file)
            .context("Failed to load structure file")?;
        let vocabulary = load_vocabulary_from_file(&settings.input.words_file)
            .context("Failed to load words file")?;

        Ok(Self::with_puzzle(settings, Crossword::new(structure), vocabulary))
    }

    pub fn with_puzzle(settings: Settings, crossword: Crossword, vocabulary: Vocabulary) -> Self {
        Self {
            settings,
            crossword,
            vocabulary,
        }
    }

    /// Run propagation then search and validate whatever the search produced
    pub fn solve(&self) -> Result<FillReport> {
        let start_time = Instant::now();
        info!(
            "Filling {}x{} crossword: {} variables, {} overlaps, {} words",
            self.crossword.width(),
            self.crossword.height(),
            self.crossword.variable_count(),
            self.crossword.overlap_count(),
            self.vocabulary.len()
        );

        let mut statistics = self.base_statistics();
        let (domains, consistent) = self.propagate(&mut statistics);

        if !consistent {
            info!("Arc consistency emptied a domain; skipping search");
            statistics.total_time = start_time.elapsed();
            return Ok(FillReport {
                outcome: FillOutcome::NoSolution,
                statistics,
            });
        }

        let budget = self.settings.search.budget();
        let (outcome, search_statistics) = if self.settings.search.parallel {
            parallel_backtrack(&self.crossword, &domains, budget)
        } else {
            let mut search = BacktrackingSearch::new(&self.crossword, &domains).with_budget(budget);
            let outcome = search.backtrack(Assignment::new());
            (outcome, search.statistics().clone())
        };
        debug!(
            "Search visited {} nodes with {} backtracks",
            search_statistics.nodes, search_statistics.backtracks
        );
        statistics.search = Some(search_statistics);

        let outcome = match outcome {
            SearchOutcome::Solved(assignment) => {
                let validation =
                    SolutionValidator::new(&self.crossword, &self.vocabulary).validate(&assignment);
                if !validation.is_valid {
                    anyhow::bail!("Search produced an invalid fill\n{}", validation);
                }
                info!("Filled {} variables", assignment.len());
                FillOutcome::Filled(assignment)
            }
            SearchOutcome::Unsolvable => {
                info!("Search exhausted every candidate");
                FillOutcome::NoSolution
            }
            SearchOutcome::BudgetExhausted => {
                info!("Search budget exhausted");
                FillOutcome::BudgetExhausted
            }
        };

        statistics.total_time = start_time.elapsed();
        Ok(FillReport {
            outcome,
            statistics,
        })
    }

    /// Node and arc consistency only
    pub fn analyze(&self) -> PropagationReport {
        let start_time = Instant::now();
        let mut statistics = self.base_statistics();
        let (domains, consistent) = self.propagate(&mut statistics);
        statistics.total_time = start_time.elapsed();

        let domain_sizes = self
            .crossword
            .ids()
            .map(|id| (*self.crossword.variable(id), domains.size(id)))
            .collect();

        PropagationReport {
            consistent,
            domain_sizes,
            statistics,
        }
    }

    pub fn crossword(&self) -> &Crossword {
        &self.crossword
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn base_statistics(&self) -> FillStatistics {
        FillStatistics {
            variables: self.crossword.variable_count(),
            overlaps: self.crossword.overlap_count(),
            vocabulary_size: self.vocabulary.len(),
            ..Default::default()
        }
    }

    fn propagate(&self, statistics: &mut FillStatistics) -> (DomainStore, bool) {
        let start_time = Instant::now();

        let mut domains = DomainStore::initialize(&self.vocabulary, &self.crossword);
        statistics.initial_candidates = domains.total_size();

        domains.enforce_node_consistency(&self.crossword);
        statistics.after_node_consistency = domains.total_size();

        let consistent = ac3(&self.crossword, &mut domains, None);
        statistics.after_arc_consistency = domains.total_size();
        statistics.propagation_time = start_time.elapsed();

        (domains, consistent)
    }
}

impl FillReport {
    pub fn assignment(&self) -> Option<&Assignment> {
        match &self.outcome {
            FillOutcome::Filled(assignment) => Some(assignment),
            _ => None,
        }
    }
}

impl std::fmt::Display for FillStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Fill Statistics:")?;
        writeln!(f, "  Variables: {}", self.variables)?;
        writeln!(f, "  Overlaps: {}", self.overlaps)?;
        writeln!(f, "  Vocabulary: {} words", self.vocabulary_size)?;
        writeln!(
            f,
            "  Candidates: {} -> {} (node) -> {} (arc)",
            self.initial_candidates, self.after_node_consistency, self.after_arc_consistency
        )?;
        writeln!(f, "  Propagation time: {:.3}s", self.propagation_time.as_secs_f64())?;
        if let Some(search) = &self.search {
            writeln!(f, "  Search nodes: {}", search.nodes)?;
            writeln!(f, "  Backtracks: {}", search.backtracks)?;
            writeln!(f, "  Max depth: {}", search.max_depth)?;
        } else {
            writeln!(f, "  Search: skipped")?;
        }
        writeln!(f, "  Total time: {:.3}s", self.total_time.as_secs_f64())?;
        Ok(())
    }
}

impl std::fmt::Display for PropagationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Propagation Report:")?;
        writeln!(f, "  Arc consistent: {}", self.consistent)?;
        for (variable, size) in &self.domain_sizes {
            writeln!(f, "  {}: {} candidates", variable, size)?;
        }
        write!(f, "{}", self.statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossword::create_example_puzzles;
    use itertools::Itertools;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn problem(cells: Vec<Vec<bool>>, words: &[&str]) -> CrosswordProblem {
        CrosswordProblem::with_puzzle(
            Settings::default(),
            Crossword::from_cells(cells).unwrap(),
            Vocabulary::new(words.iter().copied()),
        )
    }

    fn plus() -> Vec<Vec<bool>> {
        vec![
            vec![false, true, false],
            vec![true, true, true],
            vec![false, true, false],
        ]
    }

    fn tee() -> Vec<Vec<bool>> {
        vec![
            vec![true, true, true],
            vec![false, true, false],
            vec![false, true, false],
        ]
    }

    fn sample_problem() -> CrosswordProblem {
        let temp_dir = tempdir().unwrap();
        create_example_puzzles(temp_dir.path()).unwrap();
        let mut settings = Settings::default();
        settings.input.structure_file = temp_dir.path().join("structure0.txt");
        settings.input.words_file = temp_dir.path().join("words0.txt");
        CrosswordProblem::new(settings).unwrap()
    }

    #[test]
    fn test_single_slot() {
        let problem = problem(vec![vec![true, true]], &["ON", "NO"]);
        let report = problem.solve().unwrap();

        let assignment = report.assignment().expect("expected a fill");
        assert_eq!(assignment.len(), 1);
        assert!(matches!(assignment.get(0), Some("ON") | Some("NO")));
    }

    #[test]
    fn test_cross_with_no_shared_letter() {
        // Both slots would need the same word
        let problem = problem(plus(), &["CAT", "DOG", "ACE"]);
        let report = problem.solve().unwrap();
        assert_eq!(report.outcome, FillOutcome::NoSolution);
    }

    #[test]
    fn test_tee_uses_both_words() {
        let problem = problem(tee(), &["CAT", "ACE"]);
        let report = problem.solve().unwrap();

        // either orientation crosses on a shared letter
        let assignment = report.assignment().unwrap();
        assert!(assignment.is_complete(problem.crossword()));
        let words: BTreeSet<&str> = problem
            .crossword()
            .ids()
            .filter_map(|id| assignment.get(id))
            .collect();
        assert_eq!(words, BTreeSet::from(["ACE", "CAT"]));
        let validator = SolutionValidator::new(problem.crossword(), problem.vocabulary());
        assert!(validator.validate(assignment).is_valid);
    }

    #[test]
    fn test_fully_blocked_grid() {
        let problem = problem(vec![vec![false, false], vec![false, false]], &["CAT"]);
        let report = problem.solve().unwrap();
        assert_eq!(report.outcome, FillOutcome::Filled(Assignment::new()));
    }

    #[test]
    fn test_wrong_length_words_never_fill() {
        let problem = problem(vec![vec![true, true]], &["ONE", "ON", "A"]);
        let report = problem.solve().unwrap();

        assert_eq!(report.assignment().unwrap().get(0), Some("ON"));
        assert_eq!(report.statistics.initial_candidates, 3);
        assert_eq!(report.statistics.after_node_consistency, 1);
    }

    #[test]
    fn test_propagation_failure_skips_search() {
        // The down slot needs a four-letter word starting with 'A' and there is none
        let cells = vec![
            vec![true, true, true],
            vec![false, true, false],
            vec![false, true, false],
            vec![false, true, false],
        ];
        let problem = problem(cells, &["CAT", "DOGS"]);
        let report = problem.solve().unwrap();

        assert_eq!(report.outcome, FillOutcome::NoSolution);
        assert!(report.statistics.search.is_none());
    }

    #[test]
    fn test_sample_puzzle() {
        let problem = sample_problem();
        let report = problem.solve().unwrap();
        let assignment = report.assignment().unwrap();

        let words: Vec<&str> = problem
            .crossword()
            .ids()
            .filter_map(|id| assignment.get(id))
            .sorted()
            .collect();
        assert_eq!(words, vec!["FIVE", "NINE", "SEVEN", "SIX"]);
    }

    #[test]
    fn test_fill_matches_brute_force() {
        let problem = problem(tee(), &["CAT", "ACE", "COT", "TEA", "ART"]);
        let report = problem.solve().unwrap();
        let assignment = report.assignment().unwrap();

        let validator = SolutionValidator::new(problem.crossword(), problem.vocabulary());
        let words: Vec<&str> = problem.vocabulary().iter().collect();
        let valid_fills: Vec<Assignment> = words
            .iter()
            .cartesian_product(words.iter())
            .map(|(across, down)| {
                let mut candidate = Assignment::new();
                candidate.insert(0, across.to_string());
                candidate.insert(1, down.to_string());
                candidate
            })
            .filter(|candidate| validator.validate(candidate).is_valid)
            .collect();

        assert!(valid_fills.contains(assignment));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = sample_problem();
        let mut settings = sequential.settings().clone();
        settings.search.parallel = true;
        let parallel = CrosswordProblem::with_puzzle(
            settings,
            sequential.crossword().clone(),
            sequential.vocabulary().clone(),
        );

        assert_eq!(
            sequential.solve().unwrap().outcome,
            parallel.solve().unwrap().outcome
        );
    }

    #[test]
    fn test_repeated_solves_agree() {
        let problem = problem(tee(), &["CAT", "ACE", "COT", "TEA", "ART", "OAT"]);
        let first = problem.solve().unwrap().outcome;
        for _ in 0..5 {
            assert_eq!(problem.solve().unwrap().outcome, first);
        }
    }

    #[test]
    fn test_node_budget() {
        let mut problem = sample_problem();
        problem.settings.search.max_nodes = Some(1);
        let report = problem.solve().unwrap();
        assert_eq!(report.outcome, FillOutcome::BudgetExhausted);
    }

    #[test]
    fn test_analyze_reports_domains() {
        let problem = problem(tee(), &["CAT", "ACE", "DOG", "A"]);
        let report = problem.analyze();

        assert!(report.consistent);
        assert_eq!(report.statistics.after_node_consistency, 6);
        let sizes: Vec<usize> = report.domain_sizes.iter().map(|(_, size)| *size).collect();
        // DOG has no partner sharing its middle or first letter
        assert_eq!(sizes, vec![2, 2]);
    }

    #[test]
    fn test_missing_file() {
        let mut settings = Settings::default();
        settings.input.structure_file = "does/not/exist.txt".into();
        assert!(CrosswordProblem::new(settings).is_err());
    }
}
