//! Backtracking search over the propagated domains.
//!
//! Variables are chosen by minimum remaining values, then by degree, then by grid position.
//! Values are tried least-constraining first, ties in lexicographic order. The search keeps
//! an explicit stack of frames instead of recursing, so depth is bounded by the number of
//! variables rather than the native stack, and budgets can be checked at every node.

use super::{Assignment, DomainStore};
use crate::crossword::{Crossword, VariableId};
use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// How many nodes to expand between wall-clock checks
pub const DEADLINE_CHECK_FREQUENCY: u64 = 64;

/// Limits after which the search gives up with an unknown result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBudget {
    pub max_nodes: Option<u64>,
    pub timeout: Option<Duration>,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Terminal state of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A complete, consistent assignment
    Solved(Assignment),
    /// Every candidate was exhausted
    Unsolvable,
    /// The budget ran out before the search could decide
    BudgetExhausted,
}

/// Counters collected while searching
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Candidate bindings tried
    pub nodes: u64,
    /// Frames abandoned after exhausting their candidates
    pub backtracks: u64,
    pub max_depth: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SearchStatistics {
    /// Fold another worker's counters into these
    pub fn merge(&mut self, other: &SearchStatistics) {
        self.nodes += other.nodes;
        self.backtracks += other.backtracks;
        self.max_depth = self.max_depth.max(other.max_depth);
        self.elapsed = self.elapsed.max(other.elapsed);
    }
}

/// External stop signal consulted once per expanded node
pub trait SearchControl {
    /// Returns `false` when the search should stop
    fn tick(&self) -> bool;
}

/// Whether every bound word is distinct, has its variable's length, and agrees with every
/// bound crossing word at the shared cell
pub fn consistent(crossword: &Crossword, assignment: &Assignment) -> bool {
    let mut seen = HashSet::new();
    for (variable, word) in assignment.iter() {
        if !seen.insert(word) || word.len() != crossword.variable(variable).length {
            return false;
        }
        for &other in crossword.neighbors(variable) {
            if let (Some((i, j)), Some(other_word)) =
                (crossword.overlap(variable, other), assignment.get(other))
            {
                if word.as_bytes().get(i) != other_word.as_bytes().get(j) {
                    return false;
                }
            }
        }
    }
    true
}

/// Whether binding `variable` to `word` keeps an already consistent assignment consistent
fn consistent_binding(
    crossword: &Crossword,
    assignment: &Assignment,
    variable: VariableId,
    word: &str,
) -> bool {
    if word.len() != crossword.variable(variable).length {
        return false;
    }
    if assignment
        .iter()
        .any(|(other, other_word)| other != variable && other_word == word)
    {
        return false;
    }
    crossword.neighbors(variable).iter().all(|&other| {
        match (crossword.overlap(variable, other), assignment.get(other)) {
            (Some((i, j)), Some(other_word)) => {
                word.as_bytes().get(i) == other_word.as_bytes().get(j)
            }
            _ => true,
        }
    })
}

/// One level of the search: a variable and its ordered candidates
struct Frame {
    variable: VariableId,
    candidates: Vec<String>,
    cursor: usize,
}

/// Backtracking search over read-only domains
pub struct BacktrackingSearch<'a> {
    crossword: &'a Crossword,
    domains: &'a DomainStore,
    budget: SearchBudget,
    control: Option<&'a dyn SearchControl>,
    statistics: SearchStatistics,
    deadline: Option<Instant>,
}

impl<'a> BacktrackingSearch<'a> {
    pub fn new(crossword: &'a Crossword, domains: &'a DomainStore) -> Self {
        Self {
            crossword,
            domains,
            budget: SearchBudget::unlimited(),
            control: None,
            statistics: SearchStatistics::default(),
            deadline: None,
        }
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_control(mut self, control: &'a dyn SearchControl) -> Self {
        self.control = Some(control);
        self
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Full consistency check of an assignment against this search's crossword
    pub fn consistent(&self, assignment: &Assignment) -> bool {
        consistent(self.crossword, assignment)
    }

    /// Unassigned variable with the fewest remaining values, then the most neighbors, then
    /// the lowest id. `None` once the assignment is complete.
    pub fn select_unassigned_variable(&self, assignment: &Assignment) -> Option<VariableId> {
        self.crossword
            .ids()
            .filter(|&id| !assignment.contains(id))
            .min_by_key(|&id| (self.domains.size(id), Reverse(self.crossword.degree(id)), id))
    }

    /// Domain of `variable`, ordered by how many values each choice would rule out for
    /// unassigned neighbors (fewest first)
    pub fn order_domain_values(&self, variable: VariableId, assignment: &Assignment) -> Vec<String> {
        // for each unassigned crossing: our index, neighbor domain size, letter counts there
        let crossings: Vec<_> = self
            .crossword
            .neighbors(variable)
            .iter()
            .filter(|&&neighbor| !assignment.contains(neighbor))
            .filter_map(|&neighbor| {
                let (i, j) = self.crossword.overlap(variable, neighbor)?;
                let counts = self
                    .domains
                    .domain(neighbor)
                    .iter()
                    .filter_map(|word| word.as_bytes().get(j).copied())
                    .counts();
                Some((i, self.domains.size(neighbor), counts))
            })
            .collect();

        self.domains
            .domain(variable)
            .iter()
            .map(|value| {
                let eliminated: usize = crossings
                    .iter()
                    .map(|(i, size, counts)| {
                        let compatible = value
                            .as_bytes()
                            .get(*i)
                            .and_then(|letter| counts.get(letter))
                            .copied()
                            .unwrap_or(0);
                        size - compatible
                    })
                    .sum();
                (eliminated, value)
            })
            .sorted_by_key(|(eliminated, _)| *eliminated)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Extend `assignment` to a complete consistent assignment, trying candidates in
    /// heuristic order and returning the first one found
    pub fn backtrack(&mut self, assignment: Assignment) -> SearchOutcome {
        let start = Instant::now();
        self.deadline = self.budget.timeout.map(|timeout| start + timeout);

        let outcome = self.search(assignment);

        self.statistics.elapsed = start.elapsed();
        debug!(
            "Search finished after {} nodes, {} backtracks (max depth {}) in {:.3}s",
            self.statistics.nodes,
            self.statistics.backtracks,
            self.statistics.max_depth,
            self.statistics.elapsed.as_secs_f64()
        );
        outcome
    }

    fn search(&mut self, mut assignment: Assignment) -> SearchOutcome {
        if !self.consistent(&assignment) {
            return SearchOutcome::Unsolvable;
        }

        let Some(first) = self.select_unassigned_variable(&assignment) else {
            return SearchOutcome::Solved(assignment);
        };
        let mut stack = vec![self.frame(first, &assignment)];

        while let Some(frame) = stack.last_mut() {
            // undo the binding left over from this frame's previous candidate
            assignment.remove(frame.variable);

            if frame.cursor == frame.candidates.len() {
                trace!("Exhausted candidates for variable {}", frame.variable);
                stack.pop();
                self.statistics.backtracks += 1;
                continue;
            }

            let variable = frame.variable;
            let value = frame.candidates[frame.cursor].clone();
            frame.cursor += 1;

            if !self.tick() {
                return SearchOutcome::BudgetExhausted;
            }

            if !consistent_binding(self.crossword, &assignment, variable, &value) {
                continue;
            }

            trace!("Binding variable {} to {}", variable, value);
            assignment.insert(variable, value);

            match self.select_unassigned_variable(&assignment) {
                None => return SearchOutcome::Solved(assignment),
                Some(next) => {
                    let frame = self.frame(next, &assignment);
                    stack.push(frame);
                    self.statistics.max_depth = self.statistics.max_depth.max(stack.len());
                }
            }
        }

        SearchOutcome::Unsolvable
    }

    fn frame(&self, variable: VariableId, assignment: &Assignment) -> Frame {
        Frame {
            variable,
            candidates: self.order_domain_values(variable, assignment),
            cursor: 0,
        }
    }

    /// Count a node and check every stop condition
    fn tick(&mut self) -> bool {
        self.statistics.nodes += 1;

        if let Some(max_nodes) = self.budget.max_nodes {
            if self.statistics.nodes > max_nodes {
                debug!("Node budget of {} exhausted", max_nodes);
                return false;
            }
        }

        if let Some(deadline) = self.deadline {
            if self.statistics.nodes % DEADLINE_CHECK_FREQUENCY == 0 && Instant::now() >= deadline {
                debug!("Search deadline reached after {} nodes", self.statistics.nodes);
                return false;
            }
        }

        self.control.map_or(true, |control| control.tick())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossword::{Direction, Variable, Vocabulary};

    fn grid(rows: &[&str]) -> Crossword {
        Crossword::from_cells(
            rows.iter()
                .map(|row| row.chars().map(|c| c == '_').collect())
                .collect(),
        )
        .unwrap()
    }

    fn node_consistent(crossword: &Crossword, words: &[&str]) -> DomainStore {
        let mut domains = DomainStore::initialize(&Vocabulary::new(words), crossword);
        domains.enforce_node_consistency(crossword);
        domains
    }

    fn assignment(bindings: &[(VariableId, &str)]) -> Assignment {
        let mut assignment = Assignment::new();
        for &(id, word) in bindings {
            assignment.insert(id, word.to_string());
        }
        assignment
    }

    #[test]
    fn test_consistent_checks_every_invariant() {
        // tee: across (id 0) letter 1 meets down (id 1) letter 0
        let crossword = grid(&["___", "#_#", "#_#"]);

        assert!(consistent(&crossword, &assignment(&[])));
        assert!(consistent(&crossword, &assignment(&[(0, "CAT")])));
        assert!(consistent(&crossword, &assignment(&[(0, "CAT"), (1, "ACE")])));
        // letter clash
        assert!(!consistent(&crossword, &assignment(&[(0, "CAT"), (1, "DOG")])));
        // wrong length
        assert!(!consistent(&crossword, &assignment(&[(0, "CATS")])));
        // duplicate word, even where letters agree
        let crossword = grid(&["___", "___"]);
        assert!(!consistent(&crossword, &assignment(&[(0, "AAA"), (4, "AAA")])));
    }

    #[test]
    fn test_select_prefers_smallest_domain() {
        // three-letter slot first in grid order, two-letter slot below it
        let crossword = grid(&["___", "###", "__#"]);
        let short = crossword
            .id_of(&Variable::new(2, 0, Direction::Across, 2))
            .unwrap();
        let domains = node_consistent(&crossword, &["CAT", "COT", "TOT", "ON"]);
        let search = BacktrackingSearch::new(&crossword, &domains);

        assert_eq!(short, 1);
        assert_eq!(domains.size(0), 3);
        assert_eq!(domains.size(short), 1);
        assert_eq!(search.select_unassigned_variable(&assignment(&[])), Some(short));
        assert_eq!(search.select_unassigned_variable(&assignment(&[(short, "ON")])), Some(0));
        assert_eq!(
            search.select_unassigned_variable(&assignment(&[(0, "CAT"), (short, "ON")])),
            None
        );
    }

    #[test]
    fn test_select_breaks_ties_by_degree() {
        // middle across crosses both downs; each down crosses only the middle
        let crossword = grid(&["_#_", "___", "_#_"]);
        let middle = crossword
            .id_of(&Variable::new(1, 0, Direction::Across, 3))
            .unwrap();
        let domains = node_consistent(&crossword, &["CAT", "COT", "TOT"]);
        let search = BacktrackingSearch::new(&crossword, &domains);

        assert_eq!(middle, 2);
        assert!(crossword.ids().all(|id| domains.size(id) == 3));
        assert_eq!(crossword.degree(middle), 2);
        assert_eq!(search.select_unassigned_variable(&assignment(&[])), Some(middle));
    }

    #[test]
    fn test_select_breaks_residual_ties_by_position() {
        let crossword = grid(&["__", "##", "__"]);
        let domains = node_consistent(&crossword, &["ON", "NO"]);
        let search = BacktrackingSearch::new(&crossword, &domains);
        assert_eq!(search.select_unassigned_variable(&assignment(&[])), Some(0));
    }

    #[test]
    fn test_order_domain_values_least_constraining_first() {
        // tee: the across word's middle letter must start the down word
        let crossword = grid(&["___", "#_#", "#_#"]);
        let domains = node_consistent(&crossword, &["ABC", "XAY", "AZZ", "AQQ", "ZED"]);
        let search = BacktrackingSearch::new(&crossword, &domains);

        let ordered = search.order_domain_values(0, &assignment(&[]));
        // middle A is compatible with 3 down words, Z with 1, others with 0
        assert_eq!(ordered[0], "XAY");
        assert_eq!(ordered[1], "AZZ");
        // remaining ties keep lexicographic order
        assert_eq!(&ordered[2..], &["ABC", "AQQ", "ZED"]);
    }

    #[test]
    fn test_order_ignores_assigned_neighbors() {
        let crossword = grid(&["___", "#_#", "#_#"]);
        let domains = node_consistent(&crossword, &["ABC", "XAY", "AZZ"]);
        let search = BacktrackingSearch::new(&crossword, &domains);

        let ordered = search.order_domain_values(0, &assignment(&[(1, "AZZ")]));
        assert_eq!(ordered, vec!["ABC", "AZZ", "XAY"]);
    }

    #[test]
    fn test_backtrack_finds_consistent_assignment() {
        let crossword = grid(&["#___#", "#_##_", "#_##_", "#_##_", "#____"]);
        let words = [
            "ONE", "TWO", "THREE", "FOUR", "FIVE", "SIX", "SEVEN", "EIGHT", "NINE", "TEN",
        ];
        let domains = node_consistent(&crossword, &words);
        let mut search = BacktrackingSearch::new(&crossword, &domains);

        let SearchOutcome::Solved(solution) = search.backtrack(Assignment::new()) else {
            panic!("expected a solution");
        };
        assert!(solution.is_complete(&crossword));
        assert!(consistent(&crossword, &solution));

        let mut words: Vec<_> = solution.iter().map(|(_, word)| word).collect();
        words.sort();
        assert_eq!(words, vec!["FIVE", "NINE", "SEVEN", "SIX"]);
        assert!(search.statistics().nodes >= 4);
    }

    #[test]
    fn test_backtrack_exhausts_on_uniqueness() {
        // plus: both slots share the middle letter, but no two words do
        let crossword = grid(&["#_#", "___", "#_#"]);
        let domains = node_consistent(&crossword, &["CAT", "DOG", "ACE"]);
        let mut search = BacktrackingSearch::new(&crossword, &domains);

        assert_eq!(search.backtrack(Assignment::new()), SearchOutcome::Unsolvable);
        assert!(search.statistics().backtracks > 0);
    }

    #[test]
    fn test_backtrack_never_mutates_domains() {
        let crossword = grid(&["#_#", "___", "#_#"]);
        let domains = node_consistent(&crossword, &["CAT", "DOG", "ACE", "BAT"]);
        let snapshot = domains.clone();

        let mut search = BacktrackingSearch::new(&crossword, &domains);
        assert!(matches!(search.backtrack(Assignment::new()), SearchOutcome::Solved(_)));
        assert_eq!(domains, snapshot);
    }

    #[test]
    fn test_backtrack_empty_puzzle() {
        let crossword = grid(&["##", "##"]);
        let domains = node_consistent(&crossword, &["ON"]);
        let mut search = BacktrackingSearch::new(&crossword, &domains);
        assert_eq!(
            search.backtrack(Assignment::new()),
            SearchOutcome::Solved(Assignment::new())
        );
    }

    #[test]
    fn test_backtrack_rejects_inconsistent_start() {
        let crossword = grid(&["___", "#_#", "#_#"]);
        let domains = node_consistent(&crossword, &["CAT", "ACE", "DOG"]);
        let mut search = BacktrackingSearch::new(&crossword, &domains);
        assert_eq!(
            search.backtrack(assignment(&[(0, "CAT"), (1, "DOG")])),
            SearchOutcome::Unsolvable
        );
    }

    #[test]
    fn test_node_budget() {
        // every word ends in Q, so the bottom row can never be filled
        let crossword = grid(&["___", "___", "___"]);
        let words: Vec<String> = (b'A'..=b'Z')
            .flat_map(|a| (b'A'..=b'E').map(move |b| format!("{}{}Q", a as char, b as char)))
            .collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        let domains = node_consistent(&crossword, &words);

        let mut search = BacktrackingSearch::new(&crossword, &domains)
            .with_budget(SearchBudget::unlimited().with_max_nodes(10));
        assert_eq!(search.backtrack(Assignment::new()), SearchOutcome::BudgetExhausted);
        assert_eq!(search.statistics().nodes, 11);
    }

    struct StopImmediately;

    impl SearchControl for StopImmediately {
        fn tick(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_control_can_stop_search() {
        let crossword = grid(&["__"]);
        let domains = node_consistent(&crossword, &["ON", "NO"]);
        let control = StopImmediately;
        let mut search = BacktrackingSearch::new(&crossword, &domains).with_control(&control);
        assert_eq!(search.backtrack(Assignment::new()), SearchOutcome::BudgetExhausted);
    }

    #[test]
    fn test_search_is_deterministic() {
        let crossword = grid(&["___", "_#_", "___"]);
        let words = ["CAT", "COT", "TOT", "TAT", "CAP", "TOP", "PAT", "PIT", "TIP"];
        let domains = node_consistent(&crossword, &words);

        let first = BacktrackingSearch::new(&crossword, &domains).backtrack(Assignment::new());
        let second = BacktrackingSearch::new(&crossword, &domains).backtrack(Assignment::new());
        assert_eq!(first, second);
    }
}
