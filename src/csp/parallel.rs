//! Root-split parallel search on the rayon pool.
//!
//! The root variable is chosen once; each of its ordered candidates is searched by an
//! independent worker holding its own assignment and read-only views of the crossword and
//! domains. Results are kept in candidate order so the answer matches the sequential search.

use super::backtracking::{
    SearchBudget, SearchControl, SearchOutcome, SearchStatistics, DEADLINE_CHECK_FREQUENCY,
};
use super::{Assignment, BacktrackingSearch, DomainStore};
use crate::crossword::Crossword;
use log::debug;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// State shared by every worker of one parallel search
struct SharedProgress {
    nodes: AtomicU64,
    max_nodes: Option<u64>,
    /// One deadline for the whole run, not per worker
    deadline: Option<Instant>,
    /// Lowest root index that produced a solution so far
    first_solved: AtomicUsize,
    budget_exhausted: AtomicBool,
}

/// Per-worker view of the shared progress
struct WorkerControl<'a> {
    shared: &'a SharedProgress,
    index: usize,
}

impl SearchControl for WorkerControl<'_> {
    fn tick(&self) -> bool {
        // a lower-ordered root candidate already won
        if self.shared.first_solved.load(Ordering::Relaxed) < self.index {
            return false;
        }

        if self.shared.budget_exhausted.load(Ordering::Relaxed) {
            return false;
        }

        let nodes = self.shared.nodes.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(max_nodes) = self.shared.max_nodes {
            if nodes > max_nodes {
                self.shared.budget_exhausted.store(true, Ordering::Relaxed);
                return false;
            }
        }

        if nodes % DEADLINE_CHECK_FREQUENCY == 0 && self.shared.past_deadline() {
            debug!("Parallel search deadline reached after {} nodes", nodes);
            self.shared.budget_exhausted.store(true, Ordering::Relaxed);
            return false;
        }
        true
    }
}

impl SharedProgress {
    fn past_deadline(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Search with the root candidates split across the rayon pool
pub fn parallel_backtrack(
    crossword: &Crossword,
    domains: &DomainStore,
    budget: SearchBudget,
) -> (SearchOutcome, SearchStatistics) {
    let start = Instant::now();
    let root_search = BacktrackingSearch::new(crossword, domains);
    let empty = Assignment::new();

    let Some(root) = root_search.select_unassigned_variable(&empty) else {
        return (SearchOutcome::Solved(empty), SearchStatistics::default());
    };
    let candidates = root_search.order_domain_values(root, &empty);
    debug!(
        "Splitting search over {} candidates for {}",
        candidates.len(),
        crossword.variable(root)
    );

    let shared = SharedProgress {
        nodes: AtomicU64::new(0),
        max_nodes: budget.max_nodes,
        deadline: budget.timeout.map(|timeout| start + timeout),
        first_solved: AtomicUsize::new(usize::MAX),
        budget_exhausted: AtomicBool::new(false),
    };
    let results: Vec<(SearchOutcome, SearchStatistics)> = candidates
        .par_iter()
        .enumerate()
        .map(|(index, word)| {
            let control = WorkerControl {
                shared: &shared,
                index,
            };
            if shared.past_deadline() {
                shared.budget_exhausted.store(true, Ordering::Relaxed);
            }
            if !control.tick() {
                return (SearchOutcome::BudgetExhausted, SearchStatistics::default());
            }

            let mut assignment = Assignment::new();
            assignment.insert(root, word.clone());

            // node and time limits are enforced through the shared progress
            let mut search = BacktrackingSearch::new(crossword, domains).with_control(&control);
            let outcome = search.backtrack(assignment);
            if matches!(outcome, SearchOutcome::Solved(_)) {
                shared.first_solved.fetch_min(index, Ordering::Relaxed);
            }
            (outcome, search.statistics().clone())
        })
        .collect();

    let mut statistics = SearchStatistics::default();
    for (_, worker_statistics) in &results {
        statistics.merge(worker_statistics);
    }
    // the root binding itself sits one level above every worker
    statistics.nodes += candidates.len() as u64;
    statistics.max_depth += 1;
    statistics.elapsed = start.elapsed();

    let mut budget_hit = shared.budget_exhausted.load(Ordering::Relaxed);
    for (outcome, _) in results {
        match outcome {
            SearchOutcome::Solved(assignment) => return (SearchOutcome::Solved(assignment), statistics),
            SearchOutcome::BudgetExhausted => budget_hit = true,
            SearchOutcome::Unsolvable => {}
        }
    }

    statistics.backtracks += 1;
    if budget_hit {
        (SearchOutcome::BudgetExhausted, statistics)
    } else {
        (SearchOutcome::Unsolvable, statistics)
    }
}
