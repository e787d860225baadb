//! Constraint-satisfaction machinery: domains, arc consistency and backtracking search

pub mod arc_consistency;
pub mod assignment;
pub mod backtracking;
pub mod domains;
pub mod parallel;

pub use arc_consistency::{ac3, revise, DirectedArc};
pub use assignment::Assignment;
pub use backtracking::{
    consistent, BacktrackingSearch, SearchBudget, SearchControl, SearchOutcome, SearchStatistics,
};
pub use domains::DomainStore;
pub use parallel::parallel_backtrack;
