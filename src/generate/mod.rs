//! Filling a crossword end to end: propagation, search, validation and the solved grid

pub mod problem;
pub mod solution;
pub mod validator;

pub use problem::{CrosswordProblem, FillOutcome, FillReport, FillStatistics, PropagationReport};
pub use solution::{Entry, Solution};
pub use validator::{SolutionValidator, ValidationResult, Violation};
