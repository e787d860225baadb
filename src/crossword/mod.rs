//! Crossword puzzle model: grid structure, word slots, overlaps and vocabulary

pub mod error;
pub mod io;
pub mod puzzle;
pub mod structure;
pub mod variable;
pub mod vocabulary;

pub use error::PuzzleError;
pub use io::{
    create_example_puzzles, load_structure_from_file, load_vocabulary_from_file,
    parse_structure_from_string, parse_vocabulary_from_string,
};
pub use puzzle::Crossword;
pub use structure::Structure;
pub use variable::{Direction, Variable, VariableId};
pub use vocabulary::Vocabulary;
