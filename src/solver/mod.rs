pub mod alphabet;
mod candidates;
pub mod error;
pub mod grid;
pub mod problem;
mod search;
pub mod solution;
pub mod word;
pub mod wordlist;

/// Sentinel a board cell holds after its letter was consumed by gravity.
const EMPTY: char = ' ';

pub use self::alphabet::Alphabet;
pub use self::error::{Result, SolverError};
pub use self::grid::{LetterGrid, Position};
pub use self::problem::{Problem, SolveOutcome};
pub use self::solution::Solution;
pub use self::word::Word;
pub use self::wordlist::Wordlist;
