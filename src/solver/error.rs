use thiserror::Error;

/// Result alias used throughout the solver.
pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("board must contain at least one row of letters")]
    EmptyGrid,

    #[error("board rows must be equally wide: row {row} has {found} letters, expected {expected}")]
    InconsistentRowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("board letter '{letter}' at row {row}, column {col} is not in the alphabet")]
    GridLetterOutsideAlphabet { letter: char, row: usize, col: usize },

    #[error("board has {grid} letters but the words require {required}")]
    LetterCountMismatch { grid: usize, required: usize },

    #[error("word length in '{token}' must be at least 1")]
    InvalidWordLength { token: String },

    #[error("hint '{token}' contains '{letter}', which is not in the alphabet")]
    HintLetterOutsideAlphabet { token: String, letter: char },

    #[error("hinted word '{word}' needs letter '{letter}', which does not occur on the board")]
    HintLetterNotInGrid { word: String, letter: char },

    #[error("alphabet must not be empty")]
    EmptyAlphabet,

    #[error("'{letter}' is reserved and cannot be an alphabet letter")]
    ReservedChar { letter: char },

    #[error("failed to build the candidate index: {0}")]
    CandidateIndex(#[from] fst::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
