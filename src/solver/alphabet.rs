use super::error::{Result, SolverError};
use super::EMPTY;

/// The letters a puzzle may use, plus the placeholder that stands for an
/// unknown letter in hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    letters: Vec<char>,
    placeholder: char,
}

impl Alphabet {
    /// Builds an alphabet from its letters. Duplicates are dropped; the
    /// placeholder and the empty-cell sentinel must not appear in `letters`.
    pub fn new(letters: &str, placeholder: char) -> Result<Self> {
        if placeholder == EMPTY {
            return Err(SolverError::ReservedChar { letter: placeholder });
        }
        let mut seen = Vec::new();
        for letter in letters.chars() {
            if letter == EMPTY || letter == placeholder {
                return Err(SolverError::ReservedChar { letter });
            }
            if !seen.contains(&letter) {
                seen.push(letter);
            }
        }
        if seen.is_empty() {
            return Err(SolverError::EmptyAlphabet);
        }
        Ok(Self {
            letters: seen,
            placeholder,
        })
    }

    pub fn contains(&self, letter: char) -> bool {
        self.letters.contains(&letter)
    }

    /// True when every letter of `word` is in the alphabet.
    pub fn accepts_word(&self, word: &str) -> bool {
        word.chars().all(|letter| self.contains(letter))
    }

    pub fn placeholder(&self) -> char {
        self.placeholder
    }

    /// Number of distinct letters.
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

impl Default for Alphabet {
    /// Lowercase a-z plus the German extras, with `_` as the placeholder.
    fn default() -> Self {
        Self {
            letters: ('a'..='z').chain("äöüß".chars()).collect(),
            placeholder: '_',
        }
    }
}
