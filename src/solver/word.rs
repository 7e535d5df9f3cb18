use std::fmt;
use std::sync::{Arc, Mutex};

use super::alphabet::Alphabet;
use super::error::{Result, SolverError};
use super::solution::Solution;

/// One word of the puzzle: its length/hint constraint and the spellings
/// accepted for it so far.
///
/// The constraint is immutable once parsed. The solution list is the only
/// part search workers write to, so it sits behind a mutex.
#[derive(Debug)]
pub struct Word {
    /// Constraint as the user wrote it, kept for messages.
    token: String,
    length: usize,
    /// Fixed letter per position; `None` stands for the placeholder.
    hint: Option<Vec<Option<char>>>,
    /// Spellings found for this word. Appended to by search workers.
    solutions: Mutex<Vec<Arc<Solution>>>,
}

impl Word {
    /// Parses one constraint token: a bare word length like `"5"`, or a hint
    /// like `"c__"` using the alphabet's placeholder for unknown letters.
    /// The token is trimmed and lowercased first.
    pub fn parse(token: &str, alphabet: &Alphabet) -> Result<Self> {
        let token = token.trim().to_lowercase();
        if let Ok(length) = token.parse::<i64>() {
            if length <= 0 {
                return Err(SolverError::InvalidWordLength { token });
            }
            return Ok(Self::with_length(length as usize));
        }

        let mut hint = Vec::new();
        for letter in token.chars() {
            if letter == alphabet.placeholder() {
                hint.push(None);
            } else if alphabet.contains(letter) {
                hint.push(Some(letter));
            } else {
                return Err(SolverError::HintLetterOutsideAlphabet {
                    token: token.clone(),
                    letter,
                });
            }
        }
        if hint.is_empty() {
            return Err(SolverError::InvalidWordLength { token });
        }
        Ok(Self {
            length: hint.len(),
            hint: Some(hint),
            solutions: Mutex::new(Vec::new()),
            token,
        })
    }

    /// A pure length constraint without any hint.
    pub fn with_length(length: usize) -> Self {
        Self {
            token: length.to_string(),
            length,
            hint: None,
            solutions: Mutex::new(Vec::new()),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Fixed letter required at path position `index`, if any.
    pub fn hint_at(&self, index: usize) -> Option<char> {
        self.hint
            .as_ref()
            .and_then(|hint| hint.get(index).copied().flatten())
    }

    /// The fixed letters of the hint, in order.
    pub fn hint_letters(&self) -> Vec<char> {
        match &self.hint {
            Some(hint) => hint.iter().filter_map(|letter| *letter).collect(),
            None => Vec::new(),
        }
    }

    /// True when every position has a fixed hint letter.
    pub fn fully_hinted(&self) -> bool {
        match &self.hint {
            Some(hint) => hint.iter().all(|letter| letter.is_some()),
            None => false,
        }
    }

    /// The hinted word itself, when fully hinted.
    pub fn hinted_word(&self) -> Option<String> {
        self.hint.as_ref()?.iter().copied().collect()
    }

    /// True when `prefix` could still grow into this word: not over-long and
    /// consistent with every fixed hint position covered so far.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        for (index, letter) in prefix.chars().enumerate() {
            if index >= self.length {
                return false;
            }
            if let Some(required) = self.hint_at(index) {
                if required != letter {
                    return false;
                }
            }
        }
        true
    }

    /// True when `word` has the exact target length and satisfies the hint.
    pub fn matches_exact(&self, word: &str) -> bool {
        word.chars().count() == self.length && self.matches_prefix(word)
    }

    /// Records an accepted spelling. Called concurrently by search workers.
    pub fn add_solution(&self, solution: Arc<Solution>) {
        let mut solutions = self
            .solutions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        solutions.push(solution);
    }

    /// True once at least one spelling has been accepted.
    pub fn is_solved(&self) -> bool {
        !self
            .solutions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_empty()
    }

    /// Snapshot of the spellings accepted so far.
    pub fn solutions(&self) -> Vec<Arc<Solution>> {
        self.solutions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Spellings whose whole chain is still valid.
    pub fn valid_solutions(&self) -> Vec<Arc<Solution>> {
        self.solutions()
            .into_iter()
            .filter(|solution| !solution.is_invalid())
            .collect()
    }

    /// Marks every accepted spelling of `spelling` invalid, keeping the
    /// other spellings in play.
    pub fn reject_spelling(&self, spelling: &str) {
        for solution in self.solutions() {
            if solution.found_word() == spelling {
                solution.mark_invalid();
            }
        }
    }

    /// Marks every accepted spelling other than `spelling` invalid.
    pub fn keep_spelling(&self, spelling: &str) {
        for solution in self.solutions() {
            if solution.found_word() != spelling {
                solution.mark_invalid();
            }
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}
