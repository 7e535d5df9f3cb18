use std::collections::BTreeSet;

use fst::automaton::Str;
use fst::{Automaton, IntoStreamer, Set, SetBuilder, Streamer};

use super::alphabet::Alphabet;
use super::error::Result;
use super::grid::LetterGrid;
use super::word::Word;

/// Filters `source` down to the words admissible for the problem: any still
/// active length, spellable from the board's letters.
///
/// `source` must be sorted and duplicate free; the result preserves that.
/// The letter scan is skipped when the board carries the whole alphabet, a
/// full board admits every word anyway.
pub fn problem_candidates(
    source: &[String],
    active_lengths: &BTreeSet<usize>,
    grid: &LetterGrid,
    alphabet: &Alphabet,
) -> Vec<String> {
    let board_letters = grid.distinct_letters();
    let filter_letters = board_letters.len() < alphabet.len();

    let mut result = Vec::new();
    for word in source {
        if !active_lengths.contains(&word.chars().count()) {
            continue;
        }
        if filter_letters && !word.chars().all(|letter| board_letters.contains(&letter)) {
            continue;
        }
        result.push(word.clone());
    }
    result
}

/// Candidate set for a single word, indexed for the prefix queries the
/// search hammers on.
pub struct WordCandidates {
    set: Set<Vec<u8>>,
}

impl WordCandidates {
    /// Builds the candidate set for `word` from the problem-level list. A
    /// fully hinted word skips the dictionary: its only candidate is the
    /// hinted word itself, the search just has to locate its path.
    pub fn build(word: &Word, candidates: &[String]) -> Result<Self> {
        let mut builder = SetBuilder::memory();
        match word.hinted_word() {
            Some(hinted) => builder.insert(&hinted)?,
            None => {
                let length = word.length();
                builder.extend_iter(
                    candidates
                        .iter()
                        .filter(|candidate| candidate.chars().count() == length),
                )?;
            }
        }
        Ok(Self {
            set: builder.into_set(),
        })
    }

    /// Exact membership test.
    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word)
    }

    /// True when at least one candidate starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let matcher = Str::new(prefix).starts_with();
        self.set.search(matcher).into_stream().next().is_some()
    }

    /// Number of candidate words.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
