use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, info, warn};

use super::alphabet::Alphabet;
use super::candidates::{problem_candidates, WordCandidates};
use super::error::{Result, SolverError};
use super::grid::LetterGrid;
use super::search::SearchRound;
use super::solution::Solution;
use super::word::Word;

/// Outcome of a full solve run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Every word found at least one spelling.
    AllSolved,
    /// The search for this word (0-based) came back empty.
    Unsolved { word: usize },
}

/// A full puzzle: the board, the word constraints in play order, and the
/// dictionary snapshot the search draws from.
///
/// The words are solved strictly in order. Each solved word fans the next
/// search out over its accepted spellings; the board itself is never
/// mutated, every search task works on its own clone.
pub struct Problem {
    alphabet: Alphabet,
    grid: LetterGrid,
    words: Vec<Arc<Word>>,
    dictionary: Arc<Vec<String>>,
    /// Dictionary subset admissible for any still-unsolved word.
    problem_candidates: Option<Vec<String>>,
    /// Word index the compiled candidate set belongs to.
    word_candidates: Option<(usize, Arc<WordCandidates>)>,
    /// In-flight search round and the word it searches.
    round: Option<(usize, SearchRound)>,
    /// Lengths of the still-unsolved words.
    active_lengths: BTreeSet<usize>,
}

impl Problem {
    /// Builds a problem from board rows and the comma-separated constraint
    /// list. `dictionary` must be sorted, lowercase and duplicate free; a
    /// partially loaded dictionary is caller error. Any validation failure
    /// aborts construction whole.
    pub fn new(
        rows: &[String],
        constraints: &str,
        dictionary: Arc<Vec<String>>,
        alphabet: Alphabet,
    ) -> Result<Self> {
        let grid = LetterGrid::new(rows, &alphabet)?;

        let mut words = Vec::new();
        for token in constraints.split(',') {
            words.push(Arc::new(Word::parse(token, &alphabet)?));
        }

        // Oversized length tokens must end up in the mismatch error below,
        // not in an overflow.
        let required = words
            .iter()
            .fold(0usize, |sum, word| sum.saturating_add(word.length()));
        let cells = grid.width() * grid.height();
        if required != cells {
            return Err(SolverError::LetterCountMismatch {
                grid: cells,
                required,
            });
        }

        let board_letters = grid.distinct_letters();
        for word in &words {
            for letter in word.hint_letters() {
                if !board_letters.contains(&letter) {
                    return Err(SolverError::HintLetterNotInGrid {
                        word: word.to_string(),
                        letter,
                    });
                }
            }
        }

        let mut problem = Self {
            alphabet,
            grid,
            words,
            dictionary,
            problem_candidates: None,
            word_candidates: None,
            round: None,
            active_lengths: BTreeSet::new(),
        };
        problem.refresh_active_lengths();
        Ok(problem)
    }

    pub fn grid(&self) -> &LetterGrid {
        &self.grid
    }

    pub fn words(&self) -> &[Arc<Word>] {
        &self.words
    }

    /// Index of the first word without a spelling, in play order.
    pub fn first_unsolved(&self) -> Option<usize> {
        self.words.iter().position(|word| !word.is_solved())
    }

    pub fn is_word_solved(&self, index: usize) -> bool {
        self.words.get(index).map_or(false, |word| word.is_solved())
    }

    /// True once every word has at least one accepted spelling.
    pub fn is_solved(&self) -> bool {
        self.words.iter().all(|word| word.is_solved())
    }

    /// Recomputes the lengths the problem tier must cover from the words
    /// still lacking a spelling.
    pub fn refresh_active_lengths(&mut self) {
        self.active_lengths = self
            .words
            .iter()
            .filter(|word| !word.is_solved())
            .map(|word| word.length())
            .collect();
    }

    /// Rebuilds both candidate tiers for the first unsolved word. The
    /// problem tier refilters its previous snapshot when one exists; the
    /// admissible set only ever shrinks.
    pub fn prepare_candidates(&mut self) -> Result<()> {
        self.refresh_active_lengths();
        let index = match self.first_unsolved() {
            Some(index) => index,
            None => {
                self.word_candidates = None;
                return Ok(());
            }
        };

        let tier = match &self.problem_candidates {
            Some(previous) => {
                problem_candidates(previous, &self.active_lengths, &self.grid, &self.alphabet)
            }
            None => problem_candidates(
                &self.dictionary,
                &self.active_lengths,
                &self.grid,
                &self.alphabet,
            ),
        };
        debug!("problem tier holds {} candidate words", tier.len());

        let word = &self.words[index];
        let compiled = WordCandidates::build(word, &tier)?;
        debug!(
            "word {} ({}) has {} candidates",
            index + 1,
            word,
            compiled.len()
        );
        self.problem_candidates = Some(tier);
        self.word_candidates = Some((index, Arc::new(compiled)));
        Ok(())
    }

    /// Fans out the search round for the first unsolved word. Returns false
    /// without touching anything when a round is already in flight or every
    /// word is solved.
    pub fn launch_search(&mut self) -> Result<bool> {
        if self.round.is_some() {
            return Ok(false);
        }
        let index = match self.first_unsolved() {
            Some(index) => index,
            None => return Ok(false),
        };

        let fresh = matches!(&self.word_candidates, Some((for_word, _)) if *for_word == index);
        if !fresh {
            self.prepare_candidates()?;
        }
        let candidates = match &self.word_candidates {
            Some((_, compiled)) => compiled.clone(),
            None => return Ok(false),
        };

        let predecessors = if index == 0 {
            Vec::new()
        } else {
            self.words[index - 1].solutions()
        };

        let word = &self.words[index];
        info!("searching word {} ({})", index + 1, word);
        let round = SearchRound::launch(&self.grid, &predecessors, word, &candidates);
        self.round = Some((index, round));
        Ok(true)
    }

    /// Blocks until the in-flight round finishes. No-op without one.
    pub fn await_search(&mut self) {
        if let Some((index, round)) = self.round.take() {
            round.wait();
            let word = &self.words[index];
            debug!(
                "word {} ({}) finished with {} spellings",
                index + 1,
                word,
                word.solutions().len()
            );
        }
    }

    /// Solves the words in order, one search round each. A round already in
    /// flight is awaited first. Stops at the first word the board and
    /// dictionary cannot produce.
    pub fn solve(&mut self) -> Result<SolveOutcome> {
        self.await_search();
        while let Some(index) = self.first_unsolved() {
            self.prepare_candidates()?;
            if !self.launch_search()? {
                return Ok(SolveOutcome::Unsolved { word: index });
            }
            self.await_search();
            if !self.is_word_solved(index) {
                warn!("no spelling found for word {} ({})", index + 1, self.words[index]);
                return Ok(SolveOutcome::Unsolved { word: index });
            }
        }
        Ok(SolveOutcome::AllSolved)
    }

    /// Chains for the completed puzzle: one per still-valid spelling of the
    /// last word, each walking from the first word to the last.
    pub fn final_chains(&self) -> Vec<Vec<Arc<Solution>>> {
        match self.words.last() {
            Some(last) => last
                .valid_solutions()
                .iter()
                .map(Solution::chain)
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary(words: &[&str]) -> Arc<Vec<String>> {
        let mut words: Vec<String> = words.iter().map(|word| word.to_string()).collect();
        words.sort_unstable();
        Arc::new(words)
    }

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn construction_checks_the_letter_count() {
        let result = Problem::new(
            &rows(&["ab", "cd"]),
            "3",
            dictionary(&[]),
            Alphabet::default(),
        );
        assert!(matches!(
            result,
            Err(SolverError::LetterCountMismatch {
                grid: 4,
                required: 3
            })
        ));
    }

    #[test]
    fn oversized_length_sums_report_a_mismatch() {
        // Three times i64::MAX overflows the usize running sum.
        let result = Problem::new(
            &rows(&["ab", "cd"]),
            "9223372036854775807,9223372036854775807,9223372036854775807",
            dictionary(&[]),
            Alphabet::default(),
        );
        assert!(matches!(
            result,
            Err(SolverError::LetterCountMismatch { grid: 4, .. })
        ));
    }

    #[test]
    fn mixed_case_input_is_normalized() {
        let mut problem = Problem::new(
            &rows(&["AB", "cd"]),
            "A_,2",
            dictionary(&["ab", "cd"]),
            Alphabet::default(),
        )
        .unwrap();
        assert_eq!(problem.solve().unwrap(), SolveOutcome::AllSolved);
        let first = problem.words()[0].valid_solutions();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].found_word(), "ab");
    }

    #[test]
    fn construction_checks_hint_letters_against_the_board() {
        let result = Problem::new(
            &rows(&["ab", "cd"]),
            "x_,2",
            dictionary(&[]),
            Alphabet::default(),
        );
        assert!(matches!(
            result,
            Err(SolverError::HintLetterNotInGrid { letter: 'x', .. })
        ));
    }

    #[test]
    fn construction_rejects_bad_constraint_tokens() {
        let result = Problem::new(
            &rows(&["ab", "cd"]),
            "2,0",
            dictionary(&[]),
            Alphabet::default(),
        );
        assert!(matches!(
            result,
            Err(SolverError::InvalidWordLength { .. })
        ));
    }

    #[test]
    fn active_lengths_cover_unsolved_words_only() {
        let mut problem = Problem::new(
            &rows(&["abc", "def"]),
            "2,4",
            dictionary(&["ad", "be"]),
            Alphabet::default(),
        )
        .unwrap();

        assert_eq!(problem.first_unsolved(), Some(0));
        assert_eq!(
            problem.active_lengths,
            [2, 4].into_iter().collect::<BTreeSet<_>>()
        );

        problem.prepare_candidates().unwrap();
        problem.launch_search().unwrap();
        problem.await_search();
        assert!(problem.is_word_solved(0));

        problem.refresh_active_lengths();
        assert_eq!(
            problem.active_lengths,
            [4].into_iter().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn each_branch_searches_its_own_collapsed_board() {
        let mut problem = Problem::new(
            &rows(&["ab", "cd"]),
            "2,2",
            dictionary(&["ab", "cd"]),
            Alphabet::default(),
        )
        .unwrap();

        assert_eq!(problem.solve().unwrap(), SolveOutcome::AllSolved);

        // Both length-2 dictionary words sit on adjacent cells, so the first
        // round finds them both.
        let first_solutions = problem.words()[0].solutions();
        let mut found: Vec<&str> = Vec::new();
        for solution in &first_solutions {
            assert!(solution.predecessor().is_none());
            if !found.contains(&solution.found_word()) {
                found.push(solution.found_word());
            }
        }
        found.sort_unstable();
        assert_eq!(found, vec!["ab", "cd"]);

        // Each second-round spelling was searched on its branch's collapsed
        // board: the other word, fallen to the bottom row.
        let second = &problem.words()[1];
        assert!(second.is_solved());
        for solution in second.solutions() {
            let predecessor = solution.predecessor().unwrap();
            let expected = match predecessor.found_word() {
                "ab" => vec![vec![' ', ' '], vec!['c', 'd']],
                "cd" => vec![vec![' ', ' '], vec!['a', 'b']],
                other => panic!("unexpected first word {}", other),
            };
            assert_eq!(solution.letters_before(), expected.as_slice());
            let complement = match predecessor.found_word() {
                "ab" => "cd",
                _ => "ab",
            };
            assert_eq!(solution.found_word(), complement);
        }

        let chains = problem.final_chains();
        assert_eq!(chains.len(), 2);
        for chain in &chains {
            assert_eq!(chain.len(), 2);
            assert!(chain[1].predecessor().is_some());
        }
    }

    #[test]
    fn unsolvable_words_end_the_run() {
        let mut problem = Problem::new(
            &rows(&["ab", "cd"]),
            "2,2",
            dictionary(&["zz"]),
            Alphabet::default(),
        )
        .unwrap();

        assert_eq!(
            problem.solve().unwrap(),
            SolveOutcome::Unsolved { word: 0 }
        );
        assert!(!problem.is_solved());
        assert!(problem.final_chains().is_empty());
    }

    #[test]
    fn launch_is_rejected_while_a_round_is_in_flight() {
        let mut problem = Problem::new(
            &rows(&["ab"]),
            "2",
            dictionary(&["ab"]),
            Alphabet::default(),
        )
        .unwrap();

        problem.prepare_candidates().unwrap();
        assert!(problem.launch_search().unwrap());
        assert!(!problem.launch_search().unwrap());
        problem.await_search();
        assert!(problem.is_word_solved(0));
        // Everything is solved, nothing left to launch.
        assert!(!problem.launch_search().unwrap());
    }

    #[test]
    fn solve_adopts_a_round_already_in_flight() {
        let mut problem = Problem::new(
            &rows(&["ab", "cd"]),
            "2,2",
            dictionary(&["ab", "cd"]),
            Alphabet::default(),
        )
        .unwrap();

        problem.prepare_candidates().unwrap();
        assert!(problem.launch_search().unwrap());
        // The round in flight must not pass for a finished run.
        assert_eq!(problem.solve().unwrap(), SolveOutcome::AllSolved);
        assert!(problem.is_solved());
        assert_eq!(problem.final_chains().len(), 2);
    }

    #[test]
    fn rejected_first_words_drop_their_chains() {
        let mut problem = Problem::new(
            &rows(&["ab", "cd"]),
            "2,2",
            dictionary(&["ab", "cd"]),
            Alphabet::default(),
        )
        .unwrap();
        problem.solve().unwrap();

        for solution in problem.words()[0].solutions() {
            if solution.found_word() == "cd" {
                solution.mark_invalid();
            }
        }

        let chains = problem.final_chains();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0][0].found_word(), "ab");
        assert_eq!(chains[0][1].found_word(), "cd");
    }

    #[test]
    fn words_solved_out_of_reach_report_false() {
        let problem = Problem::new(
            &rows(&["ab"]),
            "2",
            dictionary(&["ab"]),
            Alphabet::default(),
        )
        .unwrap();
        assert!(!problem.is_word_solved(5));
    }
}
