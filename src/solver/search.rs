use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

use log::debug;

use super::candidates::WordCandidates;
use super::grid::{LetterGrid, Position, NEIGHBOR_OFFSETS};
use super::solution::Solution;
use super::word::Word;

/// One predecessor branch the next word is searched on: the chain built so
/// far plus the board it left behind.
struct SearchBranch {
    predecessor: Option<Arc<Solution>>,
    grid: LetterGrid,
}

/// A fanned-out search round. Workers run on the global rayon pool; each
/// reports completion over a channel so the round can be awaited.
pub struct SearchRound {
    done: Receiver<()>,
    tasks: usize,
}

impl SearchRound {
    /// Launches one task per start cell and predecessor branch for `word`.
    /// Branches whose chain has already been rejected are skipped outright.
    pub fn launch(
        base: &LetterGrid,
        predecessors: &[Arc<Solution>],
        word: &Arc<Word>,
        candidates: &Arc<WordCandidates>,
    ) -> Self {
        let mut branches = Vec::new();
        if predecessors.is_empty() {
            branches.push(SearchBranch {
                predecessor: None,
                grid: base.clone(),
            });
        } else {
            let mut skipped = 0;
            for solution in predecessors {
                if solution.is_invalid() {
                    skipped += 1;
                    continue;
                }
                branches.push(SearchBranch {
                    predecessor: Some(solution.clone()),
                    grid: LetterGrid::from_solution(solution),
                });
            }
            if skipped > 0 {
                debug!("skipped {} rejected branches", skipped);
            }
        }

        let (done_tx, done) = channel();
        let mut tasks = 0;
        for branch in &branches {
            for cell in branch.grid.cells() {
                let grid = branch.grid.clone();
                let predecessor = branch.predecessor.clone();
                let word = word.clone();
                let candidates = candidates.clone();
                let done_tx = done_tx.clone();
                tasks += 1;
                rayon::spawn(move || {
                    search_from(grid, cell, &predecessor, &word, &candidates);
                    let _ = done_tx.send(());
                });
            }
        }
        debug!(
            "launched {} tasks across {} branches for word '{}'",
            tasks,
            branches.len(),
            word
        );
        Self { done, tasks }
    }

    /// Blocks until every task in the round has finished.
    pub fn wait(self) {
        for _ in 0..self.tasks {
            if self.done.recv().is_err() {
                // A worker lost to a panic drops its sender; once the
                // channel disconnects the round is drained either way.
                break;
            }
        }
    }
}

/// Runs one task: seeds the path at `start` and explores every extension.
fn search_from(
    mut grid: LetterGrid,
    start: Position,
    predecessor: &Option<Arc<Solution>>,
    word: &Word,
    candidates: &WordCandidates,
) {
    if grid.mark_occupied(start) {
        recursion_step(&mut grid, predecessor, word, candidates);
    }
}

/// One level of the backtracking search. The grid carries the in-progress
/// path and is restored to its entry state before returning.
fn recursion_step(
    grid: &mut LetterGrid,
    predecessor: &Option<Arc<Solution>>,
    word: &Word,
    candidates: &WordCandidates,
) {
    if chain_rejected(predecessor) {
        return;
    }

    let current = grid.current_word();
    if !word.matches_prefix(&current) {
        return;
    }
    if !candidates.has_prefix(&current) {
        return;
    }
    if word.matches_exact(&current) {
        if candidates.contains(&current) {
            word.add_solution(Arc::new(Solution::capture(grid, predecessor.clone())));
        }
        return;
    }

    let endpoint = match grid.endpoint() {
        Some(pos) => pos,
        None => return,
    };
    let next_index = grid.path_len();
    for delta in NEIGHBOR_OFFSETS {
        let next = match grid.neighbor(endpoint, delta) {
            Some(pos) => pos,
            None => continue,
        };
        if let Some(required) = word.hint_at(next_index) {
            if grid[next] != required {
                continue;
            }
        }
        if grid.mark_occupied(next) {
            recursion_step(grid, predecessor, word, candidates);
            grid.unmark_last();
        }
        if chain_rejected(predecessor) {
            return;
        }
    }
}

fn chain_rejected(predecessor: &Option<Arc<Solution>>) -> bool {
    predecessor
        .as_ref()
        .map_or(false, |solution| solution.is_invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::alphabet::Alphabet;

    fn run_search(rows: &[&str], token: &str, dictionary: &[&str]) -> Arc<Word> {
        let alphabet = Alphabet::default();
        let grid = LetterGrid::new(rows, &alphabet).unwrap();
        let word = Arc::new(Word::parse(token, &alphabet).unwrap());
        let mut sorted: Vec<String> = dictionary.iter().map(|w| w.to_string()).collect();
        sorted.sort_unstable();
        let candidates = Arc::new(WordCandidates::build(&word, &sorted).unwrap());
        SearchRound::launch(&grid, &[], &word, &candidates).wait();
        word
    }

    fn assert_solution_is_sound(solution: &Solution) {
        let letters = solution.letters_before();
        let height = letters.len();
        let width = letters[0].len();
        let length = solution.found_word().chars().count();

        let mut cells = vec![None; length];
        for row in 0..height {
            for col in 0..width {
                if let Some(index) = solution.path_index(Position { row, col }) {
                    assert!(cells[index].is_none(), "path index {} used twice", index);
                    cells[index] = Some(Position { row, col });
                }
            }
        }

        let mut spelled = String::new();
        for (index, cell) in cells.iter().enumerate() {
            let pos = cell.unwrap_or_else(|| panic!("path index {} missing", index));
            spelled.push(letters[pos.row][pos.col]);
            if index > 0 {
                let prev = cells[index - 1].unwrap();
                let row_gap = prev.row.abs_diff(pos.row);
                let col_gap = prev.col.abs_diff(pos.col);
                assert!(row_gap <= 1 && col_gap <= 1 && (row_gap, col_gap) != (0, 0));
            }
        }
        assert_eq!(spelled, solution.found_word());
    }

    #[test]
    fn finds_every_spelling_of_a_hinted_word() {
        let word = run_search(&["cat", "cat", "cat"], "c__", &["cat"]);
        let solutions = word.solutions();

        // One path per (c row, adjacent a row, adjacent t row) combination.
        assert_eq!(solutions.len(), 17);
        for solution in &solutions {
            assert_eq!(solution.found_word(), "cat");
            assert!(!solution.is_invalid());
            assert_solution_is_sound(solution);
        }
    }

    #[test]
    fn finds_nothing_without_a_matching_dictionary_word() {
        let word = run_search(&["cat", "cat", "cat"], "c__", &["dog"]);
        assert!(word.solutions().is_empty());
        assert!(!word.is_solved());
    }

    #[test]
    fn paths_never_reuse_a_cell() {
        // "aaa" can only be spelled with three distinct cells of the 2x2.
        let word = run_search(&["aa", "aa"], "3", &["aaa"]);
        for solution in word.solutions() {
            assert_solution_is_sound(&solution);
        }
        assert!(word.is_solved());
    }

    #[test]
    fn hints_prune_start_cells() {
        // Only paths starting on 't' survive the first hint position.
        let word = run_search(&["ta", "at"], "t_", &["ta", "at"]);
        for solution in word.solutions() {
            assert_eq!(solution.found_word(), "ta");
        }
        assert!(word.is_solved());
    }

    #[test]
    fn rejected_branches_are_skipped_at_launch() {
        let alphabet = Alphabet::default();
        let grid = LetterGrid::new(&["ab", "cd"], &alphabet).unwrap();

        // Two predecessor branches over the same board, one rejected.
        let mut seed = grid.clone();
        seed.mark_occupied(Position { row: 0, col: 0 });
        seed.mark_occupied(Position { row: 0, col: 1 });
        let rejected = Arc::new(Solution::capture(&seed, None));
        rejected.mark_invalid();
        let kept = Arc::new(Solution::capture(&seed, None));

        let word = Arc::new(Word::with_length(2));
        let dictionary = vec!["cd".to_string()];
        let candidates = Arc::new(WordCandidates::build(&word, &dictionary).unwrap());
        SearchRound::launch(&grid, &[rejected.clone(), kept.clone()], &word, &candidates).wait();

        let solutions = word.solutions();
        assert!(!solutions.is_empty());
        for solution in &solutions {
            let predecessor = solution.predecessor().unwrap();
            assert!(Arc::ptr_eq(predecessor, &kept));
        }
    }

    #[test]
    fn fully_hinted_words_still_need_a_real_path() {
        // "ad" is diagonal and spellable, "ac" is adjacent too; "ax" is not
        // on the board at all.
        let word = run_search(&["ab", "cd"], "ad", &[]);
        assert!(word.is_solved());
        for solution in word.solutions() {
            assert_eq!(solution.found_word(), "ad");
            assert_solution_is_sound(&solution);
        }

        let missing = run_search(&["ab", "cd"], "aa", &[]);
        assert!(!missing.is_solved());
    }
}
