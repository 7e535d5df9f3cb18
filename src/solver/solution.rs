use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::grid::{LetterGrid, Position};

/// One accepted spelling of a word: the path it took, the board it was found
/// on, and the solution of the previous word it builds on.
///
/// Solutions form a tree. Several spellings of word n can share one
/// predecessor for word n-1, and invalidating any node takes all of its
/// descendants with it.
#[derive(Debug)]
pub struct Solution {
    /// Word spelled by the path.
    found_word: String,
    /// Cell -> position in the path, board shaped.
    path: Vec<Vec<Option<usize>>>,
    /// Board letters at the moment the word was accepted, before removal.
    letters_before: Vec<Vec<char>>,
    /// Solution of the previous word this one was searched on top of.
    predecessor: Option<Arc<Solution>>,
    /// Set when the user rejects this spelling.
    invalid: AtomicBool,
}

impl Solution {
    /// Snapshots the grid's in-progress path as an accepted solution.
    pub fn capture(grid: &LetterGrid, predecessor: Option<Arc<Solution>>) -> Self {
        Self {
            found_word: grid.current_word(),
            path: grid.path_snapshot(),
            letters_before: grid.letters_snapshot(),
            predecessor,
            invalid: AtomicBool::new(false),
        }
    }

    pub fn found_word(&self) -> &str {
        &self.found_word
    }

    /// Board letters before this word was removed.
    pub fn letters_before(&self) -> &[Vec<char>] {
        &self.letters_before
    }

    /// Position of `pos` in the solution path, if the cell was used.
    pub fn path_index(&self, pos: Position) -> Option<usize> {
        self.path[pos.row][pos.col]
    }

    pub fn path(&self) -> &[Vec<Option<usize>>] {
        &self.path
    }

    pub fn predecessor(&self) -> Option<&Arc<Solution>> {
        self.predecessor.as_ref()
    }

    /// Marks this spelling, and thereby all of its descendants, invalid.
    pub fn mark_invalid(&self) {
        self.invalid.store(true, Ordering::Relaxed);
    }

    /// True when this solution or any ancestor has been marked invalid.
    pub fn is_invalid(&self) -> bool {
        if self.invalid.load(Ordering::Relaxed) {
            return true;
        }
        match &self.predecessor {
            Some(previous) => previous.is_invalid(),
            None => false,
        }
    }

    /// Walks the chain from the first word's solution down to `leaf`.
    pub fn chain(leaf: &Arc<Solution>) -> Vec<Arc<Solution>> {
        let mut nodes = vec![leaf.clone()];
        let mut current = leaf.predecessor.clone();
        while let Some(node) = current {
            current = node.predecessor.clone();
            nodes.push(node);
        }
        nodes.reverse();
        nodes
    }
}
