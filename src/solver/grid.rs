use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::alphabet::Alphabet;
use super::error::{Result, SolverError};
use super::solution::Solution;
use super::EMPTY;

/// Row/column coordinate on the board. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

/// The eight neighbor offsets in fixed row-major order.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Letter board with an in-progress path overlay.
///
/// The path marks cells with their 0-based position in the word being
/// spelled; consecutive positions are always 8-adjacent and no cell is
/// marked twice. Cloning deep-copies the letters and the overlay but shares
/// the snapshot of the letters the grid was created with.
#[derive(Debug, Clone)]
pub struct LetterGrid {
    width: usize,
    height: usize,
    /// Current letters; cells consumed by gravity hold the empty sentinel.
    letters: Vec<Vec<char>>,
    /// Letters as first loaded, shared by every clone of this grid.
    original: Arc<Vec<Vec<char>>>,
    /// Cell -> position in the in-progress path.
    path: Vec<Vec<Option<usize>>>,
    path_len: usize,
}

impl LetterGrid {
    /// Builds a grid from rows of letters, validating the shape and that
    /// every letter is in the alphabet. Rows are lowercased before
    /// validation.
    pub fn new<S: AsRef<str>>(rows: &[S], alphabet: &Alphabet) -> Result<Self> {
        let mut letters: Vec<Vec<char>> = Vec::with_capacity(rows.len());
        for (row, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.as_ref().to_lowercase().chars().collect();
            if let Some(first) = letters.first() {
                if cells.len() != first.len() {
                    return Err(SolverError::InconsistentRowLength {
                        row,
                        expected: first.len(),
                        found: cells.len(),
                    });
                }
            }
            for (col, &letter) in cells.iter().enumerate() {
                if !alphabet.contains(letter) {
                    return Err(SolverError::GridLetterOutsideAlphabet { letter, row, col });
                }
            }
            letters.push(cells);
        }
        if letters.is_empty() || letters[0].is_empty() {
            return Err(SolverError::EmptyGrid);
        }

        let width = letters[0].len();
        let height = letters.len();
        Ok(Self {
            width,
            height,
            original: Arc::new(letters.clone()),
            path: vec![vec![None; width]; height],
            path_len: 0,
            letters,
        })
    }

    /// Rebuilds the board `solution` was found on, with the solution's cells
    /// removed and gravity applied. Seeds the search for the next word.
    pub fn from_solution(solution: &Solution) -> Self {
        let letters = solution.letters_before().to_vec();
        let height = letters.len();
        let width = letters.first().map_or(0, |row| row.len());
        let mut grid = Self {
            width,
            height,
            original: Arc::new(letters.clone()),
            path: vec![vec![None; width]; height],
            path_len: 0,
            letters,
        };
        grid.apply_gravity(solution);
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Letters the grid was created with.
    pub fn original_letters(&self) -> &[Vec<char>] {
        &self.original
    }

    /// All board positions in row-major order.
    pub fn cells(&self) -> Vec<Position> {
        let mut result = Vec::with_capacity(self.width * self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                result.push(Position { row, col });
            }
        }
        result
    }

    /// In-bounds cell at `delta` from `pos`, if any.
    pub fn neighbor(&self, pos: Position, delta: (isize, isize)) -> Option<Position> {
        let row = pos.row as isize + delta.0;
        let col = pos.col as isize + delta.1;
        if row < 0 || row >= self.height as isize || col < 0 || col >= self.width as isize {
            return None;
        }
        Some(Position {
            row: row as usize,
            col: col as usize,
        })
    }

    /// Position of `pos` in the in-progress path, if the cell is marked.
    pub fn path_index(&self, pos: Position) -> Option<usize> {
        self.path[pos.row][pos.col]
    }

    /// Number of cells marked so far.
    pub fn path_len(&self) -> usize {
        self.path_len
    }

    /// Marks `pos` as the next cell of the in-progress path. Fails without
    /// side effect when out of bounds or already marked.
    pub fn mark_occupied(&mut self, pos: Position) -> bool {
        if pos.row >= self.height || pos.col >= self.width {
            return false;
        }
        if self.path[pos.row][pos.col].is_some() {
            return false;
        }
        self.path[pos.row][pos.col] = Some(self.path_len);
        self.path_len += 1;
        true
    }

    /// Unmarks the most recently marked cell and returns it. No-op on an
    /// empty path. The board is small, a scan is fine here.
    pub fn unmark_last(&mut self) -> Option<Position> {
        if self.path_len == 0 {
            return None;
        }
        let pos = self.find_index(self.path_len - 1);
        if let Some(pos) = pos {
            self.path[pos.row][pos.col] = None;
            self.path_len -= 1;
        }
        pos
    }

    /// Cell holding the highest path position, if any.
    pub fn endpoint(&self) -> Option<Position> {
        if self.path_len == 0 {
            return None;
        }
        self.find_index(self.path_len - 1)
    }

    fn find_index(&self, index: usize) -> Option<Position> {
        for row in 0..self.height {
            for col in 0..self.width {
                if self.path[row][col] == Some(index) {
                    return Some(Position { row, col });
                }
            }
        }
        None
    }

    /// Letters of the in-progress path in marking order.
    pub fn current_word(&self) -> String {
        let mut word = vec![EMPTY; self.path_len];
        for row in 0..self.height {
            for col in 0..self.width {
                if let Some(index) = self.path[row][col] {
                    word[index] = self.letters[row][col];
                }
            }
        }
        word.into_iter().collect()
    }

    /// Removes the cells of `solution` and lets each column's remaining
    /// letters fall toward the bottom, then clears the path overlay.
    pub fn apply_gravity(&mut self, solution: &Solution) {
        for row in 0..self.height {
            for col in 0..self.width {
                if solution.path_index(Position { row, col }).is_some() {
                    self.letters[row][col] = EMPTY;
                }
            }
        }
        for col in 0..self.width {
            let mut kept = Vec::with_capacity(self.height);
            for row in 0..self.height {
                if self.letters[row][col] != EMPTY {
                    kept.push(self.letters[row][col]);
                }
            }
            let offset = self.height - kept.len();
            for row in 0..self.height {
                self.letters[row][col] = if row < offset {
                    EMPTY
                } else {
                    kept[row - offset]
                };
            }
        }
        self.reset_path();
    }

    /// Clears the path overlay without touching the letters.
    pub fn reset_path(&mut self) {
        for row in self.path.iter_mut() {
            for cell in row.iter_mut() {
                *cell = None;
            }
        }
        self.path_len = 0;
    }

    /// Distinct letters currently on the board, emptied cells excluded.
    pub fn distinct_letters(&self) -> HashSet<char> {
        let mut result = HashSet::new();
        for row in &self.letters {
            for &letter in row {
                if letter != EMPTY {
                    result.insert(letter);
                }
            }
        }
        result
    }

    /// Snapshot of the current letters.
    pub fn letters_snapshot(&self) -> Vec<Vec<char>> {
        self.letters.clone()
    }

    /// Snapshot of the path overlay.
    pub fn path_snapshot(&self) -> Vec<Vec<Option<usize>>> {
        self.path.clone()
    }
}

impl std::ops::Index<Position> for LetterGrid {
    type Output = char;

    fn index(&self, index: Position) -> &Self::Output {
        &self.letters[index.row][index.col]
    }
}

impl fmt::Display for LetterGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.letters {
            for &letter in row {
                write!(f, "{} ", letter)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
