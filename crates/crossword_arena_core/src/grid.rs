//! The crossword grid and the grid builder.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::puzzle::Puzzle;
use crate::types::{Cell, Entry, Letter, Word};

/// Row-major grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Number of columns (of the first row).
    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Cell at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Rows of cells.
    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// Returns `true` if `(row, col)` is in bounds and not blocked.
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(|cell| !cell.blocked)
    }

    /// Writes an entry into an open cell.
    ///
    /// Returns `false` (and leaves the grid untouched) for out-of-bounds or
    /// blocked cells.
    pub fn write(&mut self, row: usize, col: usize, entry: Entry) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) if !cell.blocked => {
                cell.letter = entry.letter();
                true
            }
            _ => false,
        }
    }

    /// Letters along a word's cells; `None` for empty, blocked or missing cells.
    pub fn letters_of<'a>(&'a self, word: &'a Word) -> impl Iterator<Item = Option<Letter>> + 'a {
        word.cells().map(|(row, col)| {
            self.get(row, col)
                .filter(|cell| !cell.blocked)
                .and_then(|cell| cell.letter)
        })
    }

    /// Returns `true` if every cell of `word` holds the matching answer letter.
    pub fn spells(&self, word: &Word) -> bool {
        self.letters_of(word)
            .zip(word.answer.chars())
            .all(|(letter, expected)| {
                letter.is_some_and(|l| l.as_char() == expected.to_ascii_uppercase())
            })
    }
}

/// Builds the numbered, blocked/unblocked grid and the unsolved word list.
///
/// Numbers are stamped first (the first word starting on a cell keeps the
/// number), then word cells are opened, then every untouched cell is
/// blocked. The result depends only on `puzzle`.
#[instrument(skip(puzzle), fields(rows = puzzle.rows(), cols = puzzle.cols()))]
pub fn build_grid(puzzle: &Puzzle) -> (Grid, Vec<Word>) {
    let mut slots: Vec<Vec<Option<Cell>>> = vec![vec![None; puzzle.cols()]; puzzle.rows()];

    for template in puzzle.words() {
        let slot = &mut slots[template.row][template.col];
        if slot.is_none() {
            *slot = Some(Cell::numbered(template.id));
        }
    }

    let words: Vec<Word> = puzzle.words().iter().map(|t| t.to_word()).collect();

    for word in &words {
        for (row, col) in word.cells() {
            let slot = &mut slots[row][col];
            match slot {
                None => *slot = Some(Cell::open()),
                Some(cell) => cell.blocked = false,
            }
        }
    }

    let cells = slots
        .into_iter()
        .map(|row| row.into_iter().map(|slot| slot.unwrap_or_else(Cell::blocked)).collect())
        .collect();

    debug!(word_count = words.len(), "Grid built");
    (Grid { cells }, words)
}
