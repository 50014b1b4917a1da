//! Puzzle definitions: grid size plus word templates.

use std::collections::HashSet;

use derive_more::{Display, Error};
use tracing::instrument;

use crate::types::{Direction, Word, WordId};

/// A word as it appears in a puzzle definition, before play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordTemplate {
    /// Unique id, also the clue number.
    pub id: WordId,
    /// Clue text.
    pub clue: String,
    /// Answer; normalised to uppercase on validation.
    pub answer: String,
    /// Orientation.
    pub direction: Direction,
    /// Zero-based start row.
    pub row: usize,
    /// Zero-based start column.
    pub col: usize,
}

impl WordTemplate {
    /// Creates a template.
    pub fn new(
        id: WordId,
        clue: impl Into<String>,
        answer: impl Into<String>,
        direction: Direction,
        row: usize,
        col: usize,
    ) -> Self {
        Self {
            id,
            clue: clue.into(),
            answer: answer.into(),
            direction,
            row,
            col,
        }
    }

    /// A fresh, unsolved word for this template.
    pub fn to_word(&self) -> Word {
        Word {
            id: self.id,
            clue: self.clue.clone(),
            answer: self.answer.clone(),
            direction: self.direction,
            row: self.row,
            col: self.col,
            solved: false,
        }
    }
}

/// A validated puzzle: every word fits the grid and ids are unique.
///
/// Words are kept in ascending id order, which is the order used for
/// numbering and for solve detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    rows: usize,
    cols: usize,
    words: Vec<WordTemplate>,
}

impl Puzzle {
    /// Validates a puzzle definition.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError`] for empty dimensions, an empty word list,
    /// zero or duplicate ids, answers that are empty or not `A`-`Z`, and
    /// words that run off the grid.
    #[instrument(skip(words), fields(word_count = words.len()))]
    pub fn new(rows: usize, cols: usize, words: Vec<WordTemplate>) -> Result<Self, PuzzleError> {
        if rows == 0 || cols == 0 {
            return Err(PuzzleError::new(format!(
                "Grid must have at least one row and column, got {}x{}",
                rows, cols
            )));
        }
        if words.is_empty() {
            return Err(PuzzleError::new("Puzzle has no words"));
        }

        let mut seen = HashSet::new();
        let mut normalised = Vec::with_capacity(words.len());
        for mut word in words {
            if word.id == 0 {
                return Err(PuzzleError::new("Word ids must be positive"));
            }
            if !seen.insert(word.id) {
                return Err(PuzzleError::new(format!("Duplicate word id {}", word.id)));
            }
            if word.answer.is_empty() || !word.answer.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(PuzzleError::new(format!(
                    "Word {} answer {:?} must be non-empty A-Z letters",
                    word.id, word.answer
                )));
            }
            word.answer = word.answer.to_ascii_uppercase();

            let len = word.answer.len();
            let last = match word.direction {
                Direction::Across => word.col.checked_add(len - 1).map(|c| (word.row, c)),
                Direction::Down => word.row.checked_add(len - 1).map(|r| (r, word.col)),
            };
            if !last.is_some_and(|(last_row, last_col)| last_row < rows && last_col < cols) {
                return Err(PuzzleError::new(format!(
                    "Word {} ({}) runs off the {}x{} grid",
                    word.id, word.answer, rows, cols
                )));
            }
            normalised.push(word);
        }
        normalised.sort_by_key(|w| w.id);

        Ok(Self {
            rows,
            cols,
            words: normalised,
        })
    }

    /// The compiled-in 15x15 battle puzzle.
    #[instrument]
    pub fn battle_arena() -> Self {
        Self {
            rows: 15,
            cols: 15,
            words: vec![
                WordTemplate::new(1, "Popular programming language", "JAVASCRIPT", Direction::Across, 2, 2),
                WordTemplate::new(2, "Front-end framework", "REACT", Direction::Down, 1, 5),
                WordTemplate::new(3, "Database used with Firebase", "FIRESTORE", Direction::Across, 5, 4),
                WordTemplate::new(4, "CSS framework", "TAILWIND", Direction::Down, 3, 9),
                WordTemplate::new(5, "JavaScript runtime", "NODE", Direction::Across, 8, 7),
            ],
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Word templates in id order.
    pub fn words(&self) -> &[WordTemplate] {
        &self.words
    }
}

impl Default for Puzzle {
    fn default() -> Self {
        Self::battle_arena()
    }
}

/// Invalid puzzle definition.
#[derive(Debug, Clone, Display, Error)]
#[display("Puzzle error: {} at {}:{}", message, file, line)]
pub struct PuzzleError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl PuzzleError {
    /// Creates a new puzzle error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
