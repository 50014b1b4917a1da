//! The shared session record replicated to every viewer.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::grid::{Grid, build_grid};
use crate::puzzle::Puzzle;
use crate::types::{ChatMessage, Sender, Side, Status, Turn, Word, WordId, WordsSolved};

/// Complete state of one match.
///
/// This is the replicated document: it is always replaced wholesale and
/// never merged field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// The grid with entered letters.
    pub grid: Grid,
    /// Human score.
    pub human_score: u32,
    /// AI score.
    pub ai_score: u32,
    /// Match lifecycle.
    pub status: Status,
    /// Whose move is accepted.
    pub turn: Turn,
    /// Solved ids per side.
    pub words_solved: WordsSolved,
    /// Chat log, oldest first.
    pub chat: Vec<ChatMessage>,
    /// Words with their solved flags, in id order.
    pub words: Vec<Word>,
}

impl SessionState {
    /// State shown before the first game: waiting, human to move, welcome chat.
    #[instrument(skip(puzzle))]
    pub fn welcome(puzzle: &Puzzle) -> Self {
        Self::fresh(
            puzzle,
            Status::Waiting,
            vec![
                ChatMessage::new(Sender::System, "Welcome to Crossword Battle Arena!"),
                ChatMessage::new(
                    Sender::System,
                    "Click Start Game to begin playing against AI.",
                ),
            ],
        )
    }

    /// State after a reset: waiting, human to move.
    #[instrument(skip(puzzle))]
    pub fn reset(puzzle: &Puzzle) -> Self {
        Self::fresh(
            puzzle,
            Status::Waiting,
            vec![
                ChatMessage::new(Sender::System, "Game has been reset."),
                ChatMessage::new(Sender::System, "Click Start Game to begin a new game."),
            ],
        )
    }

    /// State at the start of a match: playing, human to move.
    #[instrument(skip(puzzle))]
    pub fn started(puzzle: &Puzzle) -> Self {
        Self::fresh(
            puzzle,
            Status::Playing,
            vec![
                ChatMessage::new(Sender::System, "Game started! Your turn first."),
                ChatMessage::new(Sender::Ai, "Good luck, human! You will need it!"),
            ],
        )
    }

    fn fresh(puzzle: &Puzzle, status: Status, chat: Vec<ChatMessage>) -> Self {
        let (grid, words) = build_grid(puzzle);
        Self {
            grid,
            human_score: 0,
            ai_score: 0,
            status,
            turn: Turn::Human,
            words_solved: WordsSolved::default(),
            chat,
            words,
        }
    }

    /// Score of `side`.
    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Human => self.human_score,
            Side::Ai => self.ai_score,
        }
    }

    /// Scores come from replicated documents, so they saturate instead of overflowing.
    pub(crate) fn add_score(&mut self, side: Side, points: u32) {
        let score = match side {
            Side::Human => &mut self.human_score,
            Side::Ai => &mut self.ai_score,
        };
        *score = score.saturating_add(points);
    }

    /// Looks up a word by id.
    pub fn word(&self, id: WordId) -> Option<&Word> {
        self.words.iter().find(|w| w.id == id)
    }

    /// Words not yet solved, in id order.
    pub fn unsolved(&self) -> impl Iterator<Item = &Word> {
        self.words.iter().filter(|w| !w.solved)
    }

    /// Number of solved words.
    pub fn solved_count(&self) -> usize {
        self.words.iter().filter(|w| w.solved).count()
    }

    /// Returns `true` once every word is solved.
    pub fn all_solved(&self) -> bool {
        self.words.iter().all(|w| w.solved)
    }

    /// Returns `true` if `side` may act now.
    pub fn is_turn_of(&self, side: Side) -> bool {
        self.status == Status::Playing && self.turn == Turn::from(side)
    }

    /// First word (by id) passing through `(row, col)`.
    pub fn word_at(&self, row: usize, col: usize) -> Option<&Word> {
        self.words.iter().find(|w| w.covers(row, col))
    }

    /// Appends a chat line.
    pub fn say(&mut self, sender: Sender, text: impl Into<String>) {
        self.chat.push(ChatMessage::new(sender, text));
    }
}
