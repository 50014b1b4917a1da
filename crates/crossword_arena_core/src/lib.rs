//! Crossword Arena core - rules for a human vs. AI crossword battle
//!
//! This crate holds everything that does not touch I/O: the puzzle table,
//! grid construction, the replicated session record, solve detection, the
//! turn/status state machine and the scripted opponent's move selection.
//!
//! # Example
//!
//! ```
//! use crossword_arena_core::{Entry, Game, Letter, Status, Turn};
//!
//! let mut game = Game::default();
//! game.start();
//! for (i, c) in "NODE".chars().enumerate() {
//!     let letter = Letter::new(c).expect("ascii letter");
//!     game.enter(8, 7 + i, Entry::Letter(letter));
//! }
//! assert_eq!(game.state().human_score, 40);
//! assert_eq!(game.state().turn, Turn::Ai);
//! assert_eq!(game.state().status, Status::Playing);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod ai;
mod grid;
pub mod invariants;
mod puzzle;
mod rules;
mod solve;
mod state;
mod types;

// Crate-level exports - AI opponent
pub use ai::{AiMove, MAX_THINK_MS, MIN_THINK_MS, pick_word, plan_move, taunt, think_delay};

// Crate-level exports - Grid
pub use grid::{Grid, build_grid};

// Crate-level exports - Puzzle definition
pub use puzzle::{Puzzle, PuzzleError, WordTemplate};

// Crate-level exports - Rules engine
pub use rules::{Game, Ignored, Transition};

// Crate-level exports - Solve detection
pub use solve::{Evaluation, Solve, SolvePolicy, evaluate};

// Crate-level exports - Session record
pub use state::SessionState;

// Crate-level exports - Domain types
pub use types::{
    Cell, ChatMessage, Direction, Entry, InvalidLetter, Letter, POINTS_PER_LETTER, Sender, Side,
    Status, Turn, Word, WordId, WordsSolved,
};
