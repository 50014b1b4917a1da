//! Core domain types for the crossword battle.

use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Unique identifier of a word (also its printed clue number).
pub type WordId = u32;

/// Points awarded per answer letter.
pub const POINTS_PER_LETTER: u32 = 10;

/// A single uppercase `A`-`Z` letter placed in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Letter(char);

impl Letter {
    /// Accepts an ASCII letter in either case and stores it uppercase.
    pub fn new(c: char) -> Option<Self> {
        c.is_ascii_alphabetic().then(|| Self(c.to_ascii_uppercase()))
    }

    /// Returns the letter as an uppercase `char`.
    pub fn as_char(self) -> char {
        self.0
    }
}

/// Rejected letter input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("{:?} is not an ASCII letter", _0)]
pub struct InvalidLetter(#[error(not(source))] pub char);

impl TryFrom<char> for Letter {
    type Error = InvalidLetter;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Letter::new(c).ok_or(InvalidLetter(c))
    }
}

impl From<Letter> for char {
    fn from(letter: Letter) -> Self {
        letter.0
    }
}

impl std::fmt::Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a keystroke writes into the active cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Write a letter.
    Letter(Letter),
    /// Clear the cell.
    Erase,
}

impl Entry {
    /// The letter this entry leaves in the cell.
    pub fn letter(self) -> Option<Letter> {
        match self {
            Entry::Letter(letter) => Some(letter),
            Entry::Erase => None,
        }
    }
}

/// Orientation of a word on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Left to right along a row.
    Across,
    /// Top to bottom along a column.
    Down,
}

impl Direction {
    /// Coordinates of the `offset`-th cell of a word starting at `(row, col)`.
    ///
    /// Saturates, so a word from a replicated document can never overflow;
    /// saturated coordinates are off any grid.
    pub fn step(self, row: usize, col: usize, offset: usize) -> (usize, usize) {
        match self {
            Direction::Across => (row, col.saturating_add(offset)),
            Direction::Down => (row.saturating_add(offset), col),
        }
    }
}

/// One of the two competitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    /// The local human player.
    Human,
    /// The scripted opponent.
    Ai,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::Human => Side::Ai,
            Side::Ai => Side::Human,
        }
    }
}

/// Whose move is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Turn {
    /// Human may enter letters.
    Human,
    /// AI move is pending.
    Ai,
    /// Nobody moves (match over).
    None,
}

impl Turn {
    /// Returns the side holding the turn, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Turn::Human => Some(Side::Human),
            Turn::Ai => Some(Side::Ai),
            Turn::None => None,
        }
    }
}

impl From<Side> for Turn {
    fn from(side: Side) -> Self {
        match side {
            Side::Human => Turn::Human,
            Side::Ai => Turn::Ai,
        }
    }
}

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    /// Board shown, match not started.
    Waiting,
    /// Match in progress.
    Playing,
    /// Every word solved.
    Finished,
}

/// Author of a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    /// Game announcements.
    System,
    /// The human player.
    Human,
    /// The scripted opponent.
    Ai,
}

/// A square of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Letter currently entered, if any.
    pub letter: Option<Letter>,
    /// Clue number printed in the corner, if a word starts here.
    pub number: Option<WordId>,
    /// Blocked cells belong to no word and never take letters.
    pub blocked: bool,
}

impl Cell {
    /// An open cell with no number.
    pub fn open() -> Self {
        Self {
            letter: None,
            number: None,
            blocked: false,
        }
    }

    /// An open cell carrying a clue number.
    pub fn numbered(number: WordId) -> Self {
        Self {
            number: Some(number),
            ..Self::open()
        }
    }

    /// A blocked cell.
    pub fn blocked() -> Self {
        Self {
            blocked: true,
            ..Self::open()
        }
    }
}

/// A word placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Unique id, also the clue number.
    pub id: WordId,
    /// Clue text.
    pub clue: String,
    /// Uppercase answer without spaces.
    pub answer: String,
    /// Orientation.
    pub direction: Direction,
    /// Zero-based start row.
    pub row: usize,
    /// Zero-based start column.
    pub col: usize,
    /// Set once, never cleared.
    pub solved: bool,
}

impl Word {
    /// Number of letters in the answer.
    pub fn len(&self) -> usize {
        self.answer.chars().count()
    }

    /// Returns `true` for an empty answer.
    pub fn is_empty(&self) -> bool {
        self.answer.is_empty()
    }

    /// Score awarded for solving this word.
    pub fn points(&self) -> u32 {
        POINTS_PER_LETTER * self.len() as u32
    }

    /// Coordinates of every cell the word covers, in reading order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.len()).map(|i| self.direction.step(self.row, self.col, i))
    }

    /// Returns `true` if the word passes through `(row, col)`.
    pub fn covers(&self, row: usize, col: usize) -> bool {
        self.cells().any(|cell| cell == (row, col))
    }
}

/// Solved word ids per side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordsSolved {
    /// Words the human solved, in solve order.
    pub human: Vec<WordId>,
    /// Words the AI solved, in solve order.
    pub ai: Vec<WordId>,
}

impl WordsSolved {
    /// Ids solved by `side`.
    pub fn of(&self, side: Side) -> &[WordId] {
        match side {
            Side::Human => &self.human,
            Side::Ai => &self.ai,
        }
    }

    /// Records a solve for `side`.
    pub fn record(&mut self, side: Side, id: WordId) {
        match side {
            Side::Human => self.human.push(id),
            Side::Ai => self.ai.push(id),
        }
    }

    /// Total number of recorded solves.
    pub fn total(&self) -> usize {
        self.human.len() + self.ai.len()
    }
}

/// A line in the match chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct ChatMessage {
    /// Author.
    pub sender: Sender,
    /// Message text.
    #[new(into)]
    pub text: String,
    /// Creation time.
    #[new(value = "Utc::now()")]
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_accepts_either_case() {
        assert_eq!(Letter::new('j').map(Letter::as_char), Some('J'));
        assert_eq!(Letter::new('Q').map(Letter::as_char), Some('Q'));
        assert!(Letter::new('1').is_none());
        assert!(Letter::new('é').is_none());
        assert!(Letter::new(' ').is_none());
    }

    #[test]
    fn letter_deserialization_rejects_non_letters() {
        let ok: Letter = serde_json::from_str("\"a\"").expect("letter");
        assert_eq!(ok.as_char(), 'A');
        assert!(serde_json::from_str::<Letter>("\"7\"").is_err());
    }

    #[test]
    fn word_cells_follow_direction() {
        let word = Word {
            id: 2,
            clue: "Front-end framework".into(),
            answer: "REACT".into(),
            direction: Direction::Down,
            row: 1,
            col: 5,
            solved: false,
        };
        let cells: Vec<_> = word.cells().collect();
        assert_eq!(cells, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
        assert_eq!(word.points(), 50);
        assert!(word.covers(3, 5));
        assert!(!word.covers(3, 6));
    }

    #[test]
    fn cells_near_usize_max_saturate() {
        let word = Word {
            id: 9,
            clue: "far away".into(),
            answer: "NODE".into(),
            direction: Direction::Across,
            row: 0,
            col: usize::MAX - 1,
            solved: false,
        };
        let cells: Vec<_> = word.cells().collect();
        assert_eq!(cells.last(), Some(&(0, usize::MAX)));
        assert!(!word.covers(0, 0));
    }

    #[test]
    fn enums_use_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&Status::Waiting).unwrap(), "\"waiting\"");
        assert_eq!(serde_json::to_string(&Turn::None).unwrap(), "\"none\"");
        assert_eq!(serde_json::to_string(&Direction::Across).unwrap(), "\"across\"");
        assert_eq!(Sender::Ai.to_string(), "ai");
    }
}
