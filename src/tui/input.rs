//! Key mapping and cursor movement for keyboard navigation.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossword_arena_core::{Grid, Word, WordId};

/// What a key press asks the arena to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move the cursor (arrow key).
    Move(KeyCode),
    /// Type a letter into the active cell.
    Letter(char),
    /// Clear the active cell.
    Erase,
    /// Select the next clue.
    NextClue,
    /// Start a match.
    Start,
    /// Reset the match.
    Reset,
    /// Leave the client.
    Quit,
}

/// Maps a key event to an action.
pub fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return (key.code == KeyCode::Char('c')).then_some(Action::Quit);
    }
    match key.code {
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => Some(Action::Move(key.code)),
        KeyCode::Char(c) if c.is_ascii_alphabetic() => Some(Action::Letter(c)),
        KeyCode::Backspace | KeyCode::Delete => Some(Action::Erase),
        KeyCode::Tab => Some(Action::NextClue),
        KeyCode::F(2) => Some(Action::Start),
        KeyCode::F(5) => Some(Action::Reset),
        KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Moves to the nearest open cell in the arrow's direction; stays put if none.
pub fn move_cursor(grid: &Grid, cursor: (usize, usize), key: KeyCode) -> (usize, usize) {
    let (mut row, mut col) = cursor;
    loop {
        let next = match key {
            KeyCode::Up => row.checked_sub(1).map(|r| (r, col)),
            KeyCode::Down => Some((row + 1, col)),
            KeyCode::Left => col.checked_sub(1).map(|c| (row, c)),
            KeyCode::Right => Some((row, col + 1)),
            _ => None,
        };
        match next {
            Some((r, c)) if r < grid.rows() && c < grid.cols() => {
                (row, col) = (r, c);
                if grid.is_open(row, col) {
                    return (row, col);
                }
            }
            _ => return cursor,
        }
    }
}

/// First open cell in reading order.
pub fn first_open(grid: &Grid) -> Option<(usize, usize)> {
    (0..grid.rows())
        .flat_map(|row| (0..grid.cols()).map(move |col| (row, col)))
        .find(|&(row, col)| grid.is_open(row, col))
}

/// Clue after `current` in id order, wrapping around.
pub fn next_clue(words: &[Word], current: Option<WordId>) -> Option<WordId> {
    let position = current.and_then(|id| words.iter().position(|w| w.id == id));
    match position {
        Some(i) => words.get((i + 1) % words.len()).map(|w| w.id),
        None => words.first().map(|w| w.id),
    }
}

/// Cell after `cell` along `word`, if `cell` is not its last.
pub fn advance(word: &Word, cell: (usize, usize)) -> Option<(usize, usize)> {
    let mut cells = word.cells().skip_while(|c| *c != cell);
    cells.next()?;
    cells.next()
}
