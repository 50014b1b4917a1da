//! Monotonic solves: a solved flag never reverts within a match.

use crate::state::SessionState;

/// Checks the transition `before -> after` never un-solves a word.
///
/// Only meaningful between states of the same match; `start` and `reset`
/// replace the record wholesale and are exempt.
pub fn solves_are_monotonic(before: &SessionState, after: &SessionState) -> bool {
    before
        .words
        .iter()
        .filter(|w| w.solved)
        .all(|w| after.word(w.id).is_some_and(|now| now.solved))
        && after.solved_count() >= before.solved_count()
}
