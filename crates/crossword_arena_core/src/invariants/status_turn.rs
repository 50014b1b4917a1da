//! Status/turn consistency invariants.

use super::Invariant;
use crate::state::SessionState;
use crate::types::{Status, Turn};

/// Invariant: the match is finished exactly when every word is solved, and
/// a finished match has nobody to move.
pub struct FinishedIffAllSolved;

impl Invariant<SessionState> for FinishedIffAllSolved {
    fn holds(state: &SessionState) -> bool {
        let finished = state.status == Status::Finished;
        finished == state.all_solved() && (!finished || state.turn == Turn::None)
    }

    fn description() -> &'static str {
        "Status is finished iff every word is solved, with turn none"
    }
}

/// Invariant: a match in progress always has a side to move.
pub struct PlayingHasTurn;

impl Invariant<SessionState> for PlayingHasTurn {
    fn holds(state: &SessionState) -> bool {
        state.status != Status::Playing || state.turn.side().is_some()
    }

    fn description() -> &'static str {
        "Playing status has a human or ai turn"
    }
}
