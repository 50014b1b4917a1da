//! First-class invariants for the session record.
//!
//! Invariants are logical properties that must hold for every session state
//! the rules produce. They are checked after every transition in debug
//! builds and can be tested independently.

mod monotonic_solves;
mod scoring;
mod status_turn;

pub use monotonic_solves::solves_are_monotonic;
pub use scoring::{ScoresMatchSolves, SolvedPartition};
pub use status_turn::{FinishedIffAllSolved, PlayingHasTurn};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn check<S, I: Invariant<S>>(state: &S, violations: &mut Vec<InvariantViolation>) {
    if !I::holds(state) {
        violations.push(InvariantViolation::new(I::description()));
    }
}

fn into_result(violations: Vec<InvariantViolation>) -> Result<(), Vec<InvariantViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check::<S, I1>(state, &mut violations);
        check::<S, I2>(state, &mut violations);
        into_result(violations)
    }
}

impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check::<S, I1>(state, &mut violations);
        check::<S, I2>(state, &mut violations);
        check::<S, I3>(state, &mut violations);
        check::<S, I4>(state, &mut violations);
        into_result(violations)
    }
}

/// Every session-state invariant as a composable set.
pub type SessionInvariants = (
    FinishedIffAllSolved,
    PlayingHasTurn,
    SolvedPartition,
    ScoresMatchSolves,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Puzzle;
    use crate::state::SessionState;
    use crate::types::{Status, Turn};

    #[test]
    fn fresh_states_hold() {
        let puzzle = Puzzle::battle_arena();
        for state in [
            SessionState::welcome(&puzzle),
            SessionState::reset(&puzzle),
            SessionState::started(&puzzle),
        ] {
            assert!(SessionInvariants::check_all(&state).is_ok());
        }
    }

    #[test]
    fn detects_every_violation() {
        let mut state = SessionState::started(&Puzzle::battle_arena());
        state.turn = Turn::None;
        state.words[0].solved = true;
        state.human_score = 5;

        let violations = SessionInvariants::check_all(&state).unwrap_err();
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn two_invariants_as_set() {
        let mut state = SessionState::started(&Puzzle::battle_arena());
        state.status = Status::Finished;
        type StatusOnly = (FinishedIffAllSolved, PlayingHasTurn);
        assert!(StatusOnly::check_all(&state).is_err());
    }
}
