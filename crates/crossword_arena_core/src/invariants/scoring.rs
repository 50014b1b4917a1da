//! Solve bookkeeping invariants.

use std::collections::HashSet;

use super::Invariant;
use crate::state::SessionState;
use crate::types::{Side, WordId};

/// Invariant: the per-side solved lists partition the solved words.
///
/// Every solved word appears in exactly one list, exactly once, and the
/// lists name no unsolved or unknown word.
pub struct SolvedPartition;

impl Invariant<SessionState> for SolvedPartition {
    fn holds(state: &SessionState) -> bool {
        let mut recorded = HashSet::new();
        let all_ids = state.words_solved.human.iter().chain(&state.words_solved.ai);
        for id in all_ids {
            if !recorded.insert(*id) {
                return false;
            }
        }

        let flagged: HashSet<WordId> = state.words.iter().filter(|w| w.solved).map(|w| w.id).collect();
        recorded == flagged
    }

    fn description() -> &'static str {
        "Solved word ids are partitioned between human and ai"
    }
}

/// Invariant: each score is the sum of `10 x length` over that side's words.
pub struct ScoresMatchSolves;

impl ScoresMatchSolves {
    fn expected(state: &SessionState, side: Side) -> u32 {
        state
            .words_solved
            .of(side)
            .iter()
            .filter_map(|id| state.word(*id))
            .map(|w| w.points())
            .sum()
    }
}

impl Invariant<SessionState> for ScoresMatchSolves {
    fn holds(state: &SessionState) -> bool {
        [Side::Human, Side::Ai]
            .into_iter()
            .all(|side| state.score(side) == Self::expected(state, side))
    }

    fn description() -> &'static str {
        "Scores equal 10 points per letter of each side's solved words"
    }
}
