//! Solve detection: finds words whose cells now spell their answer.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::state::SessionState;
use crate::types::{Side, WordId};

/// How many completed words a single evaluation resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SolvePolicy {
    /// Resolve only the first completed word (by id) per pass.
    #[default]
    FirstMatch,
    /// Resolve every completed word in one pass, in id order.
    AllCompleted,
}

/// A word credited to a side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solve {
    /// Solved word.
    pub word_id: WordId,
    /// Its answer.
    pub answer: String,
    /// Points credited.
    pub points: u32,
    /// Who gets the points.
    pub side: Side,
}

/// Result of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// No unsolved word is complete; nothing changed.
    NoSolve,
    /// One or more words were credited.
    Solved {
        /// Credited words, in id order.
        solves: Vec<Solve>,
        /// Every word is now solved.
        all_solved: bool,
    },
}

impl Evaluation {
    /// Returns `true` if anything was credited.
    pub fn is_solve(&self) -> bool {
        matches!(self, Evaluation::Solved { .. })
    }
}

/// Checks unsolved words against the grid and credits completed ones to `side`.
///
/// Credits `10 x answer length` per word and records the id under `side`.
/// Chat, turn and status are left to the caller.
#[instrument(skip(state), fields(side = %side, policy = %policy))]
pub fn evaluate(state: &mut SessionState, side: Side, policy: SolvePolicy) -> Evaluation {
    let completed: Vec<usize> = state
        .words
        .iter()
        .enumerate()
        .filter(|(_, word)| !word.solved && state.grid.spells(word))
        .map(|(index, _)| index)
        .take(match policy {
            SolvePolicy::FirstMatch => 1,
            SolvePolicy::AllCompleted => usize::MAX,
        })
        .collect();

    if completed.is_empty() {
        debug!("No word completed");
        return Evaluation::NoSolve;
    }

    let solves: Vec<Solve> = completed
        .into_iter()
        .map(|index| credit(state, index, side))
        .collect();

    Evaluation::Solved {
        solves,
        all_solved: state.all_solved(),
    }
}

/// Marks the word at `index` solved and credits `side`.
pub(crate) fn credit(state: &mut SessionState, index: usize, side: Side) -> Solve {
    let word = &mut state.words[index];
    word.solved = true;
    let solve = Solve {
        word_id: word.id,
        answer: word.answer.clone(),
        points: word.points(),
        side,
    };
    state.add_score(side, solve.points);
    state.words_solved.record(side, solve.word_id);
    info!(
        word_id = solve.word_id,
        answer = %solve.answer,
        points = solve.points,
        side = %side,
        "Word solved"
    );
    solve
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Puzzle, WordTemplate};
    use crate::types::{Direction, Entry, Letter};

    fn type_word(state: &mut SessionState, id: WordId, text: &str) {
        let word = state.word(id).expect("word").clone();
        for ((row, col), c) in word.cells().zip(text.chars()) {
            let letter = Letter::new(c).expect("letter");
            state.grid.write(row, col, Entry::Letter(letter));
        }
    }

    #[test]
    fn incomplete_word_is_not_solved() {
        let mut state = SessionState::started(&Puzzle::battle_arena());
        type_word(&mut state, 1, "JAVASCRIP");
        assert_eq!(evaluate(&mut state, Side::Human, SolvePolicy::FirstMatch), Evaluation::NoSolve);
        assert_eq!(state.human_score, 0);
    }

    #[test]
    fn lowercase_entry_solves_word() {
        let mut state = SessionState::started(&Puzzle::battle_arena());
        type_word(&mut state, 5, "node");
        let evaluation = evaluate(&mut state, Side::Human, SolvePolicy::FirstMatch);
        assert!(evaluation.is_solve());
        assert!(state.word(5).is_some_and(|w| w.solved));
        assert_eq!(state.human_score, 40);
        assert_eq!(state.words_solved.human, vec![5]);
    }

    #[test]
    fn solved_word_is_not_credited_twice() {
        let mut state = SessionState::started(&Puzzle::battle_arena());
        type_word(&mut state, 5, "NODE");
        evaluate(&mut state, Side::Human, SolvePolicy::FirstMatch);
        assert_eq!(evaluate(&mut state, Side::Human, SolvePolicy::FirstMatch), Evaluation::NoSolve);
        assert_eq!(state.human_score, 40);
    }

    fn two_word_state() -> SessionState {
        // CAT across and COW down share (0,0); the C written last completes both.
        let puzzle = Puzzle::new(
            3,
            3,
            vec![
                WordTemplate::new(1, "feline", "CAT", Direction::Across, 0, 0),
                WordTemplate::new(2, "bovine", "COW", Direction::Down, 0, 0),
            ],
        )
        .expect("valid");
        let mut state = SessionState::started(&puzzle);
        for (row, col, c) in [(0, 1, 'A'), (0, 2, 'T'), (1, 0, 'O'), (2, 0, 'W'), (0, 0, 'C')] {
            state
                .grid
                .write(row, col, Entry::Letter(Letter::new(c).expect("letter")));
        }
        state
    }

    #[test]
    fn first_match_resolves_one_word_per_pass() {
        let mut state = two_word_state();
        let evaluation = evaluate(&mut state, Side::Human, SolvePolicy::FirstMatch);
        match evaluation {
            Evaluation::Solved { solves, all_solved } => {
                assert_eq!(solves.len(), 1);
                assert_eq!(solves[0].word_id, 1);
                assert!(!all_solved);
            }
            Evaluation::NoSolve => panic!("expected a solve"),
        }
        assert!(!state.word(2).is_some_and(|w| w.solved));
    }

    #[test]
    fn all_completed_resolves_every_word() {
        let mut state = two_word_state();
        let evaluation = evaluate(&mut state, Side::Human, SolvePolicy::AllCompleted);
        match evaluation {
            Evaluation::Solved { solves, all_solved } => {
                let ids: Vec<_> = solves.iter().map(|s| s.word_id).collect();
                assert_eq!(ids, vec![1, 2]);
                assert!(all_solved);
            }
            Evaluation::NoSolve => panic!("expected solves"),
        }
        assert_eq!(state.human_score, 60);
    }

    #[test]
    fn ai_side_gets_credit_when_it_triggers() {
        let mut state = SessionState::started(&Puzzle::battle_arena());
        type_word(&mut state, 2, "REACT");
        evaluate(&mut state, Side::Ai, SolvePolicy::FirstMatch);
        assert_eq!(state.ai_score, 50);
        assert_eq!(state.words_solved.ai, vec![2]);
        assert!(state.words_solved.human.is_empty());
    }
}
