//! Scripted opponent: picks a random unsolved word after a random pause.

use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::state::SessionState;
use crate::types::WordId;

/// Shortest think time in milliseconds.
pub const MIN_THINK_MS: u64 = 2_000;

/// Upper bound (exclusive) of the think time in milliseconds.
pub const MAX_THINK_MS: u64 = 5_000;

const TAUNTS: [&str; 4] = [
    "I've solved \"{answer}\"! Too easy!",
    "\"{answer}\" was no match for me!",
    "Just solved \"{answer}\". Your turn, human!",
    "Another one bites the dust: \"{answer}\"!",
];

/// A move the AI has decided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiMove {
    /// Word to fill in.
    pub word_id: WordId,
    /// Chat line announcing it.
    pub taunt: String,
}

/// Uniform think time in `[min_ms, max_ms)`; `min_ms` when the range is empty.
pub fn think_delay<R: Rng + ?Sized>(rng: &mut R, min_ms: u64, max_ms: u64) -> Duration {
    let millis = if min_ms < max_ms {
        rng.gen_range(min_ms..max_ms)
    } else {
        min_ms
    };
    Duration::from_millis(millis)
}

/// Picks one unsolved word uniformly at random.
pub fn pick_word<R: Rng + ?Sized>(state: &SessionState, rng: &mut R) -> Option<WordId> {
    let unsolved: Vec<WordId> = state.unsolved().map(|w| w.id).collect();
    unsolved.choose(rng).copied()
}

/// Picks one taunt template uniformly and fills in `answer`.
pub fn taunt<R: Rng + ?Sized>(answer: &str, rng: &mut R) -> String {
    let template = TAUNTS[rng.gen_range(0..TAUNTS.len())];
    template.replace("{answer}", answer)
}

/// Decides the AI's next move, or `None` when nothing is left to solve.
#[instrument(skip_all, fields(unsolved = state.unsolved().count()))]
pub fn plan_move<R: Rng + ?Sized>(state: &SessionState, rng: &mut R) -> Option<AiMove> {
    let word_id = pick_word(state, rng)?;
    let answer = state.word(word_id)?.answer.clone();
    let taunt = taunt(&answer, rng);
    debug!(word_id, answer = %answer, "AI chose word");
    Some(AiMove { word_id, taunt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Puzzle;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn think_delay_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let delay = think_delay(&mut rng, MIN_THINK_MS, MAX_THINK_MS);
            assert!(delay >= Duration::from_millis(MIN_THINK_MS));
            assert!(delay < Duration::from_millis(MAX_THINK_MS));
        }
    }

    #[test]
    fn empty_delay_range_uses_minimum() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(think_delay(&mut rng, 300, 300), Duration::from_millis(300));
    }

    #[test]
    fn picks_only_unsolved_words() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut state = SessionState::started(&Puzzle::battle_arena());
        for word in state.words.iter_mut().filter(|w| w.id != 3) {
            word.solved = true;
        }
        for _ in 0..20 {
            assert_eq!(pick_word(&state, &mut rng), Some(3));
        }
    }

    #[test]
    fn nothing_to_pick_when_all_solved() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut state = SessionState::started(&Puzzle::battle_arena());
        state.words.iter_mut().for_each(|w| w.solved = true);
        assert!(plan_move(&state, &mut rng).is_none());
    }

    #[test]
    fn taunt_mentions_answer() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let line = taunt("REACT", &mut rng);
            assert!(line.contains("\"REACT\""), "{line}");
        }
    }
}
