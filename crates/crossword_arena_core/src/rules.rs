//! Turn/status state machine for a crossword battle.

use rand::Rng;
use tracing::{debug, error, info, instrument};

use crate::ai::{AiMove, plan_move};
use crate::invariants::{InvariantSet, SessionInvariants};
use crate::puzzle::Puzzle;
use crate::solve::{Evaluation, Solve, SolvePolicy, credit, evaluate};
use crate::state::SessionState;
use crate::types::{Entry, Letter, Sender, Side, Status, Turn, WordId};

/// Why a command left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Ignored {
    /// The match is not in progress.
    #[display("Game is not in progress")]
    NotPlaying,
    /// The other side holds the turn.
    #[display("It's not {}'s turn", _0)]
    NotYourTurn(Side),
    /// Coordinates outside the grid.
    #[display("Cell ({}, {}) is outside the grid", _0, _1)]
    OutOfBounds(usize, usize),
    /// Blocked cells never take letters.
    #[display("Cell ({}, {}) is blocked", _0, _1)]
    Blocked(usize, usize),
    /// The chosen word is already solved.
    #[display("Word {} is already solved", _0)]
    AlreadySolved(WordId),
    /// No word with this id.
    #[display("No word {}", _0)]
    UnknownWord(WordId),
    /// The AI has nothing left to solve.
    #[display("No unsolved words left")]
    NoUnsolvedWords,
    /// `start` while a match is running.
    #[display("Game is already in progress")]
    AlreadyPlaying,
}

/// Result of applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// State changed; the turn did not pass.
    Applied,
    /// Words were credited and the turn passed to the other side.
    Solved(Vec<Solve>),
    /// The last word was credited; the match is over.
    Finished(Vec<Solve>),
    /// Nothing changed.
    Ignored(Ignored),
}

impl Transition {
    /// Returns `true` unless the command was ignored.
    pub fn changed(&self) -> bool {
        !matches!(self, Transition::Ignored(_))
    }
}

/// Crossword battle engine: one puzzle, one session record.
#[derive(Debug, Clone)]
pub struct Game {
    puzzle: Puzzle,
    policy: SolvePolicy,
    state: SessionState,
}

impl Game {
    /// Creates a game showing the welcome state.
    #[instrument(skip(puzzle))]
    pub fn new(puzzle: Puzzle, policy: SolvePolicy) -> Self {
        let state = SessionState::welcome(&puzzle);
        Self {
            puzzle,
            policy,
            state,
        }
    }

    /// Returns the current session record.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the puzzle being played.
    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    /// Returns the solve policy.
    pub fn policy(&self) -> SolvePolicy {
        self.policy
    }

    /// Replaces the record wholesale (remote snapshot).
    #[instrument(skip_all, fields(status = %state.status, turn = %state.turn))]
    pub fn replace_state(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Starts a new match with a fresh grid, human to move.
    #[instrument(skip(self), fields(status = %self.state.status))]
    pub fn start(&mut self) -> Transition {
        if self.state.status == Status::Playing {
            debug!("Start ignored while playing");
            return Transition::Ignored(Ignored::AlreadyPlaying);
        }
        self.state = SessionState::started(&self.puzzle);
        info!("Game started");
        self.verify();
        Transition::Applied
    }

    /// Discards the current match and returns to the waiting state.
    #[instrument(skip(self), fields(status = %self.state.status))]
    pub fn reset(&mut self) -> Transition {
        self.state = SessionState::reset(&self.puzzle);
        info!("Game reset");
        self.verify();
        Transition::Applied
    }

    /// Human writes (or erases) a letter at `(row, col)`, then solves are checked.
    #[instrument(skip(self), fields(status = %self.state.status, turn = %self.state.turn))]
    pub fn enter(&mut self, row: usize, col: usize, entry: Entry) -> Transition {
        if let Some(reason) = self.refuse(Side::Human) {
            return Transition::Ignored(reason);
        }
        match self.state.grid.get(row, col) {
            None => return self.ignore(Ignored::OutOfBounds(row, col)),
            Some(cell) if cell.blocked => return self.ignore(Ignored::Blocked(row, col)),
            Some(_) => {}
        }

        self.state.grid.write(row, col, entry);

        let transition = match evaluate(&mut self.state, Side::Human, self.policy) {
            Evaluation::NoSolve => Transition::Applied,
            Evaluation::Solved { solves, .. } => {
                for solve in &solves {
                    self.state.say(
                        Sender::System,
                        format!("You solved \"{}\"! +{} points!", solve.answer, solve.points),
                    );
                }
                self.conclude(Side::Human, solves)
            }
        };
        self.verify();
        transition
    }

    /// AI fills in a word it chose, scores it, and passes the turn.
    #[instrument(skip(self, mv), fields(word_id = mv.word_id, status = %self.state.status, turn = %self.state.turn))]
    pub fn apply_ai_move(&mut self, mv: &AiMove) -> Transition {
        if let Some(reason) = self.refuse(Side::Ai) {
            return Transition::Ignored(reason);
        }
        let Some(index) = self.state.words.iter().position(|w| w.id == mv.word_id) else {
            return self.ignore(Ignored::UnknownWord(mv.word_id));
        };
        if self.state.words[index].solved {
            return self.ignore(Ignored::AlreadySolved(mv.word_id));
        }

        let word = self.state.words[index].clone();
        for ((row, col), c) in word.cells().zip(word.answer.chars()) {
            if let Some(letter) = Letter::new(c) {
                // Blocked cells are skipped; a built grid has none under a word.
                self.state.grid.write(row, col, Entry::Letter(letter));
            }
        }

        let solve = credit(&mut self.state, index, Side::Ai);
        self.state.say(Sender::Ai, mv.taunt.clone());
        let transition = self.conclude(Side::Ai, vec![solve]);
        self.verify();
        transition
    }

    /// Plans and applies the AI's move in one step.
    #[instrument(skip(self, rng))]
    pub fn ai_move<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Transition {
        if let Some(reason) = self.refuse(Side::Ai) {
            return Transition::Ignored(reason);
        }
        match plan_move(&self.state, rng) {
            Some(mv) => self.apply_ai_move(&mv),
            None => self.ignore(Ignored::NoUnsolvedWords),
        }
    }

    fn refuse(&self, side: Side) -> Option<Ignored> {
        let reason = if self.state.status != Status::Playing {
            Ignored::NotPlaying
        } else if self.state.turn != Turn::from(side) {
            Ignored::NotYourTurn(side)
        } else {
            return None;
        };
        debug!(side = %side, reason = %reason, "Command ignored");
        Some(reason)
    }

    fn ignore(&self, reason: Ignored) -> Transition {
        debug!(reason = %reason, "Command ignored");
        Transition::Ignored(reason)
    }

    /// Post-solve rule: finish when nothing is left, otherwise pass the turn.
    fn conclude(&mut self, side: Side, solves: Vec<Solve>) -> Transition {
        if self.state.all_solved() {
            self.state.status = Status::Finished;
            self.state.turn = Turn::None;
            info!(
                human_score = self.state.human_score,
                ai_score = self.state.ai_score,
                "All words solved, game finished"
            );
            Transition::Finished(solves)
        } else {
            self.state.turn = Turn::from(side.opponent());
            debug!(turn = %self.state.turn, "Turn passed");
            Transition::Solved(solves)
        }
    }

    fn verify(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        if let Err(violations) = SessionInvariants::check_all(&self.state) {
            error!(?violations, "Session invariants violated");
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Puzzle::battle_arena(), SolvePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::solves_are_monotonic;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn letter(c: char) -> Entry {
        Entry::Letter(Letter::new(c).expect("letter"))
    }

    fn type_across(game: &mut Game, row: usize, col: usize, text: &str) -> Transition {
        let mut last = Transition::Applied;
        for (i, c) in text.chars().enumerate() {
            last = game.enter(row, col + i, letter(c));
        }
        last
    }

    fn started() -> Game {
        let mut game = Game::default();
        assert_eq!(game.start(), Transition::Applied);
        game
    }

    #[test]
    fn typing_javascript_solves_word_one_and_passes_turn() {
        let mut game = started();
        let transition = type_across(&mut game, 2, 2, "javascript");

        match transition {
            Transition::Solved(solves) => {
                assert_eq!(solves.len(), 1);
                assert_eq!(solves[0].word_id, 1);
                assert_eq!(solves[0].points, 100);
            }
            other => panic!("expected solve, got {other:?}"),
        }
        let state = game.state();
        assert!(state.word(1).is_some_and(|w| w.solved));
        assert_eq!(state.human_score, 100);
        assert_eq!(state.turn, Turn::Ai);
        assert_eq!(state.status, Status::Playing);
        assert_eq!(
            state.chat.last().map(|m| (m.sender, m.text.as_str())),
            Some((Sender::System, "You solved \"JAVASCRIPT\"! +100 points!"))
        );
    }

    #[test]
    fn keystroke_order_does_not_matter() {
        let mut game = started();
        for (col, c) in [(10, 'D'), (7, 'N'), (9, 'E'), (8, 'O')] {
            game.enter(8, col, letter(c));
        }
        assert!(game.state().word(5).is_some_and(|w| w.solved));
        assert_eq!(game.state().human_score, 40);
    }

    #[test]
    fn non_solving_entry_keeps_human_turn() {
        let mut game = started();
        assert_eq!(game.enter(2, 2, letter('J')), Transition::Applied);
        assert_eq!(game.state().turn, Turn::Human);
        assert_eq!(game.enter(2, 2, Entry::Erase), Transition::Applied);
        assert_eq!(game.state().grid.get(2, 2).and_then(|c| c.letter), None);
    }

    #[test]
    fn input_before_start_is_ignored() {
        let mut game = Game::default();
        assert_eq!(
            game.enter(2, 2, letter('J')),
            Transition::Ignored(Ignored::NotPlaying)
        );
        assert_eq!(game.state().grid.get(2, 2).and_then(|c| c.letter), None);
    }

    #[test]
    fn out_of_bounds_and_blocked_are_ignored() {
        let mut game = started();
        assert_eq!(
            game.enter(15, 0, letter('A')),
            Transition::Ignored(Ignored::OutOfBounds(15, 0))
        );
        assert_eq!(
            game.enter(0, 0, letter('A')),
            Transition::Ignored(Ignored::Blocked(0, 0))
        );
    }

    #[test]
    fn human_input_on_ai_turn_is_ignored() {
        let mut game = started();
        type_across(&mut game, 8, 7, "NODE");
        assert_eq!(
            game.enter(2, 2, letter('J')),
            Transition::Ignored(Ignored::NotYourTurn(Side::Human))
        );
    }

    #[test]
    fn ai_move_solves_and_returns_turn() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut game = started();
        type_across(&mut game, 8, 7, "NODE");
        let before = game.state().clone();

        match game.ai_move(&mut rng) {
            Transition::Solved(solves) => {
                let solve = &solves[0];
                assert_eq!(solve.side, Side::Ai);
                assert_ne!(solve.word_id, 5);
                let word = game.state().word(solve.word_id).expect("word").clone();
                assert!(game.state().grid.spells(&word));
                assert_eq!(game.state().ai_score, word.points());
                assert_eq!(game.state().words_solved.ai, vec![word.id]);
            }
            other => panic!("expected AI solve, got {other:?}"),
        }
        assert_eq!(game.state().turn, Turn::Human);
        assert_eq!(game.state().chat.last().map(|m| m.sender), Some(Sender::Ai));
        assert!(solves_are_monotonic(&before, game.state()));
    }

    #[test]
    fn ai_move_out_of_turn_is_ignored() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = started();
        assert_eq!(
            game.ai_move(&mut rng),
            Transition::Ignored(Ignored::NotYourTurn(Side::Ai))
        );
    }

    #[test]
    fn ai_takes_the_last_word_and_finishes() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = started();
        let mut state = game.state().clone();
        for word in state.words.iter_mut().filter(|w| w.id != 4) {
            word.solved = true;
            state.words_solved.human.push(word.id);
            state.human_score += word.points();
        }
        state.turn = Turn::Ai;
        game.replace_state(state);

        match game.ai_move(&mut rng) {
            Transition::Finished(solves) => assert_eq!(solves[0].word_id, 4),
            other => panic!("expected finish, got {other:?}"),
        }
        let state = game.state();
        assert_eq!(state.status, Status::Finished);
        assert_eq!(state.turn, Turn::None);
        assert!(SessionInvariants::check_all(state).is_ok());

        assert_eq!(game.ai_move(&mut rng), Transition::Ignored(Ignored::NotPlaying));
        assert_eq!(
            game.enter(2, 2, letter('J')),
            Transition::Ignored(Ignored::NotPlaying)
        );
    }

    #[test]
    fn applying_solved_word_is_ignored() {
        let mut game = started();
        type_across(&mut game, 8, 7, "NODE");
        let mv = AiMove {
            word_id: 5,
            taunt: "again".into(),
        };
        assert_eq!(
            game.apply_ai_move(&mv),
            Transition::Ignored(Ignored::AlreadySolved(5))
        );
        let unknown = AiMove {
            word_id: 99,
            taunt: "?".into(),
        };
        assert_eq!(
            game.apply_ai_move(&unknown),
            Transition::Ignored(Ignored::UnknownWord(99))
        );
    }

    #[test]
    fn reset_mid_game_restores_waiting_state() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut game = started();
        type_across(&mut game, 2, 2, "JAVASCRIPT");
        game.ai_move(&mut rng);

        assert_eq!(game.reset(), Transition::Applied);
        let state = game.state();
        assert_eq!(state.status, Status::Waiting);
        assert_eq!(state.turn, Turn::Human);
        assert_eq!((state.human_score, state.ai_score), (0, 0));
        assert!(state.words.iter().all(|w| !w.solved));
        assert_eq!(state.words_solved.total(), 0);
        assert_eq!(state.chat[0].text, "Game has been reset.");
    }

    #[test]
    fn replicated_maximum_score_does_not_overflow() {
        let mut game = started();
        let mut json = serde_json::to_value(game.state()).expect("serialize");
        json["humanScore"] = serde_json::json!(u32::MAX);
        let remote: SessionState = serde_json::from_value(json).expect("deserialize");
        game.replace_state(remote);

        let transition = type_across(&mut game, 8, 7, "NODE");
        assert!(matches!(transition, Transition::Solved(_)));
        assert_eq!(game.state().human_score, u32::MAX);
        assert_eq!(game.state().turn, Turn::Ai);
    }

    #[test]
    fn start_is_refused_while_playing() {
        let mut game = started();
        game.enter(2, 2, letter('J'));
        assert_eq!(game.start(), Transition::Ignored(Ignored::AlreadyPlaying));
        assert!(game.state().grid.get(2, 2).is_some_and(|c| c.letter.is_some()));
    }

    #[test]
    fn start_after_finish_builds_fresh_board() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut game = started();
        let mut state = game.state().clone();
        state.words.iter_mut().for_each(|w| w.solved = true);
        state.words_solved.ai = state.words.iter().map(|w| w.id).collect();
        state.ai_score = state.words.iter().map(|w| w.points()).sum();
        state.status = Status::Finished;
        state.turn = Turn::None;
        game.replace_state(state);
        assert_eq!(game.ai_move(&mut rng), Transition::Ignored(Ignored::NotPlaying));

        assert_eq!(game.start(), Transition::Applied);
        assert_eq!(game.state().status, Status::Playing);
        assert_eq!(game.state().solved_count(), 0);
    }

    #[test]
    fn full_match_alternates_until_finished() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut game = started();
        let mut solved_before = 0;

        while game.state().status == Status::Playing {
            let transition = match game.state().turn {
                Turn::Human => {
                    let word = game.state().unsolved().next().expect("unsolved").clone();
                    let mut last = Transition::Applied;
                    for ((row, col), c) in word.cells().zip(word.answer.chars()) {
                        last = game.enter(row, col, letter(c));
                    }
                    last
                }
                Turn::Ai => game.ai_move(&mut rng),
                Turn::None => unreachable!("playing always has a turn"),
            };
            assert!(game.state().solved_count() >= solved_before);
            solved_before = game.state().solved_count();
            if let Transition::Solved(solves) = &transition {
                assert_eq!(Turn::from(solves[0].side.opponent()), game.state().turn);
            }
            assert!(SessionInvariants::check_all(game.state()).is_ok());
        }

        assert_eq!(game.state().status, Status::Finished);
        assert_eq!(game.state().turn, Turn::None);
        assert_eq!(game.state().solved_count(), 5);
    }
}
