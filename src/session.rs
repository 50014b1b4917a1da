//! Arena client: the render/input boundary around the game engine.
//!
//! The client owns the local copy of the session document, the active cell,
//! the selected clue and the connected flag. Local commands are synchronous
//! and never await while holding the state lock. The AI move is a deferred
//! task bound to an epoch counter; replication writes go through an ordered
//! background writer.

use crate::config::{AiConfig, ArenaConfig};
use crate::replication::{ChannelError, ChannelEvent, ReplicationChannel};
use crossword_arena_core::{
    Entry, Game, Letter, Puzzle, SessionState, Side, Status, Transition, Turn, WordId, think_delay,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Own writes remembered for echo detection.
const MAX_OUTGOING: usize = 64;

/// Handle to one viewer's arena. Clones share the same state.
#[derive(Debug, Clone)]
pub struct ArenaClient {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    inner: Mutex<Inner>,
    document_key: String,
    ai: AiConfig,
    revision: watch::Sender<u64>,
}

#[derive(Debug)]
struct Inner {
    game: Game,
    active_cell: Option<(usize, usize)>,
    selected_clue: Option<WordId>,
    connected: bool,
    epoch: u64,
    /// `None` after a detach, so the next settle re-arms.
    phase: Option<(Status, Turn)>,
    pending_ai: Option<JoinHandle<()>>,
    rng: StdRng,
    outbox: Option<mpsc::UnboundedSender<SessionState>>,
    outgoing: VecDeque<SessionState>,
    tasks: Vec<JoinHandle<()>>,
}

impl ArenaClient {
    /// Creates a client on the standard puzzle with an entropy-seeded RNG.
    pub fn new(config: &ArenaConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a client whose AI choices come from `rng`.
    #[instrument(skip_all, fields(document_key = %config.document_key(), ai_enabled = config.ai().enabled()))]
    pub fn with_rng(config: &ArenaConfig, rng: StdRng) -> Self {
        let game = Game::new(Puzzle::battle_arena(), *config.rules().solve_policy());
        let phase = Some((game.state().status, game.state().turn));
        let (revision, _) = watch::channel(0);
        info!("Creating arena client");
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    game,
                    active_cell: None,
                    selected_clue: None,
                    connected: false,
                    epoch: 0,
                    phase,
                    pending_ai: None,
                    rng,
                    outbox: None,
                    outgoing: VecDeque::new(),
                    tasks: Vec::new(),
                }),
                document_key: config.document_key().clone(),
                ai: config.ai().clone(),
                revision,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify(&self) {
        self.shared.revision.send_modify(|revision| *revision += 1);
    }

    /// Snapshot of the session document.
    pub fn current_state(&self) -> SessionState {
        self.lock().game.state().clone()
    }

    /// Cell receiving letter input.
    pub fn active_cell(&self) -> Option<(usize, usize)> {
        self.lock().active_cell
    }

    /// Highlighted clue.
    pub fn selected_clue(&self) -> Option<WordId> {
        self.lock().selected_clue
    }

    /// Whether the replication channel is believed reachable.
    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// Whether an AI move is scheduled.
    pub fn ai_pending(&self) -> bool {
        self.lock()
            .pending_ai
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Current `(status, turn)` period.
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    /// Receiver that changes whenever anything visible changes.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Makes `(row, col)` the active cell and selects the first word through it.
    ///
    /// Accepted only on the human's turn, on an open in-bounds cell.
    #[instrument(skip(self))]
    pub fn click_cell(&self, row: usize, col: usize) -> bool {
        let mut inner = self.lock();
        let state = inner.game.state();
        if !state.is_turn_of(Side::Human) || !state.grid.is_open(row, col) {
            debug!("Click ignored");
            return false;
        }
        let word = state.word_at(row, col).map(|w| w.id);

        inner.active_cell = Some((row, col));
        if word.is_some() {
            inner.selected_clue = word;
        }
        drop(inner);
        self.notify();
        true
    }

    /// Writes into the active cell; `None` when no cell is active.
    #[instrument(skip(self))]
    pub fn input_letter(&self, entry: Entry) -> Option<Transition> {
        let mut inner = self.lock();
        let Some((row, col)) = inner.active_cell else {
            debug!("Input ignored without an active cell");
            return None;
        };
        let transition = inner.game.enter(row, col, entry);
        if transition.changed() {
            self.settle(&mut inner, false, true);
        }
        Some(transition)
    }

    /// Maps a typed character to an entry; non-letters are dropped.
    pub fn input_char(&self, c: char) -> Option<Transition> {
        let letter = Letter::new(c)?;
        self.input_letter(Entry::Letter(letter))
    }

    /// Starts a new match.
    #[instrument(skip(self))]
    pub fn start(&self) -> Transition {
        let mut inner = self.lock();
        let transition = inner.game.start();
        if transition.changed() {
            inner.active_cell = None;
            inner.selected_clue = None;
            self.settle(&mut inner, true, true);
        }
        transition
    }

    /// Abandons the current match.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Transition {
        let mut inner = self.lock();
        let transition = inner.game.reset();
        inner.active_cell = None;
        inner.selected_clue = None;
        self.settle(&mut inner, true, true);
        transition
    }

    /// Highlights a clue; unknown ids are ignored.
    #[instrument(skip(self))]
    pub fn select_clue(&self, id: WordId) -> bool {
        let mut inner = self.lock();
        if inner.game.state().word(id).is_none() {
            debug!("Unknown clue ignored");
            return false;
        }
        inner.selected_clue = Some(id);
        drop(inner);
        self.notify();
        true
    }

    /// Subscribes to `channel` and mirrors the document from now on.
    ///
    /// An absent remote document is seeded from local state. A failed
    /// subscription leaves the client working locally, disconnected.
    #[instrument(skip_all, fields(document_key = %self.shared.document_key))]
    pub async fn attach(&self, channel: Arc<dyn ReplicationChannel>) -> Result<(), ChannelError> {
        let key = self.shared.document_key.clone();
        let mut subscription = match channel.subscribe(&key).await {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(error = %e, "Subscribe failed, playing offline");
                self.set_connected(false);
                return Err(e);
            }
        };

        let (outbox, mut queue) = mpsc::unbounded_channel::<SessionState>();
        let writer = {
            let client = self.clone();
            let key = key.clone();
            tokio::spawn(async move {
                while let Some(mut state) = queue.recv().await {
                    while let Ok(newer) = queue.try_recv() {
                        state = newer;
                    }
                    if let Err(e) = channel.write(&key, &state).await {
                        warn!(error = %e, "Replication write failed");
                        client.set_connected(false);
                    }
                }
            })
        };

        {
            let mut inner = self.lock();
            inner.connected = true;
            inner.outbox = Some(outbox);
            inner.outgoing.clear();
            for task in inner.tasks.drain(..) {
                task.abort();
            }
            inner.tasks.push(writer);
            self.settle(&mut inner, false, false);
        }

        let listener = {
            let client = self.clone();
            tokio::spawn(async move {
                while let Some(event) = subscription.next().await {
                    client.on_channel_event(event);
                }
            })
        };
        self.lock().tasks.push(listener);

        info!("Attached to replication channel");
        self.notify();
        Ok(())
    }

    /// Stops mirroring; local play continues.
    #[instrument(skip(self))]
    pub fn detach(&self) {
        let mut inner = self.lock();
        for task in inner.tasks.drain(..) {
            task.abort();
        }
        inner.outbox = None;
        inner.connected = false;
        if let Some(task) = inner.pending_ai.take() {
            task.abort();
        }
        inner.phase = None;
        drop(inner);
        info!("Detached from replication channel");
        self.notify();
    }

    fn set_connected(&self, connected: bool) {
        let mut inner = self.lock();
        if inner.connected == connected {
            return;
        }
        inner.connected = connected;
        drop(inner);
        info!(connected, "Connection state changed");
        self.notify();
    }

    fn on_channel_event(&self, event: ChannelEvent) {
        let mut inner = self.lock();
        match event {
            ChannelEvent::Snapshot(None) => {
                info!("Remote document absent, seeding from local state");
                self.mark_connected(&mut inner);
                self.publish(&mut inner);
            }
            ChannelEvent::Snapshot(Some(state)) => {
                self.mark_connected(&mut inner);
                if let Some(pos) = inner.outgoing.iter().position(|sent| *sent == state) {
                    inner.outgoing.drain(..=pos);
                    debug!("Echo of own write");
                    return;
                }
                if *inner.game.state() == state {
                    return;
                }
                debug!(status = %state.status, turn = %state.turn, "Applying remote snapshot");
                inner.game.replace_state(state);
                self.settle(&mut inner, false, false);
            }
            ChannelEvent::Error(e) => {
                warn!(error = %e, "Replication channel error");
                if inner.connected {
                    inner.connected = false;
                    drop(inner);
                    self.notify();
                }
            }
        }
    }

    fn mark_connected(&self, inner: &mut Inner) {
        if !inner.connected && inner.outbox.is_some() {
            inner.connected = true;
            info!("Replication channel reachable again");
            self.notify();
        }
    }

    /// Follows up a state change: epoch bookkeeping, AI arming, push, notify.
    fn settle(&self, inner: &mut Inner, new_game: bool, publish: bool) {
        let phase = (inner.game.state().status, inner.game.state().turn);
        if new_game || inner.phase != Some(phase) {
            inner.phase = Some(phase);
            inner.epoch += 1;
            if let Some(task) = inner.pending_ai.take() {
                task.abort();
                debug!(epoch = inner.epoch, "Pending AI move cancelled");
            }
            if phase == (Status::Playing, Turn::Ai) {
                self.arm_ai(inner);
            }
        }
        if publish {
            self.publish(inner);
        }
        self.notify();
    }

    fn arm_ai(&self, inner: &mut Inner) {
        if !*self.shared.ai.enabled() {
            debug!("AI disabled on this client");
            return;
        }
        let delay = think_delay(
            &mut inner.rng,
            *self.shared.ai.min_delay_ms(),
            *self.shared.ai.max_delay_ms(),
        );
        let epoch = inner.epoch;
        let client = self.clone();
        info!(epoch, delay_ms = delay.as_millis() as u64, "AI move scheduled");
        inner.pending_ai = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            client.fire_ai(epoch);
        }));
    }

    fn fire_ai(&self, epoch: u64) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!(epoch, current = inner.epoch, "Stale AI move discarded");
            return;
        }
        inner.pending_ai = None;

        let Inner { game, rng, .. } = &mut *inner;
        let transition = game.ai_move(rng);
        if transition.changed() {
            self.settle(&mut inner, false, true);
        }
    }

    fn publish(&self, inner: &mut Inner) {
        let Some(outbox) = inner.outbox.as_ref() else {
            return;
        };
        if !inner.connected {
            debug!("Disconnected, not publishing");
            return;
        }
        let state = inner.game.state().clone();
        if outbox.send(state.clone()).is_err() {
            warn!("Replication writer has stopped");
            return;
        }
        inner.outgoing.push_back(state);
        while inner.outgoing.len() > MAX_OUTGOING {
            inner.outgoing.pop_front();
        }
    }
}
