//! In-process replication channel.

use super::{ChannelError, ChannelEvent, ReplicationChannel, Subscription};
use crossword_arena_core::SessionState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument};

type Documents = HashMap<String, watch::Sender<Option<SessionState>>>;

/// Channel backed by in-memory watch cells, one per key.
///
/// Clones share the same documents, so several clients in one process see
/// each other's writes. The channel can be taken offline to simulate a
/// transport outage.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    documents: Arc<Mutex<Documents>>,
    offline: Arc<AtomicBool>,
}

impl MemoryChannel {
    /// Creates an empty channel.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory replication channel");
        Self::default()
    }

    /// Fails every subsequent write while `offline` is true.
    #[instrument(skip(self))]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Current document under `key`, if any.
    pub fn document(&self, key: &str) -> Option<SessionState> {
        let documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        documents.get(key).and_then(|cell| cell.borrow().clone())
    }

    fn cell(&self, key: &str) -> watch::Sender<Option<SessionState>> {
        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        documents
            .entry(key.to_string())
            .or_insert_with(|| watch::channel(None).0)
            .clone()
    }
}

#[async_trait::async_trait]
impl ReplicationChannel for MemoryChannel {
    #[instrument(skip(self))]
    async fn subscribe(&self, key: &str) -> Result<Subscription, ChannelError> {
        let mut updates = self.cell(key).subscribe();
        let (tx, rx) = mpsc::unbounded_channel();

        let feeder = tokio::spawn(async move {
            loop {
                let snapshot = updates.borrow_and_update().clone();
                if tx.send(ChannelEvent::Snapshot(snapshot)).is_err() {
                    break;
                }
                if updates.changed().await.is_err() {
                    break;
                }
            }
            debug!("Memory subscription closed");
        });

        Ok(Subscription::new(rx, feeder))
    }

    #[instrument(skip(self, state), fields(status = %state.status, turn = %state.turn))]
    async fn write(&self, key: &str, state: &SessionState) -> Result<(), ChannelError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ChannelError::new("channel is offline"));
        }
        self.cell(key).send_replace(Some(state.clone()));
        debug!("Document written");
        Ok(())
    }
}
