//! Replication channel: mirrors the session document between viewers.
//!
//! A channel stores one full document per key. Subscribers receive the whole
//! document whenever it changes (including echoes of their own writes) and
//! writers overwrite it wholesale. There are no partial writes and no merge.

mod http;
mod memory;

pub use http::HttpChannel;
pub use memory::MemoryChannel;

use crossword_arena_core::SessionState;
use derive_more::{Display, Error};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::instrument;

/// Something a subscription observed.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// Current remote document; `None` while it does not exist.
    Snapshot(Option<SessionState>),
    /// Transport failure; the subscription keeps running.
    Error(ChannelError),
}

/// Transport that mirrors the session document.
#[async_trait::async_trait]
pub trait ReplicationChannel: Send + Sync + std::fmt::Debug {
    /// Starts receiving snapshots of the document under `key`.
    async fn subscribe(&self, key: &str) -> Result<Subscription, ChannelError>;

    /// Overwrites the document under `key`.
    async fn write(&self, key: &str, state: &SessionState) -> Result<(), ChannelError>;
}

/// Live subscription; the feeding task stops when this is dropped.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    feeder: JoinHandle<()>,
}

impl Subscription {
    /// Wraps an event receiver and the task feeding it.
    pub fn new(events: mpsc::UnboundedReceiver<ChannelEvent>, feeder: JoinHandle<()>) -> Self {
        Self { events, feeder }
    }

    /// Waits for the next event; `None` once the feeder has stopped.
    pub async fn next(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.feeder.abort();
    }
}

/// Replication error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Channel error: {} at {}:{}", message, file, line)]
pub struct ChannelError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ChannelError {
    /// Creates a new channel error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for ChannelError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("HTTP error: {}", err))
    }
}

impl From<serde_json::Error> for ChannelError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Document encoding error: {}", err))
    }
}
