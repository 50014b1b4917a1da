//! Replication over the HTTP document store.

use super::{ChannelError, ChannelEvent, ReplicationChannel, Subscription};
use crate::store::{VersionedDocument, WriteReceipt};
use crossword_arena_core::SessionState;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// What the poller last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seen {
    Nothing,
    Absent,
    Version(u64),
}

/// Channel that writes with `PUT` and watches by polling `GET`.
#[derive(Debug, Clone)]
pub struct HttpChannel {
    base_url: String,
    client: reqwest::Client,
    poll_interval: Duration,
}

impl HttpChannel {
    /// Creates a channel against the store at `base_url`.
    #[instrument(skip(base_url), fields(base_url = %base_url.as_ref()))]
    pub fn new(base_url: impl AsRef<str>, poll_interval: Duration) -> Self {
        let base_url = base_url.as_ref().trim_end_matches('/').to_string();
        info!(base_url = %base_url, ?poll_interval, "Creating HTTP replication channel");
        Self {
            base_url,
            client: reqwest::Client::new(),
            poll_interval,
        }
    }

    fn document_url(&self, key: &str) -> String {
        format!("{}/documents/{}", self.base_url, key)
    }

    /// Checks that the store answers `/health`.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn health(&self) -> Result<(), ChannelError> {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Fetches the document; `None` when the store has none.
    #[instrument(skip(self))]
    pub async fn fetch(&self, key: &str) -> Result<Option<VersionedDocument>, ChannelError> {
        let response = self.client.get(self.document_url(key)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let document = response.error_for_status()?.json().await?;
        Ok(Some(document))
    }
}

#[async_trait::async_trait]
impl ReplicationChannel for HttpChannel {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn subscribe(&self, key: &str) -> Result<Subscription, ChannelError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = self.clone();
        let key = key.to_string();

        let feeder = tokio::spawn(async move {
            let mut seen = Seen::Nothing;
            loop {
                let event = match channel.fetch(&key).await {
                    Ok(None) if seen != Seen::Absent => {
                        seen = Seen::Absent;
                        Some(ChannelEvent::Snapshot(None))
                    }
                    Ok(Some(doc)) if seen != Seen::Version(doc.version) => {
                        seen = Seen::Version(doc.version);
                        debug!(version = doc.version, "Remote document changed");
                        match serde_json::from_value::<SessionState>(doc.document) {
                            Ok(state) => Some(ChannelEvent::Snapshot(Some(state))),
                            Err(e) => {
                                warn!(error = %e, "Remote document is malformed, treating as absent");
                                Some(ChannelEvent::Snapshot(None))
                            }
                        }
                    }
                    Ok(_) => None,
                    Err(e) => {
                        warn!(error = %e, "Polling the document store failed");
                        seen = Seen::Nothing;
                        Some(ChannelEvent::Error(e))
                    }
                };

                if let Some(event) = event
                    && tx.send(event).is_err()
                {
                    break;
                }
                tokio::time::sleep(channel.poll_interval).await;
            }
            debug!("HTTP subscription closed");
        });

        Ok(Subscription::new(rx, feeder))
    }

    #[instrument(skip(self, state), fields(status = %state.status, turn = %state.turn))]
    async fn write(&self, key: &str, state: &SessionState) -> Result<(), ChannelError> {
        let receipt: WriteReceipt = self
            .client
            .put(self.document_url(key))
            .json(state)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(version = receipt.version, "Document written");
        Ok(())
    }
}
