//! HTTP document store: the server side of the HTTP replication channel.
//!
//! Documents are kept in memory, one per key, each with a version counter
//! that increases on every write. The store never inspects or merges a
//! document; the last write wins.

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceBuilder;
use tracing::{debug, info, instrument};

/// A stored document with its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedDocument {
    /// Increases by one on every write.
    pub version: u64,
    /// The document as written.
    pub document: serde_json::Value,
}

/// Reply to a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReceipt {
    /// Version assigned to the write.
    pub version: u64,
}

/// Shared in-memory document table.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Arc<Mutex<HashMap<String, VersionedDocument>>>,
}

impl DocumentStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating document store");
        Self::default()
    }

    /// Returns the document under `key`.
    #[instrument(skip(self))]
    pub fn get(&self, key: &str) -> Option<VersionedDocument> {
        let documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        documents.get(key).cloned()
    }

    /// Replaces the document under `key` and returns its new version.
    #[instrument(skip(self, document))]
    pub fn put(&self, key: &str, document: serde_json::Value) -> u64 {
        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        let version = documents.get(key).map_or(1, |d| d.version + 1);
        documents.insert(key.to_string(), VersionedDocument { version, document });
        debug!(version, "Document stored");
        version
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn read_document(
    State(store): State<DocumentStore>,
    Path(key): Path<String>,
) -> Result<Json<VersionedDocument>, StatusCode> {
    store.get(&key).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn write_document(
    State(store): State<DocumentStore>,
    Path(key): Path<String>,
    Json(document): Json<serde_json::Value>,
) -> Json<WriteReceipt> {
    let version = store.put(&key, document);
    Json(WriteReceipt { version })
}

/// Builds the store's routes with request logging.
pub fn router(store: DocumentStore) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/documents/{key}", get(read_document).put(write_document))
        .with_state(store)
        .layer(ServiceBuilder::new().map_request(|req: Request| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
}

/// Serves the document store until the process exits.
#[instrument]
pub async fn serve(host: String, port: u16) -> anyhow::Result<()> {
    let app = router(DocumentStore::new());
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(address = %listener.local_addr()?, "Document store ready");
    axum::serve(listener, app).await?;
    Ok(())
}
