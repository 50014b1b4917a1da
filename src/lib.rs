//! Crossword Arena library - human vs. AI crossword battle
//!
//! The game rules live in `crossword_arena_core`; this crate wires them to
//! the outside world.
//!
//! # Architecture
//!
//! - **Session**: [`ArenaClient`], the render/input boundary. Owns the local
//!   session document, schedules the AI move and mirrors state.
//! - **Replication**: [`ReplicationChannel`] with an in-process
//!   ([`MemoryChannel`]) and an HTTP ([`HttpChannel`]) implementation
//! - **Store**: axum document store backing the HTTP channel
//! - **TUI**: ratatui front end
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use crossword_arena::{ArenaClient, ArenaConfig, MemoryChannel};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ArenaClient::new(&ArenaConfig::default());
//! client.attach(Arc::new(MemoryChannel::new())).await?;
//! client.start();
//! client.click_cell(8, 7);
//! client.input_char('n');
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;
mod config;
mod replication;
mod session;
pub mod store;
pub mod tui;

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,crossword_arena=debug";

// Crate-level exports - CLI
pub use cli::{Cli, Command};

// Crate-level exports - Configuration
pub use config::{
    AiConfig, ArenaConfig, CONFIG_ENV_VAR, ConfigError, DEFAULT_CONFIG_PATH, RulesConfig,
    StoreConfig,
};

// Crate-level exports - Replication
pub use replication::{
    ChannelError, ChannelEvent, HttpChannel, MemoryChannel, ReplicationChannel, Subscription,
};

// Crate-level exports - Session
pub use session::ArenaClient;

// Crate-level exports - Store
pub use store::{DocumentStore, VersionedDocument, WriteReceipt};
