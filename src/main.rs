//! Crossword Arena - Unified CLI
//!
//! Document store server and terminal clients.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use crossword_arena::{
    ArenaClient, ArenaConfig, Cli, Command, DEFAULT_LOG_FILTER, HttpChannel, MemoryChannel,
    ReplicationChannel, store, tui,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config_path = ArenaConfig::resolve_path(cli.config);

    match cli.command {
        Command::Serve { host, port } => run_store(host, port).await,
        Command::Play { store_url } => {
            tui::init_file_logging()?;
            let mut config = ArenaConfig::load(&config_path)?;
            if let Some(url) = store_url.clone() {
                config = config.with_store_url(url);
            }
            run_client(config, store_url.is_some(), tui::Role::Player).await
        }
        Command::Spectate { store_url } => {
            tui::init_file_logging()?;
            let config = ArenaConfig::load(&config_path)?
                .with_store_url(store_url)
                .without_ai();
            run_client(config, true, tui::Role::Spectator).await
        }
    }
}

/// Run the HTTP document store
async fn run_store(host: String, port: u16) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    info!(host = %host, port, "Starting Crossword Arena document store");
    store::serve(host, port).await
}

/// Run a terminal client, replicated over HTTP or in-process
#[instrument(skip(config), fields(store_url = %config.store().url()))]
async fn run_client(config: ArenaConfig, over_http: bool, role: tui::Role) -> Result<()> {
    let client = ArenaClient::new(&config);

    let channel: Arc<dyn ReplicationChannel> = if over_http {
        let http = HttpChannel::new(
            config.store().url(),
            Duration::from_millis(*config.store().poll_interval_ms()),
        );
        if let Err(e) = http.health().await {
            warn!(error = %e, "Document store is not answering");
        }
        Arc::new(http)
    } else {
        Arc::new(MemoryChannel::new())
    };

    if let Err(e) = client.attach(channel).await {
        warn!(error = %e, "Continuing without replication");
    }

    let result = tui::run(client.clone(), role, over_http).await;
    client.detach();
    result
}
