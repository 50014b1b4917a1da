//! Command-line interface for crossword_arena.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Crossword Arena - human vs. AI crossword battle
#[derive(Parser, Debug)]
#[command(name = "crossword_arena")]
#[command(about = "Crossword battle against a scripted AI, mirrored through a document store", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config (default: $CROSSWORD_ARENA_CONFIG or crossword_arena.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP document store
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Play in the terminal, locally or against a document store
    Play {
        /// Document store URL. If not provided, plays with an in-process channel.
        #[arg(long)]
        store_url: Option<String>,
    },

    /// Watch a match in the terminal without driving the AI
    Spectate {
        /// Document store URL
        #[arg(long)]
        store_url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_play_with_config() {
        let cli = Cli::parse_from([
            "crossword_arena",
            "play",
            "--store-url",
            "http://localhost:3000",
            "--config",
            "arena.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("arena.toml")));
        match cli.command {
            Command::Play { store_url } => {
                assert_eq!(store_url.as_deref(), Some("http://localhost:3000"))
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::parse_from(["crossword_arena", "serve"]);
        match cli.command {
            Command::Serve { host, port } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 3000);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn spectate_requires_store_url() {
        assert!(Cli::try_parse_from(["crossword_arena", "spectate"]).is_err());
    }
}
