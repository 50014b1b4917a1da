//! Arena configuration loaded from TOML.

use crossword_arena_core::{MAX_THINK_MS, MIN_THINK_MS, SolvePolicy};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "crossword_arena.toml";

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "CROSSWORD_ARENA_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Key of the shared session document.
    #[serde(default = "default_document_key")]
    document_key: String,

    /// Scripted opponent settings.
    #[serde(default)]
    ai: AiConfig,

    /// Game rules.
    #[serde(default)]
    rules: RulesConfig,

    /// Document store settings.
    #[serde(default)]
    store: StoreConfig,
}

/// Scripted opponent settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AiConfig {
    /// Whether this client drives the AI.
    #[serde(default = "default_ai_enabled")]
    enabled: bool,

    /// Shortest think time.
    #[serde(default = "default_min_delay_ms")]
    min_delay_ms: u64,

    /// Exclusive upper bound of the think time.
    #[serde(default = "default_max_delay_ms")]
    max_delay_ms: u64,
}

/// Game rules.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters, Serialize, Deserialize)]
pub struct RulesConfig {
    /// How many completed words one evaluation credits.
    #[serde(default)]
    solve_policy: SolvePolicy,
}

/// Document store settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the document store.
    #[serde(default = "default_store_url")]
    url: String,

    /// Poll interval of the HTTP replication client.
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
}

fn default_document_key() -> String {
    "crosswordBattle".to_string()
}

fn default_ai_enabled() -> bool {
    true
}

fn default_min_delay_ms() -> u64 {
    MIN_THINK_MS
}

fn default_max_delay_ms() -> u64 {
    MAX_THINK_MS
}

fn default_store_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    250
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            document_key: default_document_key(),
            ai: AiConfig::default(),
            rules: RulesConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: default_ai_enabled(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ArenaConfig {
    /// Picks the config path: explicit flag, then environment, then default.
    #[instrument]
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Loads configuration, falling back to defaults when the file is absent.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        info!(
            document_key = %config.document_key,
            ai_enabled = config.ai.enabled,
            solve_policy = %config.rules.solve_policy,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Rejects settings the client cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document_key.trim().is_empty() {
            return Err(ConfigError::new("document_key must not be empty"));
        }
        if self.ai.min_delay_ms >= self.ai.max_delay_ms {
            return Err(ConfigError::new(format!(
                "ai.min_delay_ms ({}) must be below ai.max_delay_ms ({})",
                self.ai.min_delay_ms, self.ai.max_delay_ms
            )));
        }
        if self.store.poll_interval_ms == 0 {
            return Err(ConfigError::new("store.poll_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Same configuration with the AI turned off (passive viewer).
    pub fn without_ai(mut self) -> Self {
        self.ai.enabled = false;
        self
    }

    /// Same configuration pointing at another store.
    pub fn with_store_url(mut self, url: impl Into<String>) -> Self {
        self.store.url = url.into();
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
