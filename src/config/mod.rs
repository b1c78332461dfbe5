//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::fetch::{StatsClientConfig, DEFAULT_BASE_URL};
use crate::models::{register, AccountId, TrackedPlayer};
use crate::poll::PollConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// OpenDota client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenDotaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("dota-watch/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for OpenDotaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            api_key: None,
            user_agent: default_user_agent(),
        }
    }
}

impl OpenDotaConfig {
    pub fn to_client_config(&self) -> Result<StatsClientConfig, ConfigError> {
        let mut base_url = Url::parse(&self.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("Invalid base_url {}: {}", self.base_url, e))
        })?;

        // Url::join drops the last segment without a trailing slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(StatsClientConfig {
            base_url,
            timeout: Duration::from_secs(self.timeout_seconds),
            user_agent: self.user_agent.clone(),
            api_key: self.api_key.clone(),
        })
    }
}

/// Background polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,

    /// Save the seen-match map under `data_dir/state`
    #[serde(default)]
    pub persist_seen: bool,
}

fn default_interval() -> u64 {
    300
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            persist_seen: false,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// A `[[players]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub user_id: String,
    pub account_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub opendota: OpenDotaConfig,

    #[serde(default)]
    pub poll: PollSettings,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub players: Vec<PlayerEntry>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            opendota: OpenDotaConfig::default(),
            poll: PollSettings::default(),
            server: ServerConfig::default(),
            players: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.opendota.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "OpenDota timeout must be greater than 0".to_string(),
            ));
        }

        if self.poll.interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        self.opendota.to_client_config()?;

        Ok(())
    }

    /// Roster in file order. A repeated `user_id` re-registers that user.
    pub fn roster(&self) -> Vec<TrackedPlayer> {
        let mut roster = Vec::with_capacity(self.players.len());
        for entry in &self.players {
            if roster.iter().any(|p: &TrackedPlayer| p.user_id == entry.user_id) {
                warn!("User {} registered twice; keeping the later account", entry.user_id);
            }

            let mut player = TrackedPlayer::new(&entry.user_id, AccountId::new(entry.account_id));
            player.name = entry.name.clone();
            register(&mut roster, player);
        }
        roster
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            roster: self.roster(),
            interval: Duration::from_secs(self.poll.interval_seconds),
        }
    }
}
