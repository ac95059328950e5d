//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/stackharvest/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/stackharvest/` (~/.config/stackharvest/)
//! - Data: `$XDG_DATA_HOME/stackharvest/` (~/.local/share/stackharvest/)
//! - State/Logs: `$XDG_STATE_HOME/stackharvest/` (~/.local/state/stackharvest/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Default Stack Exchange API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.stackexchange.com/2.3";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Collector configuration
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Default query parameters
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Collector configuration
///
/// Fixed for the lifetime of a `Collector`; mock vs live mode never
/// changes after construction.
#[derive(Debug, Deserialize, Clone)]
pub struct CollectorConfig {
    /// Stack Exchange API key (optional; without one the unauthenticated
    /// daily quota applies)
    pub api_key: Option<String>,

    /// Site to collect from
    #[serde(default = "default_site")]
    pub site: String,

    /// API endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Questions per page (API maximum is 100)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Hard cap on pages fetched per question listing
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Answer-fetch rate limit, requests per second
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,

    /// Generate mock data instead of calling the live API
    #[serde(default)]
    pub use_mock_data: bool,

    /// Seed for the mock generator; unset means seeded from entropy
    pub mock_seed: Option<u64>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Directory for checkpoints and output files
    /// (default: `$XDG_DATA_HOME/stackharvest/raw`)
    pub output_dir: Option<PathBuf>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            site: default_site(),
            base_url: default_base_url(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            rate_limit: default_rate_limit(),
            use_mock_data: false,
            mock_seed: None,
            timeout_secs: default_timeout(),
            output_dir: None,
        }
    }
}

impl CollectorConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > 100 {
            return Err(Error::Config(
                "collector.page_size must be between 1 and 100".to_string(),
            ));
        }
        if self.max_pages == 0 {
            return Err(Error::Config(
                "collector.max_pages must be at least 1".to_string(),
            ));
        }
        if self.rate_limit == 0 {
            return Err(Error::Config(
                "collector.rate_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory receiving checkpoints and output files.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| Config::data_dir().join("raw"))
    }
}

fn default_site() -> String {
    "stackoverflow".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_max_pages() -> usize {
    5
}

fn default_rate_limit() -> u32 {
    30
}

fn default_timeout() -> u64 {
    30
}

/// Default query parameters for a collection run
#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    /// Tag to collect questions for
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Minimum number of answers per question
    #[serde(default = "default_min_answers")]
    pub min_answers: u32,

    /// Minimum question score
    #[serde(default)]
    pub min_score: i64,

    /// Maximum number of questions to collect
    #[serde(default = "default_max_count")]
    pub max_count: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            min_answers: default_min_answers(),
            min_score: 0,
            max_count: default_max_count(),
        }
    }
}

impl QueryConfig {
    /// Validate query parameters, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.tag.is_empty() {
            return Err(Error::Config("query.tag must not be empty".to_string()));
        }
        if self.max_count == 0 {
            return Err(Error::Config(
                "query.max_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_tag() -> String {
    "nlp".to_string()
}

fn default_min_answers() -> u32 {
    1
}

fn default_max_count() -> usize {
    10
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/stackharvest/config.toml` (~/.config/stackharvest/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("stackharvest").join("config.toml")
    }

    /// Returns the data directory path (for collected JSON)
    ///
    /// `$XDG_DATA_HOME/stackharvest/` (~/.local/share/stackharvest/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("stackharvest")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/stackharvest/` (~/.local/state/stackharvest/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("stackharvest")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/stackharvest/stackharvest.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("stackharvest.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path
    /// behavior before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
