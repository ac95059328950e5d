//! Error types for stackharvest-core

use thiserror::Error;

/// Main error type for the stackharvest-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Collector/API error
    #[error("collector error: {0}")]
    Collector(String),
}

/// Result type alias for stackharvest-core
pub type Result<T> = std::result::Result<T, Error>;
