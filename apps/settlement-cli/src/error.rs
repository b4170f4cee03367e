//! Error types for the settlement CLI.

use std::path::PathBuf;

use settlement_core::ValidationError;

/// CLI errors.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    Usage(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("Invalid commission schedule '{key}': {source}")]
    InvalidSchedule {
        key: String,
        #[source]
        source: ValidationError,
    },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
