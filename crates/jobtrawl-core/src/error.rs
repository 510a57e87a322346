//! Core error types for jobtrawl.
//!
//! Configuration and persistence failures are the only errors that cross
//! crate boundaries through this crate; each other crate carries its own
//! error enum and converts at the seam.

use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found at an explicitly requested path
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Errors raised by a persistence collaborator.
#[derive(Error, Debug)]
pub enum PersistError {
    /// Output directory or file could not be written
    #[error("I/O error writing {path}: {source}")]
    Io {
        /// File or directory being written
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Records could not be encoded in the requested format
    #[error("failed to encode {format} output: {reason}")]
    Encode {
        /// Output format (`csv`, `json`, ...)
        format: &'static str,
        /// Encoder message
        reason: String,
    },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
