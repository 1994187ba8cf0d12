//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `cache.capacity` resolved to zero.
    #[error("cache capacity must be at least 1")]
    ZeroCapacity,
    /// A config file could not be read.
    #[error("failed to read config from {path}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Contents were neither valid TOML nor valid JSON for this schema.
    #[error("invalid config {origin}: {message}")]
    Parse {
        /// File path or env var the contents came from.
        origin: String,
        /// Parser message.
        message: String,
    },
    /// An override env var held something unparseable.
    #[error("invalid value '{value}' for {name}")]
    InvalidEnv {
        /// Variable name.
        name: String,
        /// Raw value as read.
        value: String,
    },
}
