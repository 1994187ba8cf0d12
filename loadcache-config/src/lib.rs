//! Shared configuration library for loadcache.
//!
//! Loads [`LoadCacheConfig`] from a file, inline JSON or defaults, applies
//! environment overrides, and installs the tracing subscriber used by the
//! binaries.

pub mod error;
pub mod logging;
pub mod models;
pub mod util;

pub use error::ConfigError;
pub use models::{CacheConfig, ConfigSource, LoadCacheConfig, LoggingConfig};
