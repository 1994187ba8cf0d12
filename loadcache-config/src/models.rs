//! Configuration model and the env/file lookup that fills it.

use loadcache_core::{Dimensions, LoadCoordinator, Loader};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{error::ConfigError, util::parse_usize_var};

/// Env var naming a TOML or JSON config file.
pub const CONFIG_PATH_VAR: &str = "LOADCACHE_CONFIG_PATH";
/// Env var carrying the whole config as inline JSON.
pub const CONFIG_JSON_VAR: &str = "LOADCACHE_CONFIG_JSON";
/// Env var overriding `cache.capacity` after everything else is loaded.
pub const CAPACITY_VAR: &str = "LOADCACHE_CAPACITY";

const DEFAULT_FILES: &[&str] =
    &["loadcache.toml", "loadcache.json", "config/loadcache.toml"];

/// Source that produced the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// Built-in defaults; nothing was found.
    #[default]
    Default,
    /// File named by `$LOADCACHE_CONFIG_PATH`.
    EnvPath(PathBuf),
    /// JSON from `$LOADCACHE_CONFIG_JSON`.
    EnvInline,
    /// A default file, or one passed explicitly.
    File(PathBuf),
}

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadCacheConfig {
    /// `[cache]` table.
    pub cache: CacheConfig,
    /// `[logging]` table.
    pub logging: LoggingConfig,
}

/// Resource cache sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Entries still loading count
    /// towards this too; evicting one does not cancel its load.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 50 }
    }
}

impl CacheConfig {
    /// Validated capacity; zero is rejected.
    pub fn capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.capacity).ok_or(ConfigError::ZeroCapacity)
    }
}

/// Log filtering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is
    /// unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl LoadCacheConfig {
    /// Load configuration using environment variables.
    /// Evaluation order:
    /// 1) `$LOADCACHE_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$LOADCACHE_CONFIG_JSON` (inline JSON),
    /// 3) the first default file found in the working directory,
    /// 4) defaults.
    ///
    /// `$LOADCACHE_CAPACITY` then overrides the cache capacity, and the
    /// result is validated.
    pub fn load_from_env() -> Result<(Self, ConfigSource), ConfigError> {
        Self::load_with(|name| env::var(name).ok(), Path::new("."))
    }

    /// [`load_from_env`](Self::load_from_env) with an explicit variable
    /// lookup and a base directory for the default files.
    pub fn load_with<F>(
        lookup: F,
        base_dir: &Path,
    ) -> Result<(Self, ConfigSource), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, source) = Self::select_source(&lookup, base_dir)?;

        config.apply_env_overrides(&lookup)?;
        config.validate()?;
        debug!(
            ?source,
            capacity = config.cache.capacity,
            "Loaded loadcache config"
        );
        Ok((config, source))
    }

    /// Apply `$LOADCACHE_CAPACITY` on top of whatever was loaded.
    pub fn apply_env_overrides<F>(
        &mut self,
        lookup: &F,
    ) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(capacity) = parse_usize_var(lookup, CAPACITY_VAR)? {
            debug!(capacity, "Cache capacity overridden by {CAPACITY_VAR}");
            self.cache.capacity = capacity;
        }
        Ok(())
    }

    fn select_source<F>(
        lookup: &F,
        base_dir: &Path,
    ) -> Result<(Self, ConfigSource), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path_str) = lookup(CONFIG_PATH_VAR)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(raw) = lookup(CONFIG_JSON_VAR)
            && !raw.trim().is_empty()
        {
            let config = Self::parse_json(&raw, CONFIG_JSON_VAR)?;
            return Ok((config, ConfigSource::EnvInline));
        }

        if let Some(path) = Self::find_default_file(base_dir) {
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Self::default(), ConfigSource::Default))
    }

    /// Load a file, picking the format from its extension. Unknown
    /// extensions go through [`parse_from_str`](Self::parse_from_str).
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let origin = path.display().to_string();

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents, &origin),
            Some("toml") => Self::parse_toml(&contents, &origin),
            _ => Self::parse_from_str(&contents, &origin),
        }
    }

    /// Parse `contents` as TOML, falling back to JSON.
    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> Result<Self, ConfigError> {
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                ConfigError::Parse {
                    origin: origin.to_string(),
                    message: format!(
                        "toml error: {toml_err}; json error: {json_err}"
                    ),
                }
            })
        })
    }

    /// Parse TOML; `origin` names the input in errors.
    pub fn parse_toml(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|err| ConfigError::Parse {
            origin: origin.to_string(),
            message: err.to_string(),
        })
    }

    /// Parse JSON; `origin` names the input in errors.
    pub fn parse_json(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|err| ConfigError::Parse {
            origin: origin.to_string(),
            message: err.to_string(),
        })
    }

    /// Reject settings no coordinator can be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.capacity().map(|_| ())
    }

    /// Build a coordinator sized by `cache.capacity`.
    pub fn build_coordinator<T: Dimensions>(
        &self,
        loader: impl Loader<T> + 'static,
    ) -> Result<LoadCoordinator<T>, ConfigError> {
        Ok(LoadCoordinator::new(self.cache.capacity()?, loader))
    }

    fn find_default_file(base_dir: &Path) -> Option<PathBuf> {
        DEFAULT_FILES
            .iter()
            .map(|name| base_dir.join(name))
            .find(|path| path.is_file())
    }
}
