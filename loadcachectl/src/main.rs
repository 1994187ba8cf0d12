//! `loadcachectl`: resolve image files through a load coordinator and
//! report what the cache did.

mod fetch;
mod resolve;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use loadcache_config::{ConfigSource, LoadCacheConfig, logging};
use std::{env, path::PathBuf, time::Duration};
use tracing::debug;

use crate::resolve::ResolveArgs;

#[derive(Parser)]
#[command(name = "loadcachectl", about = "loadcache inspection tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load image files through the cache and print the outcome
    Resolve {
        /// Image files to resolve; each path is used as the cache key
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Override the configured cache capacity, including
        /// `LOADCACHE_CAPACITY`
        #[arg(long)]
        capacity: Option<usize>,
        /// Config file (TOML or JSON) instead of the env/default lookup
        #[arg(long)]
        config: Option<PathBuf>,
        /// Resolve each path this many times before waiting
        #[arg(long, default_value_t = 1)]
        repeat: usize,
        /// Give up waiting for loads after this many milliseconds
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn load_config(
    path: Option<&PathBuf>,
    capacity: Option<usize>,
) -> Result<LoadCacheConfig> {
    let (mut config, source) = match path {
        Some(path) => {
            let mut config = LoadCacheConfig::load_from_file(path)
                .context("failed to load --config")?;
            config
                .apply_env_overrides(&|name: &str| env::var(name).ok())
                .context("invalid environment override")?;
            (config, ConfigSource::File(path.clone()))
        }
        None => LoadCacheConfig::load_from_env()
            .context("failed to load configuration")?,
    };

    if let Some(capacity) = capacity {
        config.cache.capacity = capacity;
    }
    config.validate().context("invalid cache configuration")?;

    logging::init_tracing(&config.logging);
    debug!(?source, capacity = config.cache.capacity, "Loaded config");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve {
            paths,
            capacity,
            config,
            repeat,
            timeout_ms,
            json,
        } => {
            let config = load_config(config.as_ref(), capacity)?;
            resolve::run(
                &config,
                ResolveArgs {
                    paths,
                    repeat,
                    timeout: Duration::from_millis(timeout_ms),
                    json,
                },
            )
            .await
        }
    }
}
