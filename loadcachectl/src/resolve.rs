use anyhow::{Context, Result, bail};
use futures::future::join_all;
use image::DynamicImage;
use loadcache_config::LoadCacheConfig;
use loadcache_core::{
    DirtyFlag, LoadCoordinator, Owner, Resource, ResourceStatus,
    SpawnLoader, StatsSnapshot,
};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};

use crate::fetch::FileFetch;

#[derive(Debug)]
pub struct ResolveArgs {
    pub paths: Vec<PathBuf>,
    pub repeat: usize,
    pub timeout: Duration,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ResourceReport {
    key: String,
    status: ResourceStatus,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    resources: Vec<ResourceReport>,
    redraws: u64,
    stats: StatsSnapshot,
}

pub async fn run(config: &LoadCacheConfig, args: ResolveArgs) -> Result<()> {
    let loader = SpawnLoader::try_current(FileFetch)
        .context("resolve must run inside a tokio runtime")?;
    let coordinator: LoadCoordinator<DynamicImage> = config
        .build_coordinator(loader)
        .context("invalid cache configuration")?;
    let owner = Arc::new(DirtyFlag::new());

    let keys: Vec<String> = args
        .paths
        .iter()
        .map(|path| path.display().to_string())
        .collect();

    // Every round is issued before anything is awaited so repeats of a key
    // land on the in-flight entry.
    let mut handles: Vec<(String, Resource<DynamicImage>)> = Vec::new();
    for round in 0..args.repeat.max(1) {
        for key in &keys {
            let resolved = coordinator.resolve(
                key.as_str(),
                None,
                Some(Arc::clone(&owner) as Arc<dyn Owner>),
                None,
            );
            if round == 0
                && let Some(resource) = resolved
            {
                handles.push((key.clone(), resource));
            }
        }
    }

    let settled = join_all(handles.iter().map(|(_, r)| r.settled()));
    if tokio::time::timeout(args.timeout, settled).await.is_err() {
        warn!(
            timeout_ms = args.timeout.as_millis() as u64,
            "Timed out waiting for loads; reporting current state"
        );
    }

    let report = Report {
        resources: handles
            .iter()
            .map(|(key, resource)| ResourceReport {
                key: key.clone(),
                status: resource.status(),
                width: resource.width(),
                height: resource.height(),
                error: resource.error().map(|err| err.to_string()),
            })
            .collect(),
        redraws: owner.notifications(),
        stats: coordinator.stats(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }

    let not_ready = report
        .resources
        .iter()
        .filter(|r| r.status != ResourceStatus::Ready)
        .count();
    info!(
        resolved = report.resources.len(),
        not_ready, "Resolve finished"
    );
    if not_ready > 0 {
        bail!(
            "{not_ready} of {} resources failed to load",
            report.resources.len()
        );
    }
    Ok(())
}

fn print_table(report: &Report) {
    for resource in &report.resources {
        let status = match resource.status {
            ResourceStatus::Loading => "loading",
            ResourceStatus::Ready => "ready",
            ResourceStatus::Failed => "failed",
        };
        let size = format!("{}x{}", resource.width, resource.height);
        match &resource.error {
            Some(err) => {
                println!("{status:<8} {size:>11}  {} ({err})", resource.key)
            }
            None => println!("{status:<8} {size:>11}  {}", resource.key),
        }
    }

    let stats = &report.stats;
    println!(
        "requests={} hits={} misses={} ready={} failed={} evictions={} \
         redraws={}",
        stats.requests,
        stats.hits,
        stats.misses,
        stats.loads_ready,
        stats.loads_failed,
        stats.evictions,
        report.redraws,
    );
}
