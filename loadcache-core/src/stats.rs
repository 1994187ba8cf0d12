//! Coordinator counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::resource::ResourceStatus;

/// Rolling counters for one coordinator.
#[derive(Debug, Default)]
pub struct CoordinatorStats {
    requests: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    loads_started: AtomicU64,
    loads_ready: AtomicU64,
    loads_failed: AtomicU64,
    evictions: AtomicU64,
    callbacks_fired: AtomicU64,
    owners_notified: AtomicU64,
}

impl CoordinatorStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_request(&self) {
        Self::bump(&self.requests);
    }

    pub(crate) fn record_hit(&self) {
        Self::bump(&self.hits);
    }

    pub(crate) fn record_miss(&self) {
        Self::bump(&self.misses);
        Self::bump(&self.loads_started);
    }

    pub(crate) fn record_settled(&self, status: ResourceStatus) {
        match status {
            ResourceStatus::Ready => Self::bump(&self.loads_ready),
            ResourceStatus::Failed => Self::bump(&self.loads_failed),
            ResourceStatus::Loading => {}
        }
    }

    pub(crate) fn record_eviction(&self) {
        Self::bump(&self.evictions);
    }

    pub(crate) fn record_callback(&self) {
        Self::bump(&self.callbacks_fired);
    }

    pub(crate) fn record_owner_notified(&self) {
        Self::bump(&self.owners_notified);
    }

    /// Copy every counter at once.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads_started: self.loads_started.load(Ordering::Relaxed),
            loads_ready: self.loads_ready.load(Ordering::Relaxed),
            loads_failed: self.loads_failed.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            callbacks_fired: self.callbacks_fired.load(Ordering::Relaxed),
            owners_notified: self.owners_notified.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`CoordinatorStats`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct StatsSnapshot {
    /// Keyed lookups that reached the cache.
    pub requests: u64,
    /// Lookups that found an entry, settled or still loading.
    pub hits: u64,
    /// Lookups that created an entry.
    pub misses: u64,
    /// Loader invocations. Always equal to `misses`.
    pub loads_started: u64,
    /// Loads that settled with a usable value.
    pub loads_ready: u64,
    /// Loads that settled with an error, including abandoned hooks.
    pub loads_failed: u64,
    /// Entries pushed out by capacity. Explicit `evict` calls not counted.
    pub evictions: u64,
    /// Queued callbacks that ran.
    pub callbacks_fired: u64,
    /// `notify_dirty` calls made while draining.
    pub owners_notified: u64,
}

impl StatsSnapshot {
    /// Loads started but not yet settled.
    pub fn in_flight(&self) -> u64 {
        self.loads_started
            .saturating_sub(self.loads_ready + self.loads_failed)
    }

    /// `hits / requests`, or 0 before the first request.
    pub fn hit_ratio(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.hits as f64 / self.requests as f64
    }
}
