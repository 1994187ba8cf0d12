//! Single-flight resource resolution on top of [`BoundedCache`].
//!
//! [`LoadCoordinator::resolve`] turns a key into a [`Resource`] handle. The
//! first request for a key starts exactly one load; every later request for
//! the same key, until that load settles, shares the same handle and is
//! queued on the entry. When the loader delivers, the queue drains in
//! registration order.

mod completion;
mod entry;

pub use completion::Completion;
pub use entry::Callback;

use parking_lot::Mutex;
use std::{fmt, num::NonZeroUsize, sync::Arc};
use tracing::{debug, trace};

use crate::{
    cache::{BoundedCache, Evicted},
    key::ResourceKey,
    loader::Loader,
    owner::Owner,
    resource::{Dimensions, Resource},
    stats::{CoordinatorStats, StatsSnapshot},
};
use entry::{CacheEntry, PendingRequest};

/// What the caller wants resolved.
pub enum Source<T> {
    /// Nothing requested; `resolve` is a no-op.
    Empty,
    /// A key to look up in the cache and load on a miss.
    Key(ResourceKey),
    /// A resource the caller already has; bypasses the cache.
    Resource(Resource<T>),
}

impl<T> Default for Source<T> {
    fn default() -> Self {
        Source::Empty
    }
}

impl<T> From<ResourceKey> for Source<T> {
    fn from(key: ResourceKey) -> Self {
        if key.is_empty() {
            Source::Empty
        } else {
            Source::Key(key)
        }
    }
}

impl<T> From<&ResourceKey> for Source<T> {
    fn from(key: &ResourceKey) -> Self {
        Source::from(key.clone())
    }
}

impl<T> From<&str> for Source<T> {
    fn from(key: &str) -> Self {
        Source::from(ResourceKey::from(key))
    }
}

impl<T> From<String> for Source<T> {
    fn from(key: String) -> Self {
        Source::from(ResourceKey::from(key))
    }
}

impl<T> From<&String> for Source<T> {
    fn from(key: &String) -> Self {
        Source::from(ResourceKey::from(key))
    }
}

impl<T> From<Resource<T>> for Source<T> {
    fn from(resource: Resource<T>) -> Self {
        Source::Resource(resource)
    }
}

impl<T> From<&Resource<T>> for Source<T> {
    fn from(resource: &Resource<T>) -> Self {
        Source::Resource(resource.clone())
    }
}

impl<T> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Empty => f.write_str("Empty"),
            Source::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Source::Resource(resource) => {
                f.debug_tuple("Resource").field(resource).finish()
            }
        }
    }
}

type EntryCache<T> = BoundedCache<ResourceKey, Arc<CacheEntry<T>>>;
type EvictedEntry<T> = Evicted<ResourceKey, Arc<CacheEntry<T>>>;

enum Lookup<T> {
    Hit(Arc<CacheEntry<T>>, PendingRequest<T>),
    Miss(Arc<CacheEntry<T>>, Option<EvictedEntry<T>>),
}

/// Resolves keys to shared resource handles, deduplicating loads.
///
/// Each coordinator owns its cache; there is no process-wide instance.
/// Cloning is cheap and every clone shares the same cache, loader and stats.
pub struct LoadCoordinator<T: Dimensions> {
    cache: Arc<Mutex<EntryCache<T>>>,
    loader: Arc<dyn Loader<T>>,
    stats: Arc<CoordinatorStats>,
}

impl<T: Dimensions> LoadCoordinator<T> {
    /// Coordinator holding at most `capacity` entries.
    pub fn new(
        capacity: NonZeroUsize,
        loader: impl Loader<T> + 'static,
    ) -> Self {
        Self::with_loader(capacity, Arc::new(loader))
    }

    /// Like [`new`](Self::new) for a loader that is already shared.
    pub fn with_loader(
        capacity: NonZeroUsize,
        loader: Arc<dyn Loader<T>>,
    ) -> Self {
        Self {
            cache: Arc::new(Mutex::new(BoundedCache::new(capacity))),
            loader,
            stats: Arc::new(CoordinatorStats::default()),
        }
    }

    /// Resolve `source` for a caller that currently shows `existing`.
    ///
    /// In priority order:
    /// 1. An empty source returns `existing` unchanged.
    /// 2. A raw [`Resource`] is returned as-is, bypassing the cache.
    /// 3. With no `owner`, an `existing` resource already bound to the same
    ///    key is returned unchanged and nothing is loaded.
    /// 4. Otherwise the key goes through the cache. A hit returns the
    ///    cached handle and, while the load is still in flight, queues
    ///    `owner`/`callback` on it. A miss creates a placeholder, caches it
    ///    and starts one load.
    ///
    /// `callback` runs once the resource is ready or failed, followed by
    /// `owner.notify_dirty()`. Neither runs for a hit on an entry that has
    /// already settled; the returned handle is final in that case.
    pub fn resolve(
        &self,
        source: impl Into<Source<T>>,
        existing: Option<&Resource<T>>,
        owner: Option<Arc<dyn Owner>>,
        callback: Option<Callback<T>>,
    ) -> Option<Resource<T>> {
        let key = match source.into() {
            Source::Empty => return existing.cloned(),
            Source::Resource(resource) => return Some(resource),
            Source::Key(key) => key,
        };

        if owner.is_none()
            && let Some(existing) = existing
            && existing.is_bound_to(&key)
        {
            trace!(%key, "Existing resource already bound to key");
            return Some(existing.clone());
        }

        Some(self.resolve_key(key, PendingRequest { owner, callback }))
    }

    fn resolve_key(
        &self,
        key: ResourceKey,
        request: PendingRequest<T>,
    ) -> Resource<T> {
        self.stats.record_request();

        let lookup = {
            let mut cache = self.cache.lock();
            match cache.get(&key).cloned() {
                Some(entry) => Lookup::Hit(entry, request),
                None => {
                    let entry =
                        Arc::new(CacheEntry::new(key.clone(), request));
                    let evicted = cache.put(key.clone(), Arc::clone(&entry));
                    Lookup::Miss(entry, evicted)
                }
            }
        };

        let (entry, evicted) = match lookup {
            Lookup::Hit(entry, request) => {
                self.stats.record_hit();
                if entry.register(request) {
                    trace!(
                        %key,
                        pending = entry.pending_len(),
                        "Queued behind in-flight load"
                    );
                } else {
                    trace!(%key, "Cache hit on settled entry");
                }
                return entry.resource().clone();
            }
            Lookup::Miss(entry, evicted) => (entry, evicted),
        };

        self.stats.record_miss();
        if let Some(evicted) = evicted {
            self.note_eviction(evicted);
        }

        debug!(%key, "Cache miss; starting load");
        let resource = entry.resource().clone();
        self.loader
            .load(&key, Completion::new(entry, Arc::clone(&self.stats)));
        resource
    }

    fn note_eviction(&self, evicted: EvictedEntry<T>) {
        self.stats.record_eviction();
        // An entry still loading keeps living inside its completion hook;
        // its waiters are drained when the load settles.
        debug!(
            key = %evicted.key,
            in_flight = !evicted.value.is_completed(),
            "Evicted least-recently-used entry"
        );
    }

    /// Cache probe without loading. Promotes a hit to most-recently-used.
    ///
    /// A raw resource is passed through; an empty source yields `None`.
    pub fn find_existing(
        &self,
        source: impl Into<Source<T>>,
    ) -> Option<Resource<T>> {
        match source.into() {
            Source::Empty => None,
            Source::Resource(resource) => Some(resource),
            Source::Key(key) => self
                .cache
                .lock()
                .get(&key)
                .map(|entry| entry.resource().clone()),
        }
    }

    /// Whether `key` is cached, without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.cache.lock().contains(key)
    }

    /// Number of callers queued on `key`, if it is cached.
    pub fn pending_len(&self, key: &str) -> Option<usize> {
        self.cache.lock().peek(key).map(|entry| entry.pending_len())
    }

    /// Drop `key` from the cache. An in-flight load still completes and
    /// drains its waiters; the next `resolve` for the key loads afresh.
    pub fn evict(&self, key: &str) -> Option<Resource<T>> {
        let removed = self.cache.lock().remove(key);
        removed.map(|entry| {
            debug!(key = %entry.key(), "Evicted entry on request");
            entry.resource().clone()
        })
    }

    /// Drop every entry. In-flight loads still drain their waiters.
    pub fn clear(&self) {
        let mut cache = self.cache.lock();
        debug!(entries = cache.len(), "Clearing resource cache");
        cache.clear();
    }

    /// Cached entries, loading ones included.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Whether no entries are cached.
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Maximum number of cached entries.
    pub fn capacity(&self) -> NonZeroUsize {
        self.cache.lock().capacity()
    }

    /// Snapshot of the counters shared by every clone.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl<T: Dimensions> Clone for LoadCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            loader: Arc::clone(&self.loader),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<T: Dimensions> fmt::Debug for LoadCoordinator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.lock();
        f.debug_struct("LoadCoordinator")
            .field("capacity", &cache.capacity())
            .field("len", &cache.len())
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}
