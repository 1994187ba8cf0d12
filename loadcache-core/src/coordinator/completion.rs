use std::{fmt, sync::Arc};

use super::entry::CacheEntry;
use crate::{
    error::LoadError,
    key::ResourceKey,
    resource::{Dimensions, Resource},
    stats::CoordinatorStats,
};

/// One-shot completion hook handed to a [`Loader`](crate::Loader).
///
/// The hook owns the entry it was created for, not the key: evicting the
/// entry from the cache while the load is in flight does not orphan the
/// callers queued on it. `complete` consumes the hook, so delivery happens
/// at most once. Dropping an undelivered hook settles the entry as
/// [`LoadError::Abandoned`].
pub struct Completion<T: Dimensions> {
    key: ResourceKey,
    entry: Option<Arc<CacheEntry<T>>>,
    stats: Arc<CoordinatorStats>,
}

impl<T: Dimensions> Completion<T> {
    pub(crate) fn new(
        entry: Arc<CacheEntry<T>>,
        stats: Arc<CoordinatorStats>,
    ) -> Self {
        Self {
            key: entry.key().clone(),
            entry: Some(entry),
            stats,
        }
    }

    /// Key of the entry this hook settles.
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// The placeholder handle this hook will settle.
    pub fn resource(&self) -> Option<&Resource<T>> {
        self.entry.as_deref().map(CacheEntry::resource)
    }

    /// Deliver the loader's outcome and wake everyone waiting on the entry.
    pub fn complete(mut self, outcome: Result<T, LoadError>) {
        if let Some(entry) = self.entry.take() {
            entry.complete(outcome, &self.stats);
        }
    }
}

impl<T: Dimensions> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(entry) = self.entry.take() {
            tracing::warn!(
                key = %self.key,
                "Loader dropped completion hook without delivering; settling as failed"
            );
            entry.complete(Err(LoadError::Abandoned), &self.stats);
        }
    }
}

impl<T: Dimensions> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("key", &self.key)
            .field("delivered", &self.entry.is_none())
            .finish()
    }
}
