use parking_lot::Mutex;
use std::{fmt, sync::Arc};

use crate::{
    error::LoadError,
    key::ResourceKey,
    owner::Owner,
    resource::{Dimensions, Resource},
    stats::CoordinatorStats,
};

/// A completion callback bundled with its payload.
///
/// The payload is moved into the callback when it is built and handed back
/// on invocation, so callers waiting on the same resource can each carry
/// their own context.
pub struct Callback<T> {
    f: Box<dyn FnOnce(&Resource<T>) + Send>,
}

impl<T: Dimensions> Callback<T> {
    /// Callback that receives `payload` alongside the resource.
    pub fn new<P, F>(f: F, payload: P) -> Self
    where
        F: FnOnce(&Resource<T>, P) + Send + 'static,
        P: Send + 'static,
    {
        Self {
            f: Box::new(move |resource| f(resource, payload)),
        }
    }

    /// Callback without a separate payload.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce(&Resource<T>) + Send + 'static,
    {
        Self { f: Box::new(f) }
    }

    fn invoke(self, resource: &Resource<T>) {
        (self.f)(resource)
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// A caller waiting on a resource that has not settled yet.
pub(crate) struct PendingRequest<T> {
    pub(crate) owner: Option<Arc<dyn Owner>>,
    pub(crate) callback: Option<Callback<T>>,
}

impl<T: Dimensions> PendingRequest<T> {
    /// Callback first, then the owner's redraw hint.
    fn fire(self, resource: &Resource<T>, stats: &CoordinatorStats) {
        if let Some(callback) = self.callback {
            callback.invoke(resource);
            stats.record_callback();
        }
        if let Some(owner) = self.owner {
            owner.notify_dirty();
            stats.record_owner_notified();
        }
    }
}

struct PendingSlot<T> {
    requests: Vec<PendingRequest<T>>,
    completed: bool,
}

/// Cache record pairing a resource with the callers still waiting on it.
///
/// The pending list and the `completed` flag share one lock so a request
/// can never be queued after the drain has already run.
pub(crate) struct CacheEntry<T> {
    key: ResourceKey,
    resource: Resource<T>,
    slot: Mutex<PendingSlot<T>>,
}

impl<T: Dimensions> CacheEntry<T> {
    pub(crate) fn new(key: ResourceKey, first: PendingRequest<T>) -> Self {
        Self {
            resource: Resource::pending(key.clone()),
            key,
            slot: Mutex::new(PendingSlot {
                requests: vec![first],
                completed: false,
            }),
        }
    }

    pub(crate) fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub(crate) fn resource(&self) -> &Resource<T> {
        &self.resource
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.slot.lock().completed
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.slot.lock().requests.len()
    }

    /// Queue `request` behind the in-flight load.
    ///
    /// Returns `false` and drops the request once the entry has completed;
    /// the caller already holds the settled resource.
    pub(crate) fn register(&self, request: PendingRequest<T>) -> bool {
        let mut slot = self.slot.lock();
        if slot.completed {
            return false;
        }
        slot.requests.push(request);
        true
    }

    /// Settle the resource and drain every pending request in FIFO order.
    ///
    /// Runs exactly once per entry. Callbacks and owners are invoked after
    /// the lock is released so they may call back into the coordinator.
    pub(crate) fn complete(
        &self,
        outcome: Result<T, LoadError>,
        stats: &CoordinatorStats,
    ) {
        let (status, requests) = {
            let mut slot = self.slot.lock();
            assert!(
                !slot.completed,
                "completion hook fired twice for {}",
                self.key
            );
            slot.completed = true;
            let status = self.resource.settle(outcome);
            (status, std::mem::take(&mut slot.requests))
        };
        stats.record_settled(status);

        tracing::debug!(
            key = %self.key,
            ?status,
            waiters = requests.len(),
            "Load settled"
        );

        for request in requests {
            request.fire(&self.resource, stats);
        }
    }
}

impl<T> fmt::Debug for CacheEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("pending", &slot.requests.len())
            .field("completed", &slot.completed)
            .finish()
    }
}
