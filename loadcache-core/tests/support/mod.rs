#![allow(dead_code)]

use std::{num::NonZeroUsize, sync::Arc};

use loadcache_core::{
    Completion, Dimensions, LoadCoordinator, LoadError, Loader, ResourceKey,
};
use parking_lot::Mutex;

/// Decoded payload with a fixed extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Dimensions for Extent {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Loader that parks every completion hook until the test releases it.
#[derive(Clone, Default)]
pub struct ManualLoader {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    calls: Vec<ResourceKey>,
    parked: Vec<Completion<Extent>>,
}

impl ManualLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys passed to `load`, in call order.
    pub fn calls(&self) -> Vec<ResourceKey> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }

    /// Remove the parked hook for `key`.
    pub fn take(&self, key: &str) -> Completion<Extent> {
        let mut state = self.inner.lock();
        let idx = state
            .parked
            .iter()
            .position(|c| c.key().as_str() == key)
            .unwrap_or_else(|| panic!("no parked completion for {key}"));
        state.parked.remove(idx)
    }

    pub fn finish(&self, key: &str, outcome: Result<Extent, LoadError>) {
        // Take the hook before completing so callbacks never see our lock.
        let completion = self.take(key);
        completion.complete(outcome);
    }
}

impl Loader<Extent> for ManualLoader {
    fn load(&self, key: &ResourceKey, completion: Completion<Extent>) {
        let mut state = self.inner.lock();
        state.calls.push(key.clone());
        state.parked.push(completion);
    }
}

pub fn coordinator(
    capacity: usize,
) -> (LoadCoordinator<Extent>, ManualLoader) {
    let loader = ManualLoader::new();
    let capacity = NonZeroUsize::new(capacity).expect("non-zero capacity");
    (LoadCoordinator::new(capacity, loader.clone()), loader)
}
