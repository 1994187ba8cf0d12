//! Tokio-backed loader for async fetches.

use async_trait::async_trait;
use std::{fmt, sync::Arc};
use tokio::runtime::{Handle, TryCurrentError};
use tracing::Instrument;

use super::Loader;
use crate::{
    coordinator::Completion, error::LoadError, key::ResourceKey,
    resource::Dimensions,
};

/// Asynchronous fetch + decode of a single key.
#[async_trait]
pub trait Fetch<T>: Send + Sync + 'static {
    /// Fetch and decode `key`.
    async fn fetch(&self, key: &ResourceKey) -> Result<T, LoadError>;
}

/// [`Loader`] that runs a [`Fetch`] as a detached task on a tokio runtime.
///
/// Each load is one spawned task; the task delivers its outcome through the
/// completion hook. If the task panics the hook is dropped and the entry
/// settles as abandoned.
pub struct SpawnLoader<F> {
    fetch: Arc<F>,
    runtime: Handle,
}

impl<F> SpawnLoader<F> {
    /// Spawn fetches onto `runtime`.
    pub fn new(fetch: F, runtime: Handle) -> Self {
        Self {
            fetch: Arc::new(fetch),
            runtime,
        }
    }

    /// Spawn onto the runtime the caller is currently running inside.
    pub fn try_current(fetch: F) -> Result<Self, TryCurrentError> {
        Ok(Self::new(fetch, Handle::try_current()?))
    }
}

impl<T, F> Loader<T> for SpawnLoader<F>
where
    T: Dimensions,
    F: Fetch<T>,
{
    fn load(&self, key: &ResourceKey, completion: Completion<T>) {
        let fetch = Arc::clone(&self.fetch);
        let key = key.clone();
        let span = tracing::debug_span!("fetch", key = %key);

        self.runtime.spawn(
            async move {
                let outcome = fetch.fetch(&key).await;
                if let Err(err) = &outcome {
                    tracing::debug!("Fetch failed: {err}");
                }
                completion.complete(outcome);
            }
            .instrument(span),
        );
    }
}

impl<F> fmt::Debug for SpawnLoader<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnLoader").finish_non_exhaustive()
    }
}
