//! Resource handles and their load state.
//!
//! A [`Resource`] is a shared handle to one load slot. The coordinator hands
//! out a placeholder handle on a cache miss; every clone observes the same
//! one-shot transition out of [`LoadState::Loading`].

use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

use tokio::sync::watch;

use crate::{error::LoadError, key::ResourceKey};

/// Observable extent of a decoded resource.
///
/// Readiness is derived from these alone: a resource is usable once both
/// dimensions are strictly positive.
pub trait Dimensions: Send + Sync + 'static {
    /// Width in pixels, or whatever unit the payload uses.
    fn width(&self) -> u32;
    /// Height in the same unit as `width`.
    fn height(&self) -> u32;
}

/// Tagged load state held by every [`Resource`].
pub enum LoadState<T> {
    /// Load in flight.
    Loading,
    /// Loaded with non-zero dimensions.
    Ready(Arc<T>),
    /// Load failed or produced an empty value.
    Failed(LoadError),
}

impl<T> LoadState<T> {
    /// Variant without the payload.
    pub fn status(&self) -> ResourceStatus {
        match self {
            LoadState::Loading => ResourceStatus::Loading,
            LoadState::Ready(_) => ResourceStatus::Ready,
            LoadState::Failed(_) => ResourceStatus::Failed,
        }
    }

    /// Still waiting on the loader.
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    /// Loaded value, if ready.
    pub fn value(&self) -> Option<&Arc<T>> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Failure cause, if failed.
    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl<T: Dimensions> LoadState<T> {
    /// Settle a loader outcome. A value with a zero dimension is a failure.
    fn from_outcome(outcome: Result<T, LoadError>) -> Self {
        match outcome {
            Ok(value) if value.width() > 0 && value.height() > 0 => {
                LoadState::Ready(Arc::new(value))
            }
            Ok(value) => LoadState::Failed(LoadError::EmptyDimensions {
                width: value.width(),
                height: value.height(),
            }),
            Err(err) => LoadState::Failed(err),
        }
    }
}

impl<T> Clone for LoadState<T> {
    fn clone(&self) -> Self {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Ready(value) => LoadState::Ready(Arc::clone(value)),
            LoadState::Failed(err) => LoadState::Failed(err.clone()),
        }
    }
}

impl<T> fmt::Debug for LoadState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Loading => f.write_str("Loading"),
            LoadState::Ready(_) => f.write_str("Ready"),
            LoadState::Failed(err) => {
                f.debug_tuple("Failed").field(err).finish()
            }
        }
    }
}

/// Completion state without the payload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    /// Load in flight.
    Loading,
    /// Loaded and usable.
    Ready,
    /// Settled without a usable value.
    Failed,
}

/// Shared handle to a resource that is loading, ready, or failed.
///
/// Cloning is cheap and preserves identity; use [`Resource::ptr_eq`] to
/// check whether two handles refer to the same load.
pub struct Resource<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    key: Option<ResourceKey>,
    state: watch::Sender<LoadState<T>>,
}

impl<T: Dimensions> Resource<T> {
    /// Placeholder bound to `key`, waiting for its loader.
    pub(crate) fn pending(key: ResourceKey) -> Self {
        Self::with_state(Some(key), LoadState::Loading)
    }

    /// Wrap an already decoded value. The handle is settled immediately:
    /// ready if both dimensions are positive, failed otherwise.
    pub fn from_value(value: T) -> Self {
        Self::with_state(None, LoadState::from_outcome(Ok(value)))
    }

    /// Like [`Resource::from_value`], but records the key it came from.
    pub fn from_value_with_key(key: impl Into<ResourceKey>, value: T) -> Self {
        Self::with_state(Some(key.into()), LoadState::from_outcome(Ok(value)))
    }

    fn with_state(key: Option<ResourceKey>, state: LoadState<T>) -> Self {
        Self {
            inner: Arc::new(Inner {
                key,
                state: watch::Sender::new(state),
            }),
        }
    }

    /// Move out of `Loading` and wake every [`Resource::settled`] waiter.
    pub(crate) fn settle(
        &self,
        outcome: Result<T, LoadError>,
    ) -> ResourceStatus {
        let state = LoadState::from_outcome(outcome);
        let status = state.status();
        self.inner.state.send_replace(state);
        status
    }

    /// Key this handle was created for; `None` for raw values.
    pub fn key(&self) -> Option<&ResourceKey> {
        self.inner.key.as_ref()
    }

    /// Whether this handle was created for `key`.
    pub fn is_bound_to(&self, key: &ResourceKey) -> bool {
        self.inner.key.as_ref() == Some(key)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LoadState<T> {
        LoadState::clone(&self.inner.state.borrow())
    }

    /// Current status.
    pub fn status(&self) -> ResourceStatus {
        self.inner.state.borrow().status()
    }

    /// Loaded value, if ready.
    pub fn value(&self) -> Option<Arc<T>> {
        self.inner.state.borrow().value().cloned()
    }

    /// Failure cause, if failed.
    pub fn error(&self) -> Option<LoadError> {
        self.inner.state.borrow().error().cloned()
    }

    /// Width of the loaded value, 0 while loading or after a failure.
    pub fn width(&self) -> u32 {
        self.inner
            .state
            .borrow()
            .value()
            .map_or(0, |value| value.width())
    }

    /// Height of the loaded value, 0 while loading or after a failure.
    pub fn height(&self) -> u32 {
        self.inner
            .state
            .borrow()
            .value()
            .map_or(0, |value| value.height())
    }

    /// Both dimensions are non-zero.
    pub fn is_ready(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }

    /// Wait until the resource leaves `Loading` and return the final state.
    ///
    /// There is no built-in timeout; wrap this in `tokio::time::timeout` if
    /// the loader may hang.
    pub async fn settled(&self) -> LoadState<T> {
        let mut rx = self.inner.state.subscribe();
        match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => (*state).clone(),
            // The sender lives in `self`, so this only happens if tokio
            // changes its drop semantics.
            Err(_) => self.state(),
        }
    }
}

impl<T> Resource<T> {
    /// Whether both handles share one load slot.
    pub fn ptr_eq(&self, other: &Resource<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("key", &self.inner.key)
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

/// Readiness predicate kept for callers that only look at dimensions.
pub fn is_ready<T: Dimensions>(resource: Option<&Resource<T>>) -> bool {
    resource.is_some_and(Resource::is_ready)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Extent(u32, u32);

    impl Dimensions for Extent {
        fn width(&self) -> u32 {
            self.0
        }
        fn height(&self) -> u32 {
            self.1
        }
    }

    #[test]
    fn zero_dimension_is_never_ready() {
        assert!(!Resource::from_value(Extent(0, 20)).is_ready());
        assert!(!Resource::from_value(Extent(10, 0)).is_ready());
        assert!(!is_ready::<Extent>(None));
    }

    #[test]
    fn positive_dimensions_are_ready() {
        let resource = Resource::from_value(Extent(10, 20));
        assert!(resource.is_ready());
        assert!(is_ready(Some(&resource)));
        assert_eq!(resource.status(), ResourceStatus::Ready);
        assert_eq!((resource.width(), resource.height()), (10, 20));
    }

    #[test]
    fn zero_dimension_value_settles_as_failed() {
        let resource = Resource::from_value(Extent(0, 0));
        assert_eq!(resource.status(), ResourceStatus::Failed);
        assert_eq!(
            resource.error(),
            Some(LoadError::EmptyDimensions {
                width: 0,
                height: 0
            })
        );
    }

    #[test]
    fn placeholder_reports_zero_until_settled() {
        let resource = Resource::<Extent>::pending("a".into());
        assert_eq!(resource.status(), ResourceStatus::Loading);
        assert_eq!(resource.width(), 0);

        let clone = resource.clone();
        assert_eq!(resource.settle(Ok(Extent(4, 3))), ResourceStatus::Ready);
        assert!(clone.is_ready());
        assert!(clone.ptr_eq(&resource));
    }

    #[tokio::test]
    async fn settled_wakes_after_settle_from_another_task() {
        let resource = Resource::<Extent>::pending("late".into());
        let remote = resource.clone();
        let handle = tokio::spawn(async move {
            tokio::task::yield_now().await;
            remote.settle(Err(LoadError::Fetch("404".into())));
        });

        let state = resource.settled().await;
        handle.await.expect("settle task");
        assert_eq!(state.status(), ResourceStatus::Failed);
        assert!(!resource.is_ready());
    }
}
