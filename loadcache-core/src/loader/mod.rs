//! The seam between the coordinator and whatever actually fetches bytes.
//!
//! A [`Loader`] receives a key and a one-shot [`Completion`] and must return
//! promptly; the outcome is delivered later through the hook, from any
//! thread. Fetch and decode failures are delivered as `Err`, never thrown.

pub mod spawn;

pub use spawn::{Fetch, SpawnLoader};

use std::fmt;

use crate::{coordinator::Completion, key::ResourceKey, resource::Dimensions};

/// Starts a load for a key and reports back through a [`Completion`].
pub trait Loader<T: Dimensions>: Send + Sync {
    /// Begin loading `key`. Must not block on the fetch itself.
    fn load(&self, key: &ResourceKey, completion: Completion<T>);
}

/// Adapts a closure into a [`Loader`].
///
/// Handy for loaders that hand the hook to an existing event loop, or that
/// can answer synchronously from data already in memory.
pub struct FnLoader<F>(F);

impl<F> FnLoader<F> {
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<T, F> Loader<T> for FnLoader<F>
where
    T: Dimensions,
    F: Fn(&ResourceKey, Completion<T>) + Send + Sync,
{
    fn load(&self, key: &ResourceKey, completion: Completion<T>) {
        (self.0)(key, completion)
    }
}

impl<F> fmt::Debug for FnLoader<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnLoader(..)")
    }
}
