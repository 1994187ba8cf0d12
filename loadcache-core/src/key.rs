//! Cache keys.

use std::{borrow::Borrow, fmt, sync::Arc};

/// Stable key identifying an externally fetched resource (an image source,
/// a file path, a URL).
///
/// Backed by a shared `str` so cloning into the cache, the pending entry and
/// the loader stays cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(Arc<str>);

impl ResourceKey {
    /// Wrap `key` as-is; no normalisation.
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty keys never reach the cache.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResourceKey").field(&&*self.0).finish()
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ResourceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceKey {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for ResourceKey {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&String> for ResourceKey {
    fn from(value: &String) -> Self {
        Self(Arc::from(value.as_str()))
    }
}
