//! LRU store with eviction reporting.

use lru::LruCache;
use std::{borrow::Borrow, fmt, hash::Hash, num::NonZeroUsize};

/// An entry pushed out of a [`BoundedCache`] by an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evicted<K, V> {
    /// Key that was pushed out.
    pub key: K,
    /// Value it held.
    pub value: V,
}

/// Fixed-capacity key/value store with least-recently-used eviction.
///
/// `get` and `put` promote the key to most-recently-used; `peek` does not.
/// Eviction only hands the displaced entry back to the caller, it never
/// notifies anything else.
pub struct BoundedCache<K: Hash + Eq, V> {
    inner: LruCache<K, V>,
}

impl<K: Hash + Eq, V> BoundedCache<K, V> {
    /// Empty cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: LruCache::new(capacity),
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> NonZeroUsize {
        self.inner.cap()
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get and bump LRU
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get(key)
    }

    /// Get without moving LRU position
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.peek(key)
    }

    /// Whether `key` is present. Does not promote.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains(key)
    }

    /// Insert or overwrite, promoting `key` to most-recently-used.
    ///
    /// Returns the least-recently-used entry when a new key pushes the cache
    /// past capacity. Overwriting an existing key never evicts and returns
    /// `None`; the replaced value is dropped.
    pub fn put(&mut self, key: K, value: V) -> Option<Evicted<K, V>> {
        if let Some(slot) = self.inner.get_mut(&key) {
            *slot = value;
            return None;
        }

        self.inner
            .push(key, value)
            .map(|(key, value)| Evicted { key, value })
    }

    /// Remove `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.pop(key)
    }

    /// Remove every entry without reporting evictions.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Keys ordered from most- to least-recently used.
    pub fn keys_lru(&self) -> impl Iterator<Item = &K> {
        self.inner.iter().map(|(key, _)| key)
    }
}

impl<K: Hash + Eq + fmt::Debug, V> fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCache")
            .field("capacity", &self.inner.cap())
            .field("keys", &self.keys_lru().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> BoundedCache<&'static str, u32> {
        BoundedCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn inserting_past_capacity_evicts_least_recent() {
        let mut cache = cache(2);
        assert!(cache.put("a", 1).is_none());
        assert!(cache.put("b", 2).is_none());

        let evicted = cache.put("c", 3).expect("a should be evicted");
        assert_eq!(evicted, Evicted { key: "a", value: 1 });
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn get_promotes_before_eviction() {
        let mut cache = cache(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get("a"), Some(&1));

        let evicted = cache.put("c", 3).expect("b should be evicted");
        assert_eq!(evicted.key, "b");
        assert!(cache.contains("a"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn peek_does_not_promote() {
        let mut cache = cache(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.peek("a"), Some(&1));

        let evicted = cache.put("c", 3).expect("a should be evicted");
        assert_eq!(evicted.key, "a");
    }

    #[test]
    fn overwrite_replaces_value_without_eviction() {
        let mut cache = cache(2);
        cache.put("a", 1);
        cache.put("b", 2);

        assert!(cache.put("a", 10).is_none());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek("a"), Some(&10));

        // The overwrite also promoted "a".
        assert_eq!(cache.put("c", 3).map(|e| e.key), Some("b"));
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let mut cache = cache(3);
        for (i, key) in ["a", "b", "c", "d", "e", "f"].into_iter().enumerate() {
            cache.put(key, i as u32);
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.keys_lru().copied().collect::<Vec<_>>(), vec![
            "f", "e", "d"
        ]);
    }
}
