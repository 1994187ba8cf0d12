//! In-memory bounded cache.
//!
//! A thin typed facade around the `lru` crate that reports evictions back to
//! the caller instead of dropping them silently.

pub mod bounded;

pub use bounded::*;
