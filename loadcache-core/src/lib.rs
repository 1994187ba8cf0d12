//! # loadcache core
//!
//! Resource-load cache and deduplication coordinator.
//!
//! Given a textual key for an externally fetched resource (an image source,
//! say), the [`LoadCoordinator`] guarantees that:
//!
//! - only one fetch is ever in flight per key,
//! - every caller waiting on a key receives the same [`Resource`] handle,
//! - resolved resources are retained under a bounded LRU policy.
//!
//! The fetch itself is delegated to a [`Loader`]; redraw scheduling is
//! delegated to an [`Owner`]. Neither is part of this crate beyond the
//! adapters in [`loader`] and [`owner`].
//!
//! ## Feature Flags
//!
//! - `image` (default): [`Dimensions`] for `image::DynamicImage` and
//!   `image::RgbaImage`, plus `From<image::ImageError>` for [`LoadError`].
//!
//! ## Example
//!
//! ```no_run
//! use std::{num::NonZeroUsize, sync::Arc};
//! use loadcache_core::{
//!     Callback, DirtyFlag, Fetch, LoadCoordinator, LoadError, Owner,
//!     Resource, ResourceKey, SpawnLoader,
//! };
//! use image::DynamicImage;
//!
//! struct Decoder;
//!
//! #[async_trait::async_trait]
//! impl Fetch<DynamicImage> for Decoder {
//!     async fn fetch(&self, key: &ResourceKey) -> Result<DynamicImage, LoadError> {
//!         let bytes = tokio::fs::read(key.as_str()).await?;
//!         Ok(image::load_from_memory(&bytes)?)
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = SpawnLoader::try_current(Decoder)?;
//! let coordinator: LoadCoordinator<DynamicImage> =
//!     LoadCoordinator::new(NonZeroUsize::new(50).unwrap(), loader);
//! let owner: Arc<dyn Owner> = Arc::new(DirtyFlag::new());
//!
//! let poster = coordinator
//!     .resolve(
//!         "posters/1.png",
//!         None,
//!         Some(owner),
//!         Some(Callback::new(|poster: &Resource<DynamicImage>, slot: usize| {
//!             println!("slot {slot}: {}x{}", poster.width(), poster.height());
//!         }, 3)),
//!     )
//!     .expect("keys always resolve");
//! poster.settled().await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod coordinator;
pub mod error;
#[cfg(feature = "image")]
mod image_impls;
pub mod key;
pub mod loader;
pub mod owner;
pub mod resource;
pub mod stats;

pub use cache::{BoundedCache, Evicted};
pub use coordinator::{Callback, Completion, LoadCoordinator, Source};
pub use error::LoadError;
pub use key::ResourceKey;
pub use loader::{Fetch, FnLoader, Loader, SpawnLoader};
pub use owner::{DirtyFlag, Owner};
pub use resource::{Dimensions, LoadState, Resource, ResourceStatus, is_ready};
pub use stats::{CoordinatorStats, StatsSnapshot};
