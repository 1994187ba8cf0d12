use async_trait::async_trait;
use image::DynamicImage;
use loadcache_core::{Fetch, LoadError, ResourceKey};

/// Reads the key as a filesystem path and decodes the bytes as an image.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetch;

#[async_trait]
impl Fetch<DynamicImage> for FileFetch {
    async fn fetch(
        &self,
        key: &ResourceKey,
    ) -> Result<DynamicImage, LoadError> {
        let bytes = tokio::fs::read(key.as_str())
            .await
            .map_err(|err| LoadError::Fetch(format!("{key}: {err}")))?;

        // Decoding is CPU bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|err| LoadError::Decode(format!("decode task: {err}")))?
            .map_err(LoadError::from)
    }
}
