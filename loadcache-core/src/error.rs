//! Load failure causes.

use thiserror::Error;

/// Why a resource never became ready.
///
/// The coordinator itself never inspects the variant: a failed load is
/// simply a resource whose dimensions stay at zero. The cause is kept for
/// callback consumers and logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The bytes could not be obtained.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The bytes were obtained but could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The load produced a value with a zero width or height.
    #[error("resource has empty dimensions ({width}x{height})")]
    EmptyDimensions {
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
    },

    /// The completion hook was dropped before anything was delivered.
    #[error("loader dropped its completion hook without delivering")]
    Abandoned,
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Fetch(err.to_string())
    }
}

#[cfg(feature = "image")]
impl From<image::ImageError> for LoadError {
    fn from(err: image::ImageError) -> Self {
        LoadError::Decode(err.to_string())
    }
}
