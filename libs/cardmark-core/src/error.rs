//! Error types for cardmark-core.

use thiserror::Error;

/// Result type alias for image store operations.
pub type ImageResult<T> = std::result::Result<T, ImageError>;

/// Errors that can occur while resolving an image token against the content
/// store. The compiler recovers from all of these locally by substituting a
/// visible placeholder; they never abort a render pass.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image {token} not found in content store")]
    NotFound { token: String },

    #[error("I/O error reading image: {0}")]
    Io(#[from] std::io::Error),
}
