//! Image reference resolution.
//!
//! Image directives carry an [`ImageToken`] that joins into an external
//! content store (a directory of compressed image files keyed by token name).
//! Resolution either embeds the bytes as a data URI or falls back to a
//! plain-text placeholder the compiler escapes with the rest of the source.

use crate::error::{ImageError, ImageResult};
use crate::types::ImageToken;
use base64::{engine::general_purpose, Engine};
use std::io::ErrorKind;
use std::path::PathBuf;

/// Access to the image content store.
pub trait ImageStore {
    /// Fetch the raw bytes for a token, or [`ImageError::NotFound`].
    fn resolve(&self, token: &ImageToken) -> ImageResult<Vec<u8>>;
}

/// Content store backed by a flat directory of image files.
#[derive(Debug, Clone)]
pub struct DirectoryImageStore {
    root: PathBuf,
}

impl DirectoryImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageStore for DirectoryImageStore {
    fn resolve(&self, token: &ImageToken) -> ImageResult<Vec<u8>> {
        match std::fs::read(self.root.join(token.file_name())) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ImageError::NotFound {
                token: token.to_string(),
            }),
            Err(e) => Err(ImageError::Io(e)),
        }
    }
}

/// Store with no content. Useful for fields that never carry images and for
/// tests exercising the missing-image path.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyImageStore;

impl ImageStore for EmptyImageStore {
    fn resolve(&self, token: &ImageToken) -> ImageResult<Vec<u8>> {
        Err(ImageError::NotFound {
            token: token.to_string(),
        })
    }
}

/// Embed image bytes as a JPEG data URI.
pub fn data_uri(bytes: &[u8]) -> String {
    format!(
        "data:image/jpeg;base64,{}",
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Plain-text message substituted for an unresolvable token. Deliberately not
/// HTML: it goes through the normal escape pass like any user text.
pub fn missing_placeholder(token: &ImageToken) -> String {
    format!("[missing image: {token}]")
}
