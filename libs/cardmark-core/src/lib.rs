//! Core card-markup engine shared by the editing surfaces.
//!
//! Provides:
//! - Markup compiler (card directives -> sandboxed HTML fragments)
//! - Theme resolution for the light/dark palettes
//! - Image reference resolution against the content store
//! - Decoration editor for wrap-selection markup operations
//! - The fixed document template used by the sandboxed renderer

pub mod compile;
pub mod decorate;
pub mod error;
pub mod image;
pub mod template;
pub mod theme;
pub mod types;

pub use compile::MarkupCompiler;
pub use decorate::{apply as apply_decoration, wrap, Decoration};
pub use error::{ImageError, ImageResult};
pub use image::{DirectoryImageStore, EmptyImageStore, ImageStore};
pub use theme::ColorToken;
pub use types::{BlankOccurrence, FieldKind, ImageToken, RenderOptions, RenderedFragment};
