//! Error types for preview delivery.

use std::time::Duration;
use thiserror::Error;

/// Failures reported by the sandboxed renderer or the delivery path.
///
/// All of these are recoverable: the session logs them and degrades (retry,
/// fallback transport, or full reload) instead of surfacing a blocking error.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("script evaluation failed: {0}")]
    Evaluate(String),

    #[error("document load failed: {0}")]
    Load(String),

    #[error("sandbox timed out after {0:?}")]
    Timeout(Duration),

    #[error("renderer is detached")]
    Detached,
}
