//! The sandboxed renderer surface.
//!
//! The embedded, script-capable content view is an external collaborator;
//! this trait is the whole of what the session needs from it. Evaluation is
//! asynchronous and may time out; the session treats timeouts as degraded,
//! never fatal.

use crate::error::SandboxError;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait SandboxRenderer: Send + Sync {
    /// Replace the sandbox's entire document.
    async fn load_document(&self, html: &str) -> Result<(), SandboxError>;

    /// Wait for the load-complete signal of the most recent
    /// [`load_document`](Self::load_document) call.
    async fn wait_load_complete(&self) -> Result<(), SandboxError>;

    /// Evaluate a script inside the sandbox, returning its string result.
    async fn evaluate(&self, script: &str) -> Result<String, SandboxError>;

    /// Animate the renderer's opacity. Used to keep the blank frame of a
    /// full document reload off screen.
    async fn fade_to(&self, opacity: f64, duration: Duration) -> Result<(), SandboxError>;
}
