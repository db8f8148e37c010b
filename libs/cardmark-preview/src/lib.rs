//! Live-preview synchronization for card markup fields.
//!
//! Provides:
//! - Per-field render sessions (debounce, bootstrap/patch state machine)
//! - The sandbox synchronization protocol (byte-safe base64 transport with
//!   an escaped-literal fallback)
//! - The [`SandboxRenderer`] trait the host's embedded content view
//!   implements

pub mod error;
pub mod sandbox;
pub mod session;
pub mod transport;

pub use error::SandboxError;
pub use sandbox::SandboxRenderer;
pub use session::{RenderSession, SessionConfig, TargetState};
