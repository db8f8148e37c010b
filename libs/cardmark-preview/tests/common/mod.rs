//! Shared test fixtures: a scriptable mock sandbox renderer.

use async_trait::async_trait;
use cardmark_preview::{SandboxError, SandboxRenderer};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(String),
    Eval(String),
    Fade(f64),
}

/// Mock sandbox recording every call, with switchable failure modes.
pub struct MockSandbox {
    pub calls: Mutex<Vec<Call>>,
    /// Reject byte-safe transport scripts.
    pub fail_base64: bool,
    /// Reject every content-assignment script.
    pub fail_patches: bool,
    /// Simulated document load time.
    pub load_delay: Duration,
    /// Never emit the load-complete signal.
    pub hang_load_complete: bool,
    /// Value returned for readiness probes.
    pub ready_state: String,
}

impl MockSandbox {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_base64: false,
            fail_patches: false,
            load_delay: Duration::ZERO,
            hang_load_complete: false,
            ready_state: "complete".to_string(),
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn loads(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::Load(html) => Some(html.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn evals(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::Eval(script) => Some(script.clone()),
                _ => None,
            })
            .collect()
    }

    /// Content-assignment scripts only, probe evaluations filtered out.
    pub fn patches(&self) -> Vec<String> {
        self.evals()
            .into_iter()
            .filter(|s| s.starts_with("cardmarkSetContent"))
            .collect()
    }

    pub fn fades(&self) -> Vec<f64> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::Fade(opacity) => Some(*opacity),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockSandbox {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SandboxRenderer for MockSandbox {
    async fn load_document(&self, html: &str) -> Result<(), SandboxError> {
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        self.record(Call::Load(html.to_string()));
        Ok(())
    }

    async fn wait_load_complete(&self) -> Result<(), SandboxError> {
        if self.hang_load_complete {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<String, SandboxError> {
        self.record(Call::Eval(script.to_string()));
        if script == "document.readyState" {
            return Ok(self.ready_state.clone());
        }
        let is_base64 = script.starts_with("cardmarkSetContentB64(");
        if self.fail_patches || (self.fail_base64 && is_base64) {
            return Err(SandboxError::Evaluate("rejected by mock".to_string()));
        }
        Ok(String::new())
    }

    async fn fade_to(&self, opacity: f64, _duration: Duration) -> Result<(), SandboxError> {
        self.record(Call::Fade(opacity));
        Ok(())
    }
}
