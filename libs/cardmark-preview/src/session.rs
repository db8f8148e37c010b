//! Per-field render session.
//!
//! One session per editable field owns the debounce timer, the render-target
//! state machine, and the choice between full-document bootstrap and
//! incremental patch. Sessions are independent; they share only the
//! stateless compiler and theme/image services.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use cardmark_core::compile::MarkupCompiler;
use cardmark_core::image::ImageStore;
use cardmark_core::template;
use cardmark_core::types::{FieldKind, RenderOptions, RenderedFragment};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::SandboxError;
use crate::sandbox::SandboxRenderer;
use crate::transport;

/// Tunables for one render session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period before an edit burst is rendered.
    pub quiet_period: Duration,
    /// Delay after load-complete before fading back in, letting styles
    /// apply. Skipping it is a known source of visible flash.
    pub settle_delay: Duration,
    pub fade_out: Duration,
    pub fade_in: Duration,
    /// Upper bound on one sandbox evaluation or load-complete wait.
    pub eval_timeout: Duration,
    /// Best-effort readiness probes before assuming the sandbox is ready.
    pub readiness_probes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(500),
            settle_delay: Duration::from_millis(100),
            fade_out: Duration::from_millis(50),
            fade_in: Duration::from_millis(150),
            eval_timeout: Duration::from_secs(3),
            readiness_probes: 3,
        }
    }
}

/// Render-target lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    /// No renderer content loaded yet.
    Uninitialized,
    /// Document shell swapped in, waiting for the load-complete signal.
    /// Patches requested now are buffered, latest-wins.
    Bootstrapping,
    /// The sandbox is interactive; patches are pushed directly.
    Ready,
}

/// Live-preview session for one editable field. Cheap to clone; clones share
/// the same timer, state machine and sandbox.
pub struct RenderSession<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for RenderSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SandboxRenderer + 'static> RenderSession<S> {
    pub fn new(
        field: FieldKind,
        sandbox: Arc<S>,
        store: Arc<dyn ImageStore + Send + Sync>,
        options: RenderOptions,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                field,
                sandbox,
                store,
                compiler: MarkupCompiler::new(),
                config,
                edit: StdMutex::new(EditState {
                    snapshot: String::new(),
                    dirty: false,
                    options,
                }),
                delivery: Mutex::new(DeliveryState {
                    state: TargetState::Uninitialized,
                    in_flight: false,
                    pending: None,
                }),
                debounce: StdMutex::new(None),
            }),
        }
    }

    pub fn field(&self) -> FieldKind {
        self.inner.field
    }

    pub fn options(&self) -> RenderOptions {
        self.inner.options()
    }

    /// Current render-target state.
    pub async fn state(&self) -> TargetState {
        self.inner.delivery.lock().await.state
    }

    /// Load the static document shell with the current snapshot's content
    /// and wait for the sandbox to become interactive. Patches requested
    /// while this is in flight are buffered, latest-wins.
    pub async fn attach(&self) {
        let (snapshot, options) = self.inner.take_snapshot();
        let fragment = self.inner.compile(&snapshot, &options);
        self.inner.deliver(fragment, true).await;
    }

    /// Record a text change: mark the session dirty, cancel any pending
    /// debounce timer and start a new single-shot one. Bursts of edits
    /// within the quiet period coalesce into a single render of the last
    /// snapshot.
    pub fn note_edit(&self, snapshot: impl Into<String>) {
        if let Ok(mut edit) = self.inner.edit.lock() {
            edit.snapshot = snapshot.into();
            edit.dirty = true;
        }

        let inner = Arc::clone(&self.inner);
        let quiet = self.inner.config.quiet_period;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            inner.render_latest().await;
        });

        // Last-write-wins: starting a timer always cancels the previous one.
        if let Ok(mut slot) = self.inner.debounce.lock() {
            if let Some(previous) = slot.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Compile and deliver the given snapshot immediately, bypassing the
    /// debounce timer.
    pub async fn render_now(&self, snapshot: impl Into<String>) {
        let snapshot = snapshot.into();
        let options = {
            match self.inner.edit.lock() {
                Ok(mut edit) => {
                    edit.snapshot = snapshot.clone();
                    edit.dirty = false;
                    edit.options
                }
                Err(_) => RenderOptions::default(),
            }
        };
        let fragment = self.inner.compile(&snapshot, &options);
        self.inner.deliver(fragment, false).await;
    }

    /// Replace the render options and re-render the latest snapshot. A
    /// palette change restyles the whole document, so it forces the next
    /// delivery through the bootstrap-reload path.
    pub async fn set_options(&self, options: RenderOptions) {
        let (snapshot, reload) = {
            match self.inner.edit.lock() {
                Ok(mut edit) => {
                    let theme_changed = edit.options.dark_mode != options.dark_mode;
                    edit.options = options;
                    edit.dirty = false;
                    (edit.snapshot.clone(), theme_changed)
                }
                Err(_) => (String::new(), true),
            }
        };
        let fragment = self.inner.compile(&snapshot, &options);
        self.inner.deliver(fragment, reload).await;
    }
}

/// Latest edit-side inputs, written by `note_edit` and read when a render
/// pass starts.
struct EditState {
    snapshot: String,
    dirty: bool,
    options: RenderOptions,
}

/// Async delivery state. A session never has two in-flight deliveries; a
/// request arriving while one is in flight replaces any buffered one.
struct DeliveryState {
    state: TargetState,
    in_flight: bool,
    pending: Option<PendingDelivery>,
}

struct PendingDelivery {
    fragment: RenderedFragment,
    reload: bool,
}

struct Inner<S> {
    field: FieldKind,
    sandbox: Arc<S>,
    store: Arc<dyn ImageStore + Send + Sync>,
    compiler: MarkupCompiler,
    config: SessionConfig,
    edit: StdMutex<EditState>,
    delivery: Mutex<DeliveryState>,
    debounce: StdMutex<Option<JoinHandle<()>>>,
}

impl<S: SandboxRenderer + 'static> Inner<S> {
    fn options(&self) -> RenderOptions {
        self.edit.lock().map(|e| e.options).unwrap_or_default()
    }

    fn take_snapshot(&self) -> (String, RenderOptions) {
        match self.edit.lock() {
            Ok(mut edit) => {
                edit.dirty = false;
                (edit.snapshot.clone(), edit.options)
            }
            Err(_) => (String::new(), RenderOptions::default()),
        }
    }

    fn compile(&self, snapshot: &str, options: &RenderOptions) -> RenderedFragment {
        self.compiler.compile(snapshot, options, self.store.as_ref())
    }

    /// Debounce timer body: render the latest snapshot if still dirty.
    async fn render_latest(&self) {
        let work = match self.edit.lock() {
            Ok(mut edit) if edit.dirty => {
                edit.dirty = false;
                Some((edit.snapshot.clone(), edit.options))
            }
            _ => None,
        };
        let Some((snapshot, options)) = work else {
            return;
        };
        let fragment = self.compile(&snapshot, &options);
        self.deliver(fragment, false).await;
    }

    /// Hand a fragment to the delivery loop. If a delivery is already in
    /// flight, only the most recent request survives; the reload flag is
    /// sticky so a superseded theme change still reloads.
    async fn deliver(&self, fragment: RenderedFragment, reload: bool) {
        {
            let mut delivery = self.delivery.lock().await;
            if delivery.in_flight {
                let reload = reload || delivery.pending.as_ref().is_some_and(|p| p.reload);
                delivery.pending = Some(PendingDelivery { fragment, reload });
                return;
            }
            delivery.in_flight = true;
        }

        let mut next = Some(PendingDelivery { fragment, reload });
        while let Some(pending) = next {
            self.push(pending).await;
            let mut delivery = self.delivery.lock().await;
            next = delivery.pending.take();
            if next.is_none() {
                delivery.in_flight = false;
            }
        }
    }

    async fn push(&self, pending: PendingDelivery) {
        let state = { self.delivery.lock().await.state };
        let dark_mode = self.options().dark_mode;

        if pending.reload || state != TargetState::Ready {
            if let Err(e) = self.bootstrap(&pending.fragment.html, dark_mode).await {
                tracing::warn!(
                    "field {}: bootstrap reload failed: {}",
                    self.field.as_str(),
                    e
                );
            }
            return;
        }

        if let Err(e) = self.try_patch(&pending.fragment.html).await {
            tracing::warn!(
                "field {}: both transports failed ({}); degrading to full reload",
                self.field.as_str(),
                e
            );
            if let Err(e) = self.bootstrap(&pending.fragment.html, dark_mode).await {
                tracing::warn!(
                    "field {}: degraded reload failed: {}",
                    self.field.as_str(),
                    e
                );
            }
        }
    }

    /// Incremental patch with transport fallback: byte-safe base64 first,
    /// escaped literal second.
    async fn try_patch(&self, fragment_html: &str) -> Result<(), SandboxError> {
        match self
            .eval_with_timeout(&transport::base64_patch(fragment_html))
            .await
        {
            Ok(_) => return Ok(()),
            Err(e) => tracing::debug!(
                "field {}: byte-safe transport failed ({}); trying escaped literal",
                self.field.as_str(),
                e
            ),
        }
        self.eval_with_timeout(&transport::literal_patch(fragment_html))
            .await
            .map(|_| ())
    }

    /// Full-document swap with visibility choreography: fade out before the
    /// swap, wait for load-complete, let styles settle, fade back in.
    async fn bootstrap(&self, fragment_html: &str, dark_mode: bool) -> Result<(), SandboxError> {
        {
            self.delivery.lock().await.state = TargetState::Bootstrapping;
        }

        if let Err(e) = self.sandbox.fade_to(0.0, self.config.fade_out).await {
            tracing::debug!("field {}: fade-out failed: {}", self.field.as_str(), e);
        }

        self.sandbox
            .load_document(&template::document(fragment_html, dark_mode))
            .await?;
        self.await_ready().await;

        tokio::time::sleep(self.config.settle_delay).await;
        if let Err(e) = self.sandbox.fade_to(1.0, self.config.fade_in).await {
            tracing::debug!("field {}: fade-in failed: {}", self.field.as_str(), e);
        }

        self.delivery.lock().await.state = TargetState::Ready;
        Ok(())
    }

    /// Wait for the load-complete signal, then fall back to bounded
    /// readiness probes. A timeout degrades to "assume ready".
    async fn await_ready(&self) {
        match tokio::time::timeout(self.config.eval_timeout, self.sandbox.wait_load_complete())
            .await
        {
            Ok(Ok(())) => return,
            Ok(Err(e)) => {
                tracing::debug!("field {}: load-complete failed: {}", self.field.as_str(), e)
            }
            Err(_) => tracing::debug!(
                "field {}: load-complete wait timed out",
                self.field.as_str()
            ),
        }

        for _ in 0..self.config.readiness_probes {
            match self.eval_with_timeout(transport::READY_PROBE).await {
                Ok(state) if state.contains(transport::READY_STATE) => return,
                Ok(_) => {}
                Err(e) => tracing::debug!(
                    "field {}: readiness probe failed: {}",
                    self.field.as_str(),
                    e
                ),
            }
            tokio::time::sleep(self.config.settle_delay).await;
        }
        tracing::debug!(
            "field {}: assuming sandbox ready after best-effort probes",
            self.field.as_str()
        );
    }

    async fn eval_with_timeout(&self, script: &str) -> Result<String, SandboxError> {
        match tokio::time::timeout(self.config.eval_timeout, self.sandbox.evaluate(script)).await
        {
            Ok(result) => result,
            Err(_) => Err(SandboxError::Timeout(self.config.eval_timeout)),
        }
    }
}

impl<S> Drop for Inner<S> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.debounce.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}
