//! End-to-end render session behavior against a mock sandbox.

mod common;

use std::sync::Arc;
use std::time::Duration;

use cardmark_core::compile::MarkupCompiler;
use cardmark_core::image::EmptyImageStore;
use cardmark_core::types::{FieldKind, RenderOptions};
use cardmark_preview::{transport, RenderSession, SessionConfig, TargetState};
use common::MockSandbox;
use pretty_assertions::assert_eq;

fn session(sandbox: Arc<MockSandbox>) -> RenderSession<MockSandbox> {
    RenderSession::new(
        FieldKind::Prompt,
        sandbox,
        Arc::new(EmptyImageStore),
        RenderOptions::default(),
        SessionConfig::default(),
    )
}

fn compiled_html(source: &str, options: &RenderOptions) -> String {
    MarkupCompiler::new()
        .compile(source, options, &EmptyImageStore)
        .html
}

#[tokio::test(start_paused = true)]
async fn attach_bootstraps_with_fade_choreography() {
    let sandbox = Arc::new(MockSandbox::new());
    let session = session(Arc::clone(&sandbox));

    assert_eq!(session.state().await, TargetState::Uninitialized);
    session.attach().await;

    assert_eq!(session.state().await, TargetState::Ready);
    let loads = sandbox.loads();
    assert_eq!(loads.len(), 1);
    assert!(loads[0].contains("<div id=\"content\">"));
    assert!(loads[0].contains("function cardmarkSetContentB64("));
    // Fade to zero before the swap, back to full after.
    assert_eq!(sandbox.fades(), vec![0.0, 1.0]);
}

#[tokio::test(start_paused = true)]
async fn edits_within_quiet_period_coalesce_into_one_render() {
    let sandbox = Arc::new(MockSandbox::new());
    let session = session(Arc::clone(&sandbox));
    session.attach().await;

    session.note_edit("f");
    session.note_edit("fi");
    session.note_edit("first card");
    tokio::time::sleep(Duration::from_millis(600)).await;

    let patches = sandbox.patches();
    assert_eq!(patches.len(), 1);
    let expected = compiled_html("first card", &RenderOptions::default());
    assert_eq!(patches[0], transport::base64_patch(&expected));
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_each_render_once() {
    let sandbox = Arc::new(MockSandbox::new());
    let session = session(Arc::clone(&sandbox));
    session.attach().await;

    session.note_edit("one");
    tokio::time::sleep(Duration::from_millis(600)).await;
    session.note_edit("two");
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(sandbox.patches().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn renders_after_bootstrap_use_incremental_patch() {
    let sandbox = Arc::new(MockSandbox::new());
    let session = session(Arc::clone(&sandbox));
    session.attach().await;

    session.render_now("**hello**").await;

    // Still the single bootstrap load; the update went through the slot.
    assert_eq!(sandbox.loads().len(), 1);
    let expected = compiled_html("**hello**", &RenderOptions::default());
    assert_eq!(sandbox.patches(), vec![transport::base64_patch(&expected)]);
    // No extra fade cycle for an incremental patch.
    assert_eq!(sandbox.fades().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn base64_failure_falls_back_to_escaped_literal() {
    let sandbox = Arc::new(MockSandbox {
        fail_base64: true,
        ..MockSandbox::new()
    });
    let session = session(Arc::clone(&sandbox));
    session.attach().await;

    session.render_now("quote \" and 'tick'").await;

    let patches = sandbox.patches();
    assert_eq!(patches.len(), 2);
    assert!(patches[0].starts_with("cardmarkSetContentB64("));
    let expected = compiled_html("quote \" and 'tick'", &RenderOptions::default());
    assert_eq!(patches[1], transport::literal_patch(&expected));
}

#[tokio::test(start_paused = true)]
async fn total_transport_failure_degrades_to_full_reload() {
    let sandbox = Arc::new(MockSandbox {
        fail_patches: true,
        ..MockSandbox::new()
    });
    let session = session(Arc::clone(&sandbox));
    session.attach().await;

    session.render_now("fallback content").await;

    // Both transports were attempted, then the session reloaded the whole
    // document with the fragment embedded.
    assert_eq!(sandbox.patches().len(), 2);
    let loads = sandbox.loads();
    assert_eq!(loads.len(), 2);
    let expected = compiled_html("fallback content", &RenderOptions::default());
    assert!(loads[1].contains(&expected));
    assert_eq!(session.state().await, TargetState::Ready);
}

#[tokio::test(start_paused = true)]
async fn deliveries_during_bootstrap_buffer_latest_only() {
    let sandbox = Arc::new(MockSandbox {
        load_delay: Duration::from_secs(1),
        ..MockSandbox::new()
    });
    let session = session(Arc::clone(&sandbox));

    let attaching = {
        let session = session.clone();
        tokio::spawn(async move { session.attach().await })
    };
    // Let the bootstrap get in flight.
    tokio::time::sleep(Duration::from_millis(10)).await;

    session.render_now("superseded").await;
    session.render_now("survivor").await;
    attaching.await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(sandbox.loads().len(), 1);
    let patches = sandbox.patches();
    assert_eq!(patches.len(), 1);
    let expected = compiled_html("survivor", &RenderOptions::default());
    assert_eq!(patches[0], transport::base64_patch(&expected));
}

#[tokio::test(start_paused = true)]
async fn missing_load_signal_degrades_to_assume_ready() {
    let sandbox = Arc::new(MockSandbox {
        hang_load_complete: true,
        ready_state: "loading".to_string(),
        ..MockSandbox::new()
    });
    let session = session(Arc::clone(&sandbox));

    session.attach().await;

    // The timeout and failed probes are degraded, never fatal.
    assert_eq!(session.state().await, TargetState::Ready);
    let probes: Vec<String> = sandbox
        .evals()
        .into_iter()
        .filter(|s| s == "document.readyState")
        .collect();
    assert_eq!(probes.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn theme_change_forces_bootstrap_reload() {
    let sandbox = Arc::new(MockSandbox::new());
    let session = session(Arc::clone(&sandbox));
    session.attach().await;
    session.render_now("text").await;
    assert_eq!(sandbox.loads().len(), 1);

    session
        .set_options(RenderOptions {
            reveal_answers: false,
            dark_mode: true,
        })
        .await;

    let loads = sandbox.loads();
    assert_eq!(loads.len(), 2);
    assert_ne!(loads[0], loads[1]);
}

#[tokio::test(start_paused = true)]
async fn reveal_toggle_patches_without_reload() {
    let sandbox = Arc::new(MockSandbox::new());
    let session = session(Arc::clone(&sandbox));
    session.attach().await;
    session.render_now("<<blank|Paris>>").await;

    session
        .set_options(RenderOptions {
            reveal_answers: true,
            dark_mode: false,
        })
        .await;

    assert_eq!(sandbox.loads().len(), 1);
    let patches = sandbox.patches();
    assert_eq!(patches.len(), 2);
    let revealed = compiled_html(
        "<<blank|Paris>>",
        &RenderOptions {
            reveal_answers: true,
            dark_mode: false,
        },
    );
    assert_eq!(patches[1], transport::base64_patch(&revealed));
}

#[tokio::test(start_paused = true)]
async fn sessions_for_different_fields_are_independent() {
    let sandbox_a = Arc::new(MockSandbox::new());
    let sandbox_b = Arc::new(MockSandbox::new());
    let prompt = RenderSession::new(
        FieldKind::Prompt,
        Arc::clone(&sandbox_a),
        Arc::new(EmptyImageStore),
        RenderOptions::default(),
        SessionConfig::default(),
    );
    let answer = RenderSession::new(
        FieldKind::Answer,
        Arc::clone(&sandbox_b),
        Arc::new(EmptyImageStore),
        RenderOptions::default(),
        SessionConfig::default(),
    );

    prompt.attach().await;
    answer.attach().await;
    prompt.note_edit("prompt text");
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(sandbox_a.patches().len(), 1);
    assert!(sandbox_b.patches().is_empty());
    assert_eq!(prompt.field(), FieldKind::Prompt);
    assert_eq!(answer.field(), FieldKind::Answer);
}
