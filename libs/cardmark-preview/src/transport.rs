//! Sandbox synchronization protocol: script builders for pushing a compiled
//! fragment across the host/sandbox encoding boundary.
//!
//! Two independent encodings, the second as a defense-in-depth fallback.
//! The byte-safe transport is primary: its payload contains only base64
//! alphabet characters, so quotes, backslashes, newlines and non-ASCII text
//! in the fragment can never break the script literal.

use base64::{engine::general_purpose, Engine};
use cardmark_core::template::{ASSIGN_B64_FN, ASSIGN_FN};

/// Script probing document readiness during bootstrap.
pub const READY_PROBE: &str = "document.readyState";

/// Result of [`READY_PROBE`] once the document is interactive.
pub const READY_STATE: &str = "complete";

/// Primary transport: the fragment's UTF-8 bytes as a base64 argument to the
/// sandbox-side decode-and-assign function.
pub fn base64_patch(fragment_html: &str) -> String {
    format!(
        "{ASSIGN_B64_FN}(\"{}\")",
        general_purpose::STANDARD.encode(fragment_html.as_bytes())
    )
}

/// Fallback transport: the fragment inlined as an escaped string literal.
pub fn literal_patch(fragment_html: &str) -> String {
    format!("{ASSIGN_FN}(\"{}\")", escape_js_literal(fragment_html))
}

/// Escape backslashes, quotes, newlines and tabs for a double-quoted script
/// literal.
pub fn escape_js_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
