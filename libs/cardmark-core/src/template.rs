//! Fixed document template for the sandboxed renderer.
//!
//! The shell carries the content-assignment script and an empty content
//! slot; bootstrap-reload swaps the whole document while incremental patches
//! address the slot through the assignment functions.

use crate::theme::{self, ColorToken};

/// Element id of the patchable content slot.
pub const CONTENT_SLOT_ID: &str = "content";

/// Sandbox-side assign function taking the fragment as a plain string.
pub const ASSIGN_FN: &str = "cardmarkSetContent";

/// Sandbox-side decode-and-assign function taking the fragment's UTF-8
/// bytes as a base64 string.
pub const ASSIGN_B64_FN: &str = "cardmarkSetContentB64";

const SCRIPT: &str = "\
function cardmarkSetContent(html) {\
  document.getElementById('content').innerHTML = html;\
}\
function cardmarkSetContentB64(b64) {\
  var raw = atob(b64);\
  var bytes = new Uint8Array(raw.length);\
  for (var i = 0; i < raw.length; i++) { bytes[i] = raw.charCodeAt(i); }\
  cardmarkSetContent(new TextDecoder('utf-8').decode(bytes));\
}";

/// The static document shell: script plus empty content slot.
pub fn shell(dark_mode: bool) -> String {
    document("", dark_mode)
}

/// Wrap a compiled fragment in the full document template, themed for the
/// current palette.
pub fn document(fragment_html: &str, dark_mode: bool) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>{css}</style>\
<script>{SCRIPT}</script></head><body><div id=\"{CONTENT_SLOT_ID}\">{fragment_html}</div></body></html>",
        css = css(dark_mode),
    )
}

fn css(dark_mode: bool) -> String {
    format!(
        "body{{margin:8px;font-family:sans-serif;background-color:{bg};color:{fg};}}\
img{{max-height:160px;}}\
.blank{{display:inline-block;min-width:48px;border-bottom:1px solid currentColor;}}",
        bg = theme::resolve(ColorToken::Background, dark_mode),
        fg = theme::resolve(ColorToken::Foreground, dark_mode),
    )
}
