//! Card markup compiler.
//!
//! # Grammar
//! ```text
//! <<img_NNNNNNNN_NNNNNN.jpg>>   inline image (content store reference)
//! <<blank|ANSWER>>              cloze blank, hidden until revealed
//! **TEXT**                      bold
//! {{COLOR|TEXT}}                colored span (red, blue, green, yellow,
//!                               purple, orange)
//! ^^TEXT^^                      superscript
//! ~~TEXT~~                      subscript
//! ```
//!
//! Compilation never fails: unmatched or unterminated delimiters pass
//! through as literal text. Directives do not nest; substitution is
//! single-pass per directive kind.

use crate::image::{self, ImageStore};
use crate::theme::{self, ColorToken};
use crate::types::{BlankOccurrence, ImageToken, RenderOptions, RenderedFragment};
use regex::{Captures, Regex};

/// Inline images are clamped to this height inside the rendered fragment.
pub const IMAGE_MAX_HEIGHT_PX: u32 = 160;

/// Compiles raw card markup into sandboxed HTML fragments.
///
/// Holds its directive patterns pre-compiled; construct once and reuse
/// across renders. Stateless between calls.
pub struct MarkupCompiler {
    image_re: Regex,
    blank_re: Regex,
    bold_re: Regex,
    color_re: Regex,
    sup_re: Regex,
    sub_re: Regex,
}

impl MarkupCompiler {
    pub fn new() -> Self {
        Self {
            image_re: Regex::new(r"<<(img_[0-9]{8}_[0-9]{6}\.jpg)>>").expect("image pattern"),
            blank_re: Regex::new(r"(?s)<<blank\|(.*?)>>").expect("blank pattern"),
            bold_re: Regex::new(r"(?s)\*\*(.+?)\*\*").expect("bold pattern"),
            color_re: Regex::new(r"(?s)\{\{(red|blue|green|yellow|purple|orange)\|(.*?)\}\}")
                .expect("color pattern"),
            sup_re: Regex::new(r"(?s)\^\^(.+?)\^\^").expect("superscript pattern"),
            sub_re: Regex::new(r"(?s)~~(.+?)~~").expect("subscript pattern"),
        }
    }

    /// Compile one field's markup source into an HTML fragment.
    ///
    /// The pass order is the correctness invariant: generated elements are
    /// swapped for opaque positional markers before the escape pass and
    /// restored immediately after it, so final HTML is escaped exactly zero
    /// times and user text exactly once.
    pub fn compile(
        &self,
        source: &str,
        options: &RenderOptions,
        store: &dyn ImageStore,
    ) -> RenderedFragment {
        let mut protected: Vec<String> = Vec::new();
        let mut image_count = 0usize;

        // Image tokens first. A resolvable token becomes a final <img>
        // element (protected). A missing one becomes a plain-text message
        // that goes through the escape pass like any user text.
        let text = self.image_re.replace_all(source, |caps: &Captures| {
            let Some(token) = ImageToken::parse(&caps[1]) else {
                return caps[0].to_string();
            };
            match store.resolve(&token) {
                Ok(bytes) => {
                    image_count += 1;
                    protect(
                        &mut protected,
                        format!(
                            "<img src=\"{}\" style=\"max-height:{}px;\">",
                            image::data_uri(&bytes),
                            IMAGE_MAX_HEIGHT_PX
                        ),
                    )
                }
                Err(_) => image::missing_placeholder(&token),
            }
        });

        // Cloze directives. Ordinals increment per match in source order.
        let mut blanks: Vec<BlankOccurrence> = Vec::new();
        let text = self.blank_re.replace_all(&text, |caps: &Captures| {
            let answer = caps[1].to_string();
            let ordinal = blanks.len() + 1;
            let element = if options.reveal_answers {
                format!(
                    "<span class=\"blank revealed\" id=\"blank_{ordinal}\" style=\"color:{};\">{}</span>",
                    theme::resolve(ColorToken::Accent, options.dark_mode),
                    escape_html(&answer),
                )
            } else {
                // The escaped answer rides in a data attribute so it
                // survives the escape pass without re-escaping; the visible
                // body is a single space.
                format!(
                    "<span class=\"blank\" id=\"blank_{ordinal}\" data-answer=\"{}\"> </span>",
                    escape_html(&answer),
                )
            };
            blanks.push(BlankOccurrence {
                ordinal,
                answer_text: answer,
                revealed: options.reveal_answers,
            });
            protect(&mut protected, element)
        });

        // Escape the remainder, then restore the protected elements in
        // order. Exactly one restore pass per escape pass.
        let mut text = escape_html(&text);
        for (idx, element) in protected.iter().enumerate() {
            text = text.replacen(&marker(idx), element, 1);
        }

        // Inline styling. Safe post-escape: the delimiters are ASCII
        // punctuation the escape pass does not alter.
        let text = self
            .bold_re
            .replace_all(&text, "<strong>$1</strong>")
            .into_owned();
        let text = self.color_re.replace_all(&text, |caps: &Captures| {
            match ColorToken::from_directive(&caps[1]) {
                Some(token) => format!(
                    "<span style=\"color:{};\">{}</span>",
                    theme::resolve(token, options.dark_mode),
                    &caps[2]
                ),
                None => caps[0].to_string(),
            }
        });
        let text = self.sup_re.replace_all(&text, "<sup>$1</sup>");
        let text = self.sub_re.replace_all(&text, "<sub>$1</sub>");

        let html = into_paragraphs(&text);

        RenderedFragment {
            html,
            blank_count: blanks.len(),
            image_count,
            blanks,
        }
    }
}

impl Default for MarkupCompiler {
    fn default() -> Self {
        Self::new()
    }
}

fn marker(idx: usize) -> String {
    format!("__ELEMENT_{idx}__")
}

fn protect(protected: &mut Vec<String>, element: String) -> String {
    protected.push(element);
    marker(protected.len() - 1)
}

/// Escape text for safe inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Segment processed text into paragraphs: blank lines separate paragraphs,
/// a single newline inside a paragraph becomes a line break, and empty
/// paragraphs are dropped.
fn into_paragraphs(text: &str) -> String {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(|p| p.trim_matches('\n'))
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("<p>{}</p>", p.replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n")
}
