//! Decoration editor: wrap-selection markup operations.
//!
//! Stateless transforms over `(text, selection, cursor)`. Offsets are
//! character offsets supplied by the host editing surface; resolving them
//! from platform selection APIs is the surface's concern, not ours.

use crate::theme::ColorToken;
use crate::types::FieldKind;
use serde::{Deserialize, Serialize};

/// Bracket pairs stripped from a selection before cloze wrapping, so that
/// selecting "(answer)" yields `<<blank|answer>>`.
const BRACKET_PAIRS: [(char, char); 6] = [
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('（', '）'),
    ('［', '］'),
    ('｛', '｝'),
];

/// A markup operation the host surface can apply to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    Bold,
    Color(ColorToken),
    Superscript,
    Subscript,
    /// Cloze blank. Only semantically meaningful on [`FieldKind::Prompt`];
    /// other fields accept it but render the directive as literal inert
    /// markup.
    Blank,
}

impl Decoration {
    /// The delimiter pair inserted around the wrapped text.
    pub fn delimiters(&self) -> (String, String) {
        match self {
            Self::Bold => ("**".to_string(), "**".to_string()),
            Self::Color(token) => (format!("{{{{{}|", token.as_str()), "}}".to_string()),
            Self::Superscript => ("^^".to_string(), "^^".to_string()),
            Self::Subscript => ("~~".to_string(), "~~".to_string()),
            Self::Blank => ("<<blank|".to_string(), ">>".to_string()),
        }
    }

    /// Whether this decoration is semantically meaningful on `field`.
    pub fn is_meaningful_on(&self, field: FieldKind) -> bool {
        match self {
            Self::Blank => field == FieldKind::Prompt,
            _ => true,
        }
    }
}

/// Apply a decoration to the current selection or cursor position.
///
/// Returns the mutated text and the new cursor position (in characters).
pub fn apply(
    text: &str,
    selection_start: Option<usize>,
    selection_len: Option<usize>,
    cursor: usize,
    decoration: &Decoration,
) -> (String, usize) {
    let (prefix, suffix) = decoration.delimiters();
    let strip_brackets = matches!(decoration, Decoration::Blank);
    wrap_inner(
        text,
        selection_start,
        selection_len,
        cursor,
        &prefix,
        &suffix,
        strip_brackets,
    )
}

/// Wrap the selection in an arbitrary delimiter pair.
///
/// With a non-empty selection the selected text is replaced by
/// `prefix + selected + suffix` and the caret lands inside the closing
/// delimiter. Without one, `prefix + suffix` is inserted at the cursor and
/// the caret lands between the delimiters so typing continues inside them.
pub fn wrap(
    text: &str,
    selection_start: Option<usize>,
    selection_len: Option<usize>,
    cursor: usize,
    prefix: &str,
    suffix: &str,
) -> (String, usize) {
    wrap_inner(text, selection_start, selection_len, cursor, prefix, suffix, false)
}

fn wrap_inner(
    text: &str,
    selection_start: Option<usize>,
    selection_len: Option<usize>,
    cursor: usize,
    prefix: &str,
    suffix: &str,
    strip_brackets: bool,
) -> (String, usize) {
    match (selection_start, selection_len) {
        (Some(start), Some(len)) if len > 0 => {
            let b_start = char_to_byte(text, start);
            let b_end = char_to_byte(text, start + len);
            let selected = &text[b_start..b_end];
            let selected = if strip_brackets {
                strip_bracket_pair(selected)
            } else {
                selected
            };

            let mut out = String::with_capacity(text.len() + prefix.len() + suffix.len());
            out.push_str(&text[..b_start]);
            out.push_str(prefix);
            out.push_str(selected);
            out.push_str(suffix);
            out.push_str(&text[b_end..]);

            // Caret lands inside the closing delimiter, not past it.
            let new_cursor = start + prefix.chars().count() + selected.chars().count() + 1;
            (out, new_cursor)
        }
        _ => {
            let b_cursor = char_to_byte(text, cursor);
            let mut out = String::with_capacity(text.len() + prefix.len() + suffix.len());
            out.push_str(&text[..b_cursor]);
            out.push_str(prefix);
            out.push_str(suffix);
            out.push_str(&text[b_cursor..]);

            // Typing lands between the delimiters.
            (out, cursor + prefix.chars().count())
        }
    }
}

/// Strip one matching pair of surrounding brackets, if present.
fn strip_bracket_pair(s: &str) -> &str {
    let mut chars = s.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return s;
    };
    if BRACKET_PAIRS.contains(&(first, last)) {
        &s[first.len_utf8()..s.len() - last.len_utf8()]
    } else {
        s
    }
}

fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}
