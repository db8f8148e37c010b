//! Core types for card markup rendering.

use serde::{Deserialize, Serialize};

/// Which editable field a piece of markup belongs to.
///
/// Sessions and decoration callers identify fields explicitly instead of
/// inferring them from control identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Prompt,
    Answer,
    ChoiceQuestion,
    ChoiceExplanation,
}

impl FieldKind {
    /// Get the field name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Answer => "answer",
            Self::ChoiceQuestion => "choice_question",
            Self::ChoiceExplanation => "choice_explanation",
        }
    }
}

/// Options for one render pass. Immutable, passed per render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Show cloze answers inline instead of hiding them behind placeholders.
    pub reveal_answers: bool,
    /// Resolve theme colors against the dark palette.
    pub dark_mode: bool,
}

/// One cloze ("blank") directive found during a render pass.
///
/// Ordinals are 1-based, dense, assigned left-to-right by order of
/// appearance, and recomputed on every render. They are addressing
/// information for the current fragment only, never persisted identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlankOccurrence {
    pub ordinal: usize,
    pub answer_text: String,
    pub revealed: bool,
}

/// The HTML produced for one field at one point in time.
///
/// Owned by the render session that requested it and replaced wholesale on
/// each render. `html` is the inner content fragment; wrapping it in the
/// enclosing document shell is [`crate::template::document`]'s job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedFragment {
    pub html: String,
    /// Number of cloze directives in the fragment.
    pub blank_count: usize,
    /// Number of image tokens successfully embedded.
    pub image_count: usize,
    pub blanks: Vec<BlankOccurrence>,
}

/// Reference to a captured image, of the form `img_NNNNNNNN_NNNNNN.jpg`
/// (8 digits, underscore, 6 digits). The digit pair is a collision-resistant
/// identifier assigned at capture time and is the join key into the image
/// content store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageToken(String);

impl ImageToken {
    /// Parse a token from its string form, validating the shape.
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.strip_prefix("img_")?;
        let rest = rest.strip_suffix(".jpg")?;
        let (first, second) = rest.split_once('_')?;
        if first.len() == 8
            && second.len() == 6
            && first.bytes().all(|b| b.is_ascii_digit())
            && second.bytes().all(|b| b.is_ascii_digit())
        {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    /// The token's file name, as stored in the image content store.
    pub fn file_name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
