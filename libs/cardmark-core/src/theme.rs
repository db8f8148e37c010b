//! Theme resolution for markup colors.
//!
//! Maps semantic color tokens to concrete values for the light and dark
//! palettes. The dark palette substitutes softer, desaturated variants for
//! legibility; both palettes are static tables.

use serde::{Deserialize, Serialize};

/// Semantic color token recognized by the markup grammar and the document
/// template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorToken {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Background,
    Foreground,
    Accent,
}

impl ColorToken {
    /// Get the token name as used in `{{color|...}}` directives.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Background => "background",
            Self::Foreground => "foreground",
            Self::Accent => "accent",
        }
    }

    /// Parse a directive color name. Only the six markup colors are valid in
    /// `{{color|...}}` directives; `background`, `foreground` and `accent`
    /// are reserved for the template and cloze reveal styling.
    pub fn from_directive(s: &str) -> Option<Self> {
        match s {
            "red" => Some(Self::Red),
            "blue" => Some(Self::Blue),
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "purple" => Some(Self::Purple),
            "orange" => Some(Self::Orange),
            _ => None,
        }
    }
}

/// Resolve a color token against a palette. Pure and total.
pub fn resolve(token: ColorToken, dark_mode: bool) -> &'static str {
    if dark_mode {
        match token {
            ColorToken::Red => "#ef9a9a",
            ColorToken::Blue => "#90caf9",
            ColorToken::Green => "#a5d6a7",
            ColorToken::Yellow => "#fff59d",
            ColorToken::Purple => "#ce93d8",
            ColorToken::Orange => "#ffcc80",
            ColorToken::Background => "#1e1e1e",
            ColorToken::Foreground => "#e0e0e0",
            ColorToken::Accent => "#f48fb1",
        }
    } else {
        match token {
            ColorToken::Red => "#d32f2f",
            ColorToken::Blue => "#1565c0",
            ColorToken::Green => "#2e7d32",
            ColorToken::Yellow => "#f9a825",
            ColorToken::Purple => "#6a1b9a",
            ColorToken::Orange => "#e65100",
            ColorToken::Background => "#ffffff",
            ColorToken::Foreground => "#1a1a1a",
            ColorToken::Accent => "#d81b60",
        }
    }
}
