//! Crate-wide error types for the Game/PGN layer.
//!
//! Board-level errors (`FenError`, `SanError`, `SquareError`, `MoveError`,
//! ...) live in `board::error`; these cover the layers built on top of a
//! single position: game history, headers, and PGN text.

use std::fmt;

/// Error type for PGN movetext parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PgnError {
    /// The movetext does not conform to PGN grammar.
    Grammar { offset: usize, message: String },
    /// The movetext parses but a SAN token does not correspond to a legal
    /// move in the position reached so far.
    Semantic { san: String, ply: usize },
}

impl fmt::Display for PgnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PgnError::Grammar { offset, message } => {
                write!(f, "PGN grammar error at byte {offset}: {message}")
            }
            PgnError::Semantic { san, ply } => {
                write!(f, "SAN move '{san}' is not legal at ply {ply}")
            }
        }
    }
}

impl std::error::Error for PgnError {}

/// Error type for NAG/suffix annotation parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuffixError {
    /// Token does not begin with '$' and is not a recognized `!`/`?` glyph.
    UnrecognizedSuffix { token: String },
    /// Numeric NAG is outside the valid 0-255 range.
    NagOutOfRange { value: i64 },
}

impl fmt::Display for SuffixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuffixError::UnrecognizedSuffix { token } => {
                write!(f, "Unrecognized move suffix '{token}'")
            }
            SuffixError::NagOutOfRange { value } => {
                write!(f, "NAG value {value} is out of the 0-255 range")
            }
        }
    }
}

impl std::error::Error for SuffixError {}

/// Error type for header tag-pair contract violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// A required Seven Tag Roster tag was removed.
    RequiredTagRemoved { tag: String },
    /// Tag name contains characters outside PGN's tag-name grammar.
    InvalidTagName { tag: String },
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::RequiredTagRemoved { tag } => {
                write!(f, "Required tag '{tag}' cannot be removed")
            }
            HeaderError::InvalidTagName { tag } => {
                write!(f, "Invalid tag name '{tag}'")
            }
        }
    }
}

impl std::error::Error for HeaderError {}
