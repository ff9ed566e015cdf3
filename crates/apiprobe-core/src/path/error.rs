//! Error types for path parsing
//!
//! Copyright (c) 2025 Apiprobe Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Path expression parse failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Two dots in a row, or a leading/trailing dot
    #[error("Empty segment at position {position}")]
    EmptySegment { input: String, position: usize },

    /// A bracket that is not part of a `[]` projection
    #[error("Unexpected '{found}' at position {position}, only '[]' projections are supported")]
    UnexpectedCharacter {
        input: String,
        position: usize,
        found: char,
    },
}

impl PathError {
    /// The path text that failed to parse
    pub fn input(&self) -> &str {
        match self {
            PathError::EmptySegment { input, .. } => input,
            PathError::UnexpectedCharacter { input, .. } => input,
        }
    }

    /// Byte offset of the offending segment or character
    pub fn position(&self) -> usize {
        match self {
            PathError::EmptySegment { position, .. } => *position,
            PathError::UnexpectedCharacter { position, .. } => *position,
        }
    }
}
