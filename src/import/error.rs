//! Error types for plan imports.

use std::fmt;

use thiserror::Error;

use crate::document::ValidationError;
use crate::export::ExportError;

/// Where in the source an import failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePosition {
    /// Byte offset into the input buffer.
    Byte(u64),
    /// Zero-based index of a whitespace-separated token.
    Token(usize),
    Unknown,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(offset) => write!(f, "byte {offset}"),
            Self::Token(index) => write!(f, "token {index}"),
            Self::Unknown => f.write_str("unknown position"),
        }
    }
}

/// Errors that prevent a document from being created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    /// Source bytes do not decode into the expected structural skeleton.
    #[error("unparseable source at {position}: {message}")]
    UnparseableSource {
        position: SourcePosition,
        message: String,
    },

    /// The skeleton did not validate against the schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Identifier assignment failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ImportError {
    /// Create an unparseable-source error at `position`.
    pub fn unparseable(position: SourcePosition, message: impl Into<String>) -> Self {
        Self::UnparseableSource {
            position,
            message: message.into(),
        }
    }
}
