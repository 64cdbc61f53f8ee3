//! Error types for plan exports.

use thiserror::Error;

/// Errors that abort an export. Output produced before the failure is discarded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    /// The node sequence breaks a transform's positional contract, e.g. a
    /// segment without a station immediately before it.
    #[error("{node}: malformed sequence: {reason}")]
    MalformedSequence { node: String, reason: String },

    /// A handler was dispatched a node of a kind it does not handle.
    #[error("{node}: unexpected {kind} node")]
    UnexpectedNode { node: String, kind: String },

    /// XML serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl ExportError {
    /// Create a malformed-sequence error for `node`.
    pub fn malformed(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSequence {
            node: node.into(),
            reason: reason.into(),
        }
    }

    /// Create an XML error.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    /// Create a JSON error.
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json(message.into())
    }
}
