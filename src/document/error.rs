//! Validation errors for plan documents.

use thiserror::Error;

/// A document does not satisfy its schema. The document is discarded.
///
/// `node` is the offending node's id, or its position (e.g.
/// `sequence[2].sequence[0]`) when the node has no id yet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Input bytes are not a JSON document.
    #[error("malformed plan document: {0}")]
    Malformed(String),

    #[error("{node}: expected a JSON object")]
    NotAnObject { node: String },

    #[error("{node}: missing 'type'")]
    MissingType { node: String },

    #[error("{node}: unknown kind '{kind}'")]
    UnknownKind { node: String, kind: String },

    /// A known kind appears where it is not allowed (e.g. a Station inside a
    /// Station's command list).
    #[error("{node}: kind '{kind}' is not allowed in {container}")]
    UnexpectedKind {
        node: String,
        kind: String,
        container: String,
    },

    #[error("{node}: missing required parameter '{param}'")]
    MissingRequiredParameter { node: String, param: String },

    #[error("{node}: invalid value for '{param}': {message}")]
    InvalidParameter {
        node: String,
        param: String,
        message: String,
    },

    #[error("{node}: invalid geometry: {message}")]
    InvalidGeometry { node: String, message: String },

    #[error("duplicate identifier '{0}'")]
    DuplicateIdentifier(String),

    /// A library reference names an entity the library does not define.
    #[error("{node}: unknown {param} '{id}'")]
    UnresolvedReference {
        node: String,
        param: String,
        id: String,
    },
}

impl ValidationError {
    /// Create a missing-required-parameter error.
    pub fn missing(node: impl Into<String>, param: impl Into<String>) -> Self {
        Self::MissingRequiredParameter {
            node: node.into(),
            param: param.into(),
        }
    }

    /// Create an invalid-parameter error.
    pub fn invalid(
        node: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            node: node.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-geometry error.
    pub fn geometry(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            node: node.into(),
            message: message.into(),
        }
    }
}
