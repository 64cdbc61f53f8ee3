//! Errors raised while loading a plan schema or library.

use thiserror::Error;

/// Failure to parse or resolve a schema. Fatal at startup.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema bytes are not a well-formed schema document.
    #[error("schema parse error: {0}")]
    Parse(String),

    /// A kind names a parent that is not defined.
    #[error("kind '{kind}' inherits from unknown kind '{parent}'")]
    UnknownParentKind { kind: String, parent: String },

    /// A kind's inheritance chain loops back on itself.
    #[error("inheritance cycle through kind '{kind}'")]
    InheritanceCycle { kind: String },

    /// A parameter spec is malformed (bad value type, missing choices, ...).
    #[error("invalid parameter '{param}' on kind '{kind}': {message}")]
    InvalidParam {
        kind: String,
        param: String,
        message: String,
    },

    /// A default value does not match its parameter's value type.
    #[error("invalid default for '{kind}.{param}': {message}")]
    InvalidDefault {
        kind: String,
        param: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create an invalid-parameter error for `kind.param`.
    pub fn invalid_param(
        kind: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParam {
            kind: kind.into(),
            param: param.into(),
            message: message.into(),
        }
    }
}
