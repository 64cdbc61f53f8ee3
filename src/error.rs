//! Boundary error type.
//!
//! Every module keeps its own error enum; [`PlanError`] gathers them for
//! callers of the [`Planner`](crate::Planner) facade and classifies them into
//! the stable taxonomy reported across the library boundary.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::document::ValidationError;
use crate::export::ExportError;
use crate::import::ImportError;
use crate::registry::FormatError;
use crate::schema::SchemaError;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("import error: {0}")]
    Import(#[from] ImportError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),

    #[error("{0}")]
    Format(#[from] FormatError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Structured error for the caller's boundary (kind + message).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

impl PlanError {
    /// Stable taxonomy name of this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Schema(_) => "SchemaParseError",
            Self::Validation(_) => "ValidationError",
            Self::Import(ImportError::UnparseableSource { .. }) => "UnparseableSource",
            Self::Import(ImportError::Validation(_)) => "ValidationError",
            Self::Import(ImportError::Export(e)) | Self::Export(e) => export_kind(e),
            Self::Format(_) => "UnresolvedFormat",
            Self::Config(_) => "ConfigError",
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

fn export_kind(error: &ExportError) -> &'static str {
    match error {
        ExportError::MalformedSequence { .. } => "MalformedSequence",
        _ => "ExportError",
    }
}
