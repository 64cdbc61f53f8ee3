//! Planner configuration.
//!
//! Read once at startup from a JSON file:
//!
//! ```text
//! {
//!   "schema_path": "plan-schema.json",
//!   "library_path": "plan-library.json",
//!   "exporters": [ {"format_code": "kml", "extension": ".kml", "implementation": "kml"} ],
//!   "importers": [ {"format_code": "kml", "extension": ".kml", "implementation": "kml_line_string"} ],
//!   "ids": { "station_prefix": "STN" }
//! }
//! ```
//!
//! Every key is optional; omitted keys take the stock values from
//! [`PlannerConfig::default`]. Relative paths are resolved against the
//! directory of the config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::IdScheme;

/// Compiled-in exporter implementations a config can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExporterImpl {
    Xpjson,
    Kml,
    Stats,
}

/// Compiled-in importer implementations a config can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImporterImpl {
    KmlLineString,
    Blank,
}

/// One `(format code, extension, implementation)` registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecEntry<I> {
    pub format_code: String,
    /// Filename suffix, e.g. `.kml` or `-stats.json`.
    pub extension: String,
    pub implementation: I,
}

impl<I> CodecEntry<I> {
    pub fn new(format_code: impl Into<String>, extension: impl Into<String>, implementation: I) -> Self {
        Self {
            format_code: format_code.into(),
            extension: extension.into(),
            implementation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub schema_path: PathBuf,
    /// Library file replacing the schema's embedded library. Unset by default.
    pub library_path: Option<PathBuf>,
    pub exporters: Vec<CodecEntry<ExporterImpl>>,
    pub importers: Vec<CodecEntry<ImporterImpl>>,
    pub ids: IdScheme,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from("plan-schema.json"),
            library_path: None,
            exporters: vec![
                CodecEntry::new("xpjson", ".json", ExporterImpl::Xpjson),
                CodecEntry::new("kml", ".kml", ExporterImpl::Kml),
                CodecEntry::new("stats", "-stats.json", ExporterImpl::Stats),
            ],
            importers: vec![CodecEntry::new("kml", ".kml", ImporterImpl::KmlLineString)],
            ids: IdScheme::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(String),
}

impl PlannerConfig {
    /// Parse a config document. Paths are left as written.
    pub fn from_slice(input: &[u8]) -> Result<Self, ConfigError> {
        serde_json::from_slice(input).map_err(|e| {
            ConfigError::Parse(format!("line {} column {}: {e}", e.line(), e.column()))
        })
    }

    /// Read a config file and resolve its relative paths against its directory.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_slice(&bytes)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        tracing::debug!(path = %path.display(), "loaded planner config");
        Ok(config.relative_to(base))
    }

    /// Anchor relative schema and library paths at `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        if self.schema_path.is_relative() {
            self.schema_path = base.join(&self.schema_path);
        }
        if let Some(ref mut library) = self.library_path {
            if library.is_relative() {
                *library = base.join(&*library);
            }
        }
        self
    }
}
