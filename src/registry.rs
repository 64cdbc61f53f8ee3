//! Format registry: format codes and filename suffixes -> codecs.
//!
//! Built once from a static list of `(format code, extension, implementation)`
//! entries and read-only afterwards. Resolution:
//!
//! 1. An explicit format code wins. An unknown code is an error; the filename
//!    is not consulted.
//! 2. Otherwise the registered extension that is the longest suffix of the
//!    filename wins (`-stats.json` beats `.json`); ties go to the entry
//!    registered first.
//! 3. Otherwise the format is unresolved.

use thiserror::Error;

use crate::config::{CodecEntry, ExporterImpl, ImporterImpl, PlannerConfig};
use crate::export::{PlanExporter, Stats, Xpjson};
use crate::import::{BlankPlanImporter, PlanImporter};

#[cfg(feature = "kml")]
use crate::export::Kml;
#[cfg(feature = "kml")]
use crate::import::KmlLineString;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// No codec matches the requested format code or filename.
    #[error("could not resolve {direction} format: {message}")]
    UnresolvedFormat {
        direction: &'static str,
        message: String,
    },

    /// The configured implementation is not compiled into this build.
    #[error("{0} support requires the '{1}' feature")]
    Unsupported(&'static str, &'static str),
}

impl FormatError {
    fn unresolved(direction: &'static str, message: impl Into<String>) -> Self {
        Self::UnresolvedFormat {
            direction,
            message: message.into(),
        }
    }
}

/// A registered codec.
pub struct Registration<T: ?Sized + 'static> {
    pub format_code: String,
    pub extension: String,
    pub codec: &'static T,
}

impl<T: ?Sized + 'static> Clone for Registration<T> {
    fn clone(&self) -> Self {
        Self {
            format_code: self.format_code.clone(),
            extension: self.extension.clone(),
            codec: self.codec,
        }
    }
}

impl<T: ?Sized + 'static> std::fmt::Debug for Registration<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("format_code", &self.format_code)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

pub type ExporterRegistration = Registration<dyn PlanExporter>;
pub type ImporterRegistration = Registration<dyn PlanImporter>;

#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    exporters: Vec<ExporterRegistration>,
    importers: Vec<ImporterRegistration>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for the configured exporter and importer lists.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, FormatError> {
        let mut registry = Self::new();
        for CodecEntry {
            format_code,
            extension,
            implementation,
        } in &config.exporters
        {
            registry = registry.with_exporter(format_code, extension, exporter_codec(*implementation)?);
        }
        for CodecEntry {
            format_code,
            extension,
            implementation,
        } in &config.importers
        {
            registry = registry.with_importer(format_code, extension, importer_codec(*implementation)?);
        }
        tracing::debug!(
            exporters = registry.exporters.len(),
            importers = registry.importers.len(),
            "built format registry"
        );
        Ok(registry)
    }

    pub fn with_exporter(
        mut self,
        format_code: impl Into<String>,
        extension: impl Into<String>,
        exporter: &'static dyn PlanExporter,
    ) -> Self {
        self.exporters.push(Registration {
            format_code: format_code.into(),
            extension: extension.into(),
            codec: exporter,
        });
        self
    }

    pub fn with_importer(
        mut self,
        format_code: impl Into<String>,
        extension: impl Into<String>,
        importer: &'static dyn PlanImporter,
    ) -> Self {
        self.importers.push(Registration {
            format_code: format_code.into(),
            extension: extension.into(),
            codec: importer,
        });
        self
    }

    pub fn exporters(&self) -> &[ExporterRegistration] {
        &self.exporters
    }

    pub fn importers(&self) -> &[ImporterRegistration] {
        &self.importers
    }

    pub fn resolve_exporter(
        &self,
        format_code: Option<&str>,
        filename: Option<&str>,
    ) -> Result<&ExporterRegistration, FormatError> {
        resolve(&self.exporters, "export", format_code, filename)
    }

    pub fn resolve_importer(
        &self,
        format_code: Option<&str>,
        filename: Option<&str>,
    ) -> Result<&ImporterRegistration, FormatError> {
        resolve(&self.importers, "import", format_code, filename)
    }
}

fn resolve<'r, T: ?Sized + 'static>(
    entries: &'r [Registration<T>],
    direction: &'static str,
    format_code: Option<&str>,
    filename: Option<&str>,
) -> Result<&'r Registration<T>, FormatError> {
    if let Some(code) = format_code.filter(|c| !c.is_empty()) {
        return entries
            .iter()
            .find(|e| e.format_code == code)
            .ok_or_else(|| FormatError::unresolved(direction, format!("unknown format '{code}'")));
    }

    let Some(filename) = filename.filter(|f| !f.is_empty()) else {
        return Err(FormatError::unresolved(
            direction,
            "no format code or filename given",
        ));
    };
    let lowered = filename.to_ascii_lowercase();

    let mut best: Option<&Registration<T>> = None;
    for entry in entries {
        if !lowered.ends_with(&entry.extension.to_ascii_lowercase()) {
            continue;
        }
        if best.is_none_or(|b| entry.extension.len() > b.extension.len()) {
            best = Some(entry);
        }
    }
    best.ok_or_else(|| {
        FormatError::unresolved(
            direction,
            format!("extension not recognized for filename '{filename}'"),
        )
    })
}

fn exporter_codec(implementation: ExporterImpl) -> Result<&'static dyn PlanExporter, FormatError> {
    match implementation {
        ExporterImpl::Xpjson => Ok(&Xpjson),
        ExporterImpl::Stats => Ok(&Stats),
        #[cfg(feature = "kml")]
        ExporterImpl::Kml => Ok(&Kml),
        #[cfg(not(feature = "kml"))]
        ExporterImpl::Kml => Err(FormatError::Unsupported("KML export", "kml")),
    }
}

fn importer_codec(implementation: ImporterImpl) -> Result<&'static dyn PlanImporter, FormatError> {
    match implementation {
        ImporterImpl::Blank => Ok(&BlankPlanImporter),
        #[cfg(feature = "kml")]
        ImporterImpl::KmlLineString => Ok(&KmlLineString),
        #[cfg(not(feature = "kml"))]
        ImporterImpl::KmlLineString => Err(FormatError::Unsupported("KML import", "kml")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "kml")]
    fn test_longest_suffix_wins() {
        let registry = FormatRegistry::from_config(&PlannerConfig::default()).expect("registry");
        let entry = registry
            .resolve_exporter(None, Some("plan-stats.json"))
            .expect("resolve");
        assert_eq!(entry.format_code, "stats");
        assert_eq!(entry.codec.label(), "stats");
    }

    #[test]
    fn test_equal_suffixes_prefer_first_registered() {
        let registry = FormatRegistry::new()
            .with_exporter("first", ".json", &Xpjson)
            .with_exporter("second", ".json", &Stats);
        let entry = registry.resolve_exporter(None, Some("a.json")).expect("resolve");
        assert_eq!(entry.format_code, "first");
    }

    #[test]
    #[cfg(feature = "kml")]
    fn test_unknown_code_does_not_fall_back_to_filename() {
        let registry = FormatRegistry::from_config(&PlannerConfig::default()).expect("registry");
        let err = registry
            .resolve_exporter(Some("pdf"), Some("plan.json"))
            .unwrap_err();
        assert!(matches!(err, FormatError::UnresolvedFormat { direction: "export", .. }));
    }

    #[test]
    fn test_nothing_given_is_unresolved() {
        let registry = FormatRegistry::new();
        assert!(registry.resolve_importer(None, None).is_err());
    }

    #[test]
    #[cfg(feature = "kml")]
    fn test_suffix_match_ignores_case() {
        let registry = FormatRegistry::from_config(&PlannerConfig::default()).expect("registry");
        let entry = registry.resolve_importer(None, Some("TRAVERSE.KML")).expect("resolve");
        assert_eq!(entry.codec.label(), "KML LineString");
    }
}
