//! # xplan
//!
//! Schema-driven plan documents (stations, segments, commands) and the codecs
//! that move them in and out of XPJSON, KML and statistics reports.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! planner   → Facade: schema + registry loaded once, shared read-only
//!   ↓
//! registry  → Format code / filename suffix → codec
//!   ↓
//! import    → KML LineString and blank-plan importers
//! export    → XPJSON, KML, Stats and ID-filling exporters
//!   ↓
//! walker    → Single-pass traversal with per-kind handler tables
//!   ↓
//! document  → Typed plan tree, validation, default filling
//!   ↓
//! schema    → Kinds, parameters, inheritance, library
//! ```

// ============================================================================
// MODULES (dependency order: schema → document → walker → export/import → registry → planner)
// ============================================================================

/// Schema: kinds, parameter specs, inheritance, sites and platforms
pub mod schema;

/// Document: typed plan tree, parse/validate, canonical JSON mapping
pub mod document;

/// Tree-walker: handler tables and traversal context
pub mod walker;

/// Exporters: XPJSON, KML, Stats, ID filling
pub mod export;

/// Importers: KML LineString, blank plans
pub mod import;

/// Format registry
pub mod registry;

/// Planner configuration
pub mod config;

/// Boundary error taxonomy
pub mod error;

/// Planner facade
pub mod planner;

// Re-export commonly needed items
pub use config::PlannerConfig;
pub use document::{Node, NodeKind, ParseOptions, Plan};
pub use error::{ErrorReport, PlanError};
pub use export::{FillIds, IdScheme, PlanExporter};
pub use import::{ImportMeta, PlanImporter};
pub use planner::{ExportOutput, Planner};
pub use registry::FormatRegistry;
pub use schema::{Schema, load_schema};
