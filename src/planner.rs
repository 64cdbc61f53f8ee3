//! Process-wide planner facade.
//!
//! Holds the schema, format registry and ID scheme loaded once at startup.
//! Nothing in a [`Planner`] changes after construction, so a single instance
//! can be shared (e.g. in an `Arc`) by concurrent imports and exports.

use serde_json::json;

use crate::config::PlannerConfig;
use crate::document::{ParseOptions, Plan};
use crate::error::PlanError;
use crate::export::{FillIds, IdScheme};
use crate::import::{BlankPlanImporter, ImportMeta, PlanImporter};
use crate::registry::FormatRegistry;
use crate::schema::{Library, ParamValue, Schema};

/// Bytes produced by an export, with how to label them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub format_code: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Planner {
    schema: Schema,
    registry: FormatRegistry,
    ids: FillIds,
}

impl Planner {
    pub fn new(schema: Schema, registry: FormatRegistry, ids: IdScheme) -> Self {
        Self {
            schema,
            registry,
            ids: FillIds::new(ids),
        }
    }

    /// Load the schema (and library) and build the registry.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, PlanError> {
        let mut schema = Schema::load_path(&config.schema_path)?;
        if let Some(ref path) = config.library_path {
            let bytes = std::fs::read(path).map_err(crate::schema::SchemaError::from)?;
            schema = schema.with_library(Library::load(&bytes)?);
        }
        let registry = FormatRegistry::from_config(config)?;
        tracing::info!(
            schema = %config.schema_path.display(),
            exporters = registry.exporters().len(),
            importers = registry.importers().len(),
            "planner ready"
        );
        Ok(Self::new(schema, registry, config.ids.clone()))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Parse a stored canonical document, filling schema defaults.
    pub fn parse(&self, input: &[u8]) -> Result<Plan, PlanError> {
        Ok(Plan::from_slice(input, &self.schema, ParseOptions::fill_defaults())?)
    }

    /// Export through the codec selected by format code or filename.
    pub fn export(
        &self,
        plan: &Plan,
        format_code: Option<&str>,
        filename: Option<&str>,
    ) -> Result<ExportOutput, PlanError> {
        let entry = self.registry.resolve_exporter(format_code, filename)?;
        let bytes = entry.codec.export(plan, &self.schema)?;
        tracing::info!(
            format = %entry.format_code,
            plan = plan.title(),
            bytes = bytes.len(),
            "exported plan"
        );
        Ok(ExportOutput {
            format_code: entry.format_code.clone(),
            content_type: entry.codec.content_type(),
            bytes,
        })
    }

    /// Create a plan from source bytes through the selected importer.
    pub fn import(
        &self,
        input: &[u8],
        meta: &ImportMeta,
        format_code: Option<&str>,
        filename: Option<&str>,
    ) -> Result<Plan, PlanError> {
        let entry = self.registry.resolve_importer(format_code, filename)?;
        Ok(entry.codec.import_with(input, meta, &self.schema, &self.ids)?)
    }

    /// An empty plan carrying only metadata.
    pub fn create_blank(&self, meta: &ImportMeta) -> Result<Plan, PlanError> {
        Ok(BlankPlanImporter.import_with(b"", meta, &self.schema, &self.ids)?)
    }

    /// Fill any identifiers missing after an edit.
    pub fn fill_ids(&self, plan: Plan) -> Result<Plan, PlanError> {
        Ok(self.ids.fill(plan)?)
    }

    /// Give a plan a new number ("save as"): the plan id and name are
    /// re-derived and missing node identifiers are filled.
    pub fn renumber(&self, mut plan: Plan, plan_number: i64) -> Result<Plan, PlanError> {
        let value = json!(plan_number);
        let number = self
            .schema
            .kind(&plan.kind)
            .and_then(|kind| kind.param("planNumber"))
            .and_then(|spec| ParamValue::coerce(&value, &spec.value_type).ok())
            .unwrap_or(ParamValue::Integer(plan_number));
        plan.params.insert("planNumber".into(), number);

        let renamed = plan.name.is_none() || plan.name == plan.id;
        plan.id = None;
        let mut plan = self.ids.fill(plan)?;
        if renamed {
            plan.name = plan.id.clone();
        }
        tracing::debug!(plan = plan.title(), "renumbered plan");
        Ok(plan)
    }
}
