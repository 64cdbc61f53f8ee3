//! Plan importers.
//!
//! An importer only extracts a structural skeleton from its source format and
//! merges it with caller metadata. The shared tail of every import is fixed:
//!
//! ```text
//! bytes ──skeleton──▶ raw JSON ──parse(fill defaults)──▶ Plan ──FillIds──▶ Plan
//! ```

mod blank;
mod error;
#[cfg(feature = "kml")]
mod kml;

pub use blank::BlankPlanImporter;
pub use error::{ImportError, SourcePosition};
#[cfg(feature = "kml")]
pub use kml::{KmlLineString, parse_coordinates};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::document::{ParseOptions, Plan};
use crate::export::FillIds;
use crate::schema::{Schema, kinds};

/// Caller-supplied plan metadata merged into every imported plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportMeta {
    pub name: Option<String>,
    pub creator: Option<String>,
    pub plan_number: Option<i64>,
    pub plan_version: Option<String>,
    /// Platform id from the schema library.
    pub platform: Option<String>,
    /// Site id from the schema library; embedded by value when found there.
    pub site: Option<String>,
}

impl ImportMeta {
    /// Raw plan object carrying this metadata and an empty sequence.
    pub fn raw_plan(&self, schema: &Schema) -> Map<String, Value> {
        let mut plan = Map::new();
        plan.insert("type".to_string(), json!(kinds::PLAN));
        plan.insert("xpjson".to_string(), json!("0.1"));
        if let Some(ref name) = self.name {
            plan.insert("name".to_string(), json!(name));
        }
        if let Some(ref creator) = self.creator {
            plan.insert("creator".to_string(), json!(creator));
        }
        if let Some(number) = self.plan_number {
            plan.insert("planNumber".to_string(), json!(number));
        }
        if let Some(ref version) = self.plan_version {
            plan.insert("planVersion".to_string(), json!(version));
        }
        if let Some(ref platform) = self.platform {
            plan.insert("platform".to_string(), json!(platform));
        }
        if let Some(ref site) = self.site {
            let site = match schema.library().denormalize_site(site) {
                Some(entity) => Value::Object(entity),
                None => json!(site),
            };
            plan.insert("site".to_string(), site);
        }
        plan.insert("sequence".to_string(), Value::Array(Vec::new()));
        plan
    }
}

/// A source format plans can be created from.
pub trait PlanImporter: Send + Sync {
    /// Short human-readable name, e.g. `"KML LineString"`.
    fn label(&self) -> &'static str;

    /// Decode `input` into a raw plan structure merged with `meta`.
    fn skeleton(
        &self,
        input: &[u8],
        meta: &ImportMeta,
        schema: &Schema,
    ) -> Result<Map<String, Value>, ImportError>;

    /// Build a validated plan with every identifier assigned.
    fn import_from_buffer(
        &self,
        input: &[u8],
        meta: &ImportMeta,
        schema: &Schema,
    ) -> Result<Plan, ImportError> {
        self.import_with(input, meta, schema, &FillIds::default())
    }

    /// [`import_from_buffer`](Self::import_from_buffer) with an explicit ID scheme.
    fn import_with(
        &self,
        input: &[u8],
        meta: &ImportMeta,
        schema: &Schema,
        ids: &FillIds,
    ) -> Result<Plan, ImportError> {
        let raw = self.skeleton(input, meta, schema)?;
        let plan = Plan::parse(Value::Object(raw), schema, ParseOptions::fill_defaults())?;
        let mut plan = ids.fill(plan)?;
        if plan.name.as_deref().is_none_or(str::is_empty) {
            plan.name = plan.id.clone();
        }

        tracing::info!(
            importer = self.label(),
            plan = plan.title(),
            nodes = plan.iter_nodes().len(),
            "imported plan"
        );
        Ok(plan)
    }
}
