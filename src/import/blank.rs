//! Empty plan from metadata alone.

use serde_json::{Map, Value};

use super::{ImportError, ImportMeta, PlanImporter};
use crate::schema::Schema;

/// Creates a plan with no stations; the input buffer is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankPlanImporter;

impl PlanImporter for BlankPlanImporter {
    fn label(&self) -> &'static str {
        "Blank"
    }

    fn skeleton(
        &self,
        _input: &[u8],
        meta: &ImportMeta,
        schema: &Schema,
    ) -> Result<Map<String, Value>, ImportError> {
        Ok(meta.raw_plan(schema))
    }
}
