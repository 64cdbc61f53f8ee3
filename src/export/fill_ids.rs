//! Deterministic identifier assignment.
//!
//! Not a serialization format: the walk computes an identifier for every node
//! that lacks one, and the assignments are then written back into the same
//! plan. Existing identifiers are never touched, so a second run is a no-op.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ExportError;
use crate::document::{NodeKind, NodeRef, Plan};
use crate::schema::ParamValue;
use crate::walker::{TransformSet, TraversalContext, walk};

/// How fabricated identifiers are spelled.
///
/// Nodes get `<prefix><ordinal>`, where the ordinal is the node's 1-based
/// position among nodes of its kind in traversal order (`STN1`, `SEG1`,
/// `STN2`, ...). The plan gets `<number:03><version>` from its `planNumber`
/// and `planVersion` parameters, or `plan_prefix` when those are missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct IdScheme {
    pub station_prefix: String,
    pub segment_prefix: String,
    pub command_prefix: String,
    pub sequence_prefix: String,
    pub plan_prefix: String,
}

impl Default for IdScheme {
    fn default() -> Self {
        Self {
            station_prefix: "STN".to_string(),
            segment_prefix: "SEG".to_string(),
            command_prefix: "CMD".to_string(),
            sequence_prefix: "SEQ".to_string(),
            plan_prefix: "PLAN".to_string(),
        }
    }
}

impl IdScheme {
    pub fn prefix(&self, kind: NodeKind) -> &str {
        match kind {
            NodeKind::Plan => &self.plan_prefix,
            NodeKind::Station => &self.station_prefix,
            NodeKind::Segment => &self.segment_prefix,
            NodeKind::Command => &self.command_prefix,
            NodeKind::Sequence => &self.sequence_prefix,
        }
    }

    /// Plan identifier from its number and version, e.g. `(7, "A")` -> `007A`.
    pub fn plan_id(&self, number: Option<i64>, version: Option<&str>) -> String {
        match number {
            Some(n) => format!("{n:03}{}", version.unwrap_or_default()),
            None => self.plan_prefix.clone(),
        }
    }
}

/// The identifier-filling pass.
#[derive(Debug, Clone, Default)]
pub struct FillIds {
    scheme: IdScheme,
}

struct Assigner<'a> {
    scheme: &'a IdScheme,
    taken: FxHashSet<String>,
}

impl FillIds {
    pub fn new(scheme: IdScheme) -> Self {
        Self { scheme }
    }

    /// Assign identifiers in place. Returns how many were assigned.
    pub fn apply(&self, plan: &mut Plan) -> Result<usize, ExportError> {
        let assignments = self.assignments(plan)?;
        if assignments.is_empty() {
            return Ok(0);
        }

        let mut position = 0;
        plan.visit_ids_mut(&mut |_, slot| {
            if let Some(id) = assignments.get(&position) {
                *slot = Some(id.clone());
            }
            position += 1;
        });

        tracing::debug!(assigned = assignments.len(), "filled missing identifiers");
        Ok(assignments.len())
    }

    /// Consume a plan and return it with every identifier populated.
    pub fn fill(&self, mut plan: Plan) -> Result<Plan, ExportError> {
        self.apply(&mut plan)?;
        Ok(plan)
    }

    /// Pre-order position -> identifier, for nodes that lack one.
    fn assignments(&self, plan: &Plan) -> Result<FxHashMap<usize, String>, ExportError> {
        let mut transforms = TransformSet::new();
        for kind in NodeKind::ALL {
            transforms = transforms.on(kind, assign_id);
        }
        let mut state = Assigner {
            scheme: &self.scheme,
            taken: plan.collect_ids(),
        };
        Ok(walk(plan, &transforms, &mut state)?
            .into_iter()
            .flatten()
            .collect())
    }
}

/// Fill identifiers with the default scheme.
pub fn fill_ids(plan: Plan) -> Result<Plan, ExportError> {
    FillIds::default().fill(plan)
}

fn assign_id(
    state: &mut Assigner<'_>,
    node: NodeRef<'_>,
    ctx: &TraversalContext<'_>,
) -> Result<Option<(usize, String)>, ExportError> {
    if node.id().is_some() {
        return Ok(None);
    }

    let candidate = match node {
        NodeRef::Plan(plan) => {
            let number = plan.params.get("planNumber").and_then(plan_number);
            let version = plan.params.get("planVersion").and_then(plan_version);
            state.scheme.plan_id(number, version.as_deref())
        }
        _ => format!("{}{}", state.scheme.prefix(node.node_kind()), ctx.ordinal),
    };

    let id = unique(candidate, &state.taken);
    tracing::trace!(kind = %node.node_kind(), id = %id, "assigned identifier");
    state.taken.insert(id.clone());
    Ok(Some((ctx.position, id)))
}

fn plan_number(value: &ParamValue) -> Option<i64> {
    match value.to_json() {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn plan_version(value: &ParamValue) -> Option<String> {
    match value.to_json() {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// `candidate`, or `candidate_<n>` with the smallest free `n`.
fn unique(candidate: String, taken: &FxHashSet<String>) -> String {
    if !taken.contains(&candidate) {
        return candidate;
    }
    let mut n = 1;
    loop {
        let id = format!("{candidate}_{n}");
        if !taken.contains(&id) {
            return id;
        }
        n += 1;
    }
}
