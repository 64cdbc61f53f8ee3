//! Canonical XPJSON exporter.
//!
//! Each node becomes one flat JSON object fragment tagged with its depth;
//! assembly nests fragments back into `sequence` lists. Values equal to the
//! schema default for the node's kind are left out, so re-parsing the output
//! with default filling restores them.

use serde_json::{Map, Value};

use super::{ExportError, PlanExporter};
use crate::document::{NodeKind, NodeRef, Plan};
use crate::schema::Schema;
use crate::walker::{TransformSet, TraversalContext, walk};

/// Canonical JSON plan format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xpjson;

struct Fragment {
    depth: usize,
    fields: Map<String, Value>,
}

struct Canonicalizer<'s> {
    schema: &'s Schema,
    elided: usize,
}

impl PlanExporter for Xpjson {
    fn label(&self) -> &'static str {
        "xpjson"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn export(&self, plan: &Plan, schema: &Schema) -> Result<Vec<u8>, ExportError> {
        let value = self.to_value(plan, schema)?;
        serde_json::to_vec_pretty(&value).map_err(|e| ExportError::json(e.to_string()))
    }
}

impl Xpjson {
    /// Canonical JSON structure, before serialization to bytes.
    pub fn to_value(&self, plan: &Plan, schema: &Schema) -> Result<Value, ExportError> {
        let mut transforms = TransformSet::new();
        for kind in NodeKind::ALL {
            transforms = transforms.on(kind, canonical_fragment);
        }

        let mut state = Canonicalizer { schema, elided: 0 };
        let fragments = walk(plan, &transforms, &mut state)?;
        tracing::debug!(
            plan = plan.title(),
            nodes = fragments.len(),
            defaults_elided = state.elided,
            "exported xpjson"
        );
        assemble(fragments)
    }
}

fn canonical_fragment(
    state: &mut Canonicalizer<'_>,
    node: NodeRef<'_>,
    ctx: &TraversalContext<'_>,
) -> Result<Fragment, ExportError> {
    let mut fields = node.fields_json();

    if let Some(kind) = state.schema.kind(node.kind_name()) {
        for spec in kind.iter_params() {
            let Some(ref default) = spec.default else {
                continue;
            };
            if fields.get(spec.id.as_str()) == Some(&default.to_json()) {
                fields.remove(spec.id.as_str());
                state.elided += 1;
            }
        }
    }

    if node.has_sequence() {
        fields.insert("sequence".to_string(), Value::Array(Vec::new()));
    }
    Ok(Fragment {
        depth: ctx.depth,
        fields,
    })
}

/// Rebuild the tree from depth-tagged fragments in pre-order.
fn assemble(fragments: Vec<Fragment>) -> Result<Value, ExportError> {
    let mut stack: Vec<Fragment> = Vec::new();
    for fragment in fragments {
        while stack.last().is_some_and(|top| top.depth >= fragment.depth) {
            close(&mut stack)?;
        }
        stack.push(fragment);
    }
    while stack.len() > 1 {
        close(&mut stack)?;
    }
    stack
        .pop()
        .map(|root| Value::Object(root.fields))
        .ok_or_else(|| ExportError::json("no plan fragment produced"))
}

fn close(stack: &mut Vec<Fragment>) -> Result<(), ExportError> {
    let Some(child) = stack.pop() else {
        return Ok(());
    };
    let parent = stack
        .last_mut()
        .ok_or_else(|| ExportError::json("fragment has no parent"))?;
    match parent.fields.get_mut("sequence") {
        Some(Value::Array(children)) => {
            children.push(Value::Object(child.fields));
            Ok(())
        }
        _ => Err(ExportError::json("parent fragment cannot hold children")),
    }
}
