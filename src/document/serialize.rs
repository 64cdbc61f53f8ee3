//! Typed tree -> canonical JSON structure.

use serde_json::{Map, Value, json};

use super::node::{NodeRef, Plan};
use crate::schema::{line_to_geojson, point_to_geojson};

impl NodeRef<'_> {
    /// The node's own fields in canonical key order, without `sequence`.
    pub fn fields_json(&self) -> Map<String, Value> {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!(self.kind_name()));
        if let Some(id) = self.id() {
            obj.insert("id".to_string(), json!(id));
        }
        if let Some(name) = self.name() {
            obj.insert("name".to_string(), json!(name));
        }

        match *self {
            NodeRef::Plan(plan) => {
                if let Some(ref creator) = plan.creator {
                    obj.insert("creator".to_string(), json!(creator));
                }
                if let Some(ref platform) = plan.platform {
                    obj.insert("platform".to_string(), platform.to_json());
                }
                if let Some(ref site) = plan.site {
                    obj.insert("site".to_string(), site.to_json());
                }
            }
            NodeRef::Station(station) => {
                obj.insert("geometry".to_string(), point_to_geojson(station.geometry));
                if let Some(heading) = station.heading_degrees {
                    obj.insert("headingDegrees".to_string(), json!(heading));
                }
                if let Some(directional) = station.is_directional {
                    obj.insert("isDirectional".to_string(), json!(directional));
                }
            }
            NodeRef::Segment(segment) => {
                if let Some(ref geometry) = segment.geometry {
                    obj.insert("geometry".to_string(), line_to_geojson(geometry));
                }
            }
            NodeRef::Command(_) | NodeRef::Sequence(_) => {}
        }

        for (key, value) in self.params() {
            obj.insert(key.to_string(), value.to_json());
        }
        obj
    }

    /// Whether the canonical form carries a `sequence` list for this node.
    pub fn has_sequence(&self) -> bool {
        !matches!(self, NodeRef::Command(_))
    }

    /// The full subtree rooted at this node.
    pub fn to_json(&self) -> Value {
        let mut obj = self.fields_json();
        if self.has_sequence() {
            let children: Vec<Value> = self.children().iter().map(NodeRef::to_json).collect();
            obj.insert("sequence".to_string(), Value::Array(children));
        }
        Value::Object(obj)
    }
}

impl Plan {
    /// Canonical JSON structure of the whole document, defaults included.
    pub fn to_json(&self) -> Value {
        self.as_node().to_json()
    }
}
