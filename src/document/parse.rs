//! Raw structure -> validated [`Plan`].
//!
//! Validation runs node by node in traversal order (plan first, then each
//! child depth-first). With `fill_in_defaults` set, every omitted parameter
//! that has a schema default is materialized into the raw object before the
//! required-parameter check runs.

use rustc_hash::FxHashSet;
use serde_json::{Map, Value};

use super::ValidationError;
use super::node::{
    Command, LibraryRef, Node, ParamMap, Plan, Segment, Sequence, Station,
};
use crate::schema::{
    KindDefinition, ParamValue, Schema, ValueType, kinds, line_from_geojson, point_from_geojson,
};

/// Options for [`Plan::parse`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Populate omitted parameters from schema defaults before validating.
    pub fill_in_defaults: bool,
}

impl ParseOptions {
    pub fn fill_defaults() -> Self {
        Self {
            fill_in_defaults: true,
        }
    }
}

impl Plan {
    /// Validate a raw plan structure against `schema` and build the typed tree.
    pub fn parse(raw: Value, schema: &Schema, options: ParseOptions) -> Result<Plan, ValidationError> {
        let mut parser = DocumentParser::new(schema, options);
        let plan = parser.plan(raw)?;
        tracing::debug!(
            plan = plan.id.as_deref().unwrap_or("<unnamed>"),
            nodes = parser.nodes,
            defaults_filled = parser.defaults_filled,
            "parsed plan document"
        );
        Ok(plan)
    }

    /// Parse canonical JSON bytes. See [`Plan::parse`].
    pub fn from_slice(
        input: &[u8],
        schema: &Schema,
        options: ParseOptions,
    ) -> Result<Plan, ValidationError> {
        let raw: Value = serde_json::from_slice(input).map_err(|e| {
            ValidationError::Malformed(format!("line {} column {}: {e}", e.line(), e.column()))
        })?;
        Self::parse(raw, schema, options)
    }
}

/// Free-function form of [`Plan::parse`].
pub fn parse_document(
    raw: Value,
    schema: &Schema,
    options: ParseOptions,
) -> Result<Plan, ValidationError> {
    Plan::parse(raw, schema, options)
}

/// Which node variants a child list accepts.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Container<'p> {
    /// Plan or Sequence body: any node.
    Sequence,
    /// Station or Segment body: commands only.
    Commands { owner: &'p str },
}

/// Variant a schema kind maps onto.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Variant {
    Station,
    Segment,
    Command,
    Sequence,
}

struct DocumentParser<'s> {
    schema: &'s Schema,
    options: ParseOptions,
    seen_ids: FxHashSet<String>,
    nodes: usize,
    defaults_filled: usize,
}

impl<'s> DocumentParser<'s> {
    fn new(schema: &'s Schema, options: ParseOptions) -> Self {
        Self {
            schema,
            options,
            seen_ids: FxHashSet::default(),
            nodes: 0,
            defaults_filled: 0,
        }
    }

    fn plan(&mut self, raw: Value) -> Result<Plan, ValidationError> {
        let mut obj = into_object(raw, "plan")?;
        let kind_name = match obj.get("type") {
            None | Some(Value::Null) => kinds::PLAN.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(ValidationError::invalid(
                    "plan",
                    "type",
                    format!("expected a string, got {other}"),
                ));
            }
        };
        let kind = self.kind("plan", &kind_name)?;
        if !kind.is_a(kinds::PLAN) {
            return Err(ValidationError::UnexpectedKind {
                node: "plan".to_string(),
                kind: kind_name,
                container: "the document root".to_string(),
            });
        }

        let (id, label) = self.prepare(&mut obj, kind, "plan")?;
        let name = take_string(&mut obj, "name", &label)?;
        let creator = take_string(&mut obj, "creator", &label)?;
        let platform = self.take_library_ref(&mut obj, "platform", &label)?;
        let site = self.take_library_ref(&mut obj, "site", &label)?;
        let children = take_sequence(&mut obj, &label)?;
        let params = self.params(obj, kind, &label)?;
        let sequence = self.children(children, &label, Container::Sequence)?;

        Ok(Plan {
            kind: kind.name.clone(),
            id,
            name,
            creator,
            platform,
            site,
            params,
            sequence,
        })
    }

    fn node(
        &mut self,
        raw: Value,
        path: &str,
        container: Container<'_>,
    ) -> Result<Node, ValidationError> {
        let mut obj = into_object(raw, path)?;
        let provisional = obj
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .unwrap_or(path)
            .to_string();

        let kind_name = match obj.get("type") {
            Some(Value::String(s)) => s.clone(),
            _ => return Err(ValidationError::MissingType { node: provisional }),
        };
        let kind = self.kind(&provisional, &kind_name)?;
        let Some(variant) = self.classify(kind) else {
            return Err(ValidationError::UnexpectedKind {
                node: provisional,
                kind: kind_name,
                container: "a sequence".to_string(),
            });
        };
        if let Container::Commands { owner } = container {
            if variant != Variant::Command {
                return Err(ValidationError::UnexpectedKind {
                    node: provisional,
                    kind: kind_name,
                    container: format!("the command list of {owner}"),
                });
            }
        }

        let (id, label) = self.prepare(&mut obj, kind, path)?;
        let name = take_string(&mut obj, "name", &label)?;
        self.nodes += 1;

        let node = match variant {
            Variant::Station => {
                let geometry = match obj.remove("geometry") {
                    None | Some(Value::Null) => {
                        return Err(ValidationError::missing(&label, "geometry"));
                    }
                    Some(value) => point_from_geojson(&value)
                        .map_err(|message| ValidationError::geometry(&label, message))?,
                };
                let heading_degrees = take_number(&mut obj, "headingDegrees", &label)?;
                let is_directional = take_bool(&mut obj, "isDirectional", &label)?;
                let children = take_sequence(&mut obj, &label)?;
                let params = self.params(obj, kind, &label)?;
                let sequence = self.commands(children, &label)?;
                Node::Station(Station {
                    kind: kind.name.clone(),
                    id,
                    name,
                    geometry,
                    heading_degrees,
                    is_directional,
                    params,
                    sequence,
                })
            }
            Variant::Segment => {
                let geometry = match obj.remove("geometry") {
                    None | Some(Value::Null) => None,
                    Some(value) => Some(
                        line_from_geojson(&value)
                            .map_err(|message| ValidationError::geometry(&label, message))?,
                    ),
                };
                let children = take_sequence(&mut obj, &label)?;
                let params = self.params(obj, kind, &label)?;
                let sequence = self.commands(children, &label)?;
                Node::Segment(Segment {
                    kind: kind.name.clone(),
                    id,
                    name,
                    geometry,
                    params,
                    sequence,
                })
            }
            Variant::Command => {
                if obj.get("sequence").is_some_and(|s| !s.is_null()) {
                    return Err(ValidationError::invalid(
                        &label,
                        "sequence",
                        "commands cannot have children",
                    ));
                }
                obj.remove("sequence");
                let params = self.params(obj, kind, &label)?;
                Node::Command(Command {
                    kind: kind.name.clone(),
                    id,
                    name,
                    params,
                })
            }
            Variant::Sequence => {
                let children = take_sequence(&mut obj, &label)?;
                let params = self.params(obj, kind, &label)?;
                let sequence = self.children(children, &label, Container::Sequence)?;
                Node::Sequence(Sequence {
                    kind: kind.name.clone(),
                    id,
                    name,
                    params,
                    sequence,
                })
            }
        };
        Ok(node)
    }

    fn children(
        &mut self,
        raw: Vec<Value>,
        parent: &str,
        container: Container<'_>,
    ) -> Result<Vec<Node>, ValidationError> {
        raw.into_iter()
            .enumerate()
            .map(|(i, child)| self.node(child, &format!("{parent}.sequence[{i}]"), container))
            .collect()
    }

    fn commands(&mut self, raw: Vec<Value>, owner: &str) -> Result<Vec<Command>, ValidationError> {
        let nodes = self.children(raw, owner, Container::Commands { owner })?;
        into_commands(nodes, owner)
    }

    fn kind(&self, node: &str, name: &str) -> Result<&'s KindDefinition, ValidationError> {
        self.schema
            .kind(name)
            .ok_or_else(|| ValidationError::UnknownKind {
                node: node.to_string(),
                kind: name.to_string(),
            })
    }

    fn classify(&self, kind: &KindDefinition) -> Option<Variant> {
        if kind.is_a(kinds::STATION) {
            Some(Variant::Station)
        } else if kind.is_a(kinds::SEGMENT) {
            Some(Variant::Segment)
        } else if kind.is_a(kinds::SEQUENCE) {
            Some(Variant::Sequence)
        } else if kind.is_a(kinds::COMMAND) {
            Some(Variant::Command)
        } else {
            None
        }
    }

    /// Take the id, fill defaults, check required parameters and id uniqueness.
    ///
    /// Returns the id and the label used in error messages from here on.
    fn prepare(
        &mut self,
        obj: &mut Map<String, Value>,
        kind: &KindDefinition,
        path: &str,
    ) -> Result<(Option<String>, String), ValidationError> {
        let id = match obj.remove("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                return Err(ValidationError::invalid(
                    path,
                    "id",
                    format!("expected a string, got {other}"),
                ));
            }
        };
        let label = id.clone().unwrap_or_else(|| path.to_string());

        if self.options.fill_in_defaults {
            for spec in kind.iter_params() {
                let Some(ref default) = spec.default else {
                    continue;
                };
                if is_absent(obj.get(spec.id.as_str())) {
                    obj.insert(spec.id.to_string(), default.to_json());
                    self.defaults_filled += 1;
                }
            }
        }

        for spec in kind.iter_params() {
            if spec.required && is_absent(obj.get(spec.id.as_str())) {
                return Err(ValidationError::missing(&label, spec.id.as_str()));
            }
        }

        if let Some(ref id) = id {
            if !self.seen_ids.insert(id.clone()) {
                return Err(ValidationError::DuplicateIdentifier(id.clone()));
            }
        }

        Ok((id, label))
    }

    /// Everything left in `obj` after typed fields were taken.
    fn params(
        &self,
        obj: Map<String, Value>,
        kind: &KindDefinition,
        label: &str,
    ) -> Result<ParamMap, ValidationError> {
        let mut params = ParamMap::new();
        for (key, value) in obj {
            if key == "type" || value.is_null() {
                continue;
            }
            let param = match kind.param(&key) {
                Some(spec) => {
                    let param = ParamValue::coerce(&value, &spec.value_type)
                        .map_err(|message| ValidationError::invalid(label, &key, message))?;
                    self.check_nested_kind(&param, &spec.value_type, label, &key)?;
                    param
                }
                None => ParamValue::Raw(value),
            };
            params.insert(key.into(), param);
        }
        Ok(params)
    }

    fn check_nested_kind(
        &self,
        value: &ParamValue,
        value_type: &ValueType,
        label: &str,
        key: &str,
    ) -> Result<(), ValidationError> {
        let expected = match value_type {
            ValueType::Kind(k) | ValueType::List(k) => k.as_str(),
            _ => return Ok(()),
        };
        let objects: Vec<&Map<String, Value>> = match value {
            ParamValue::Object(obj) => vec![obj],
            ParamValue::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    ParamValue::Object(obj) => Some(obj),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        for obj in objects {
            if let Some(actual) = obj.get("type").and_then(Value::as_str) {
                if !self.schema.is_a(actual, expected) {
                    return Err(ValidationError::invalid(
                        label,
                        key,
                        format!("'{actual}' is not a {expected}"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn take_library_ref(
        &self,
        obj: &mut Map<String, Value>,
        key: &str,
        label: &str,
    ) -> Result<Option<LibraryRef>, ValidationError> {
        let reference = match obj.remove(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(id)) if id.is_empty() => return Ok(None),
            Some(Value::String(id)) => LibraryRef::Id(id),
            Some(Value::Object(entity)) => LibraryRef::Embedded(entity),
            Some(other) => {
                return Err(ValidationError::invalid(
                    label,
                    key,
                    format!("expected an id or an entity object, got {other}"),
                ));
            }
        };

        if let LibraryRef::Id(ref id) = reference {
            let library = self.schema.library();
            let found = match key {
                "site" => library.site(id).is_some(),
                _ => library.platform(id).is_some(),
            };
            if !found {
                return Err(ValidationError::UnresolvedReference {
                    node: label.to_string(),
                    param: key.to_string(),
                    id: id.clone(),
                });
            }
        }
        Ok(Some(reference))
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_null)
}

fn into_object(raw: Value, label: &str) -> Result<Map<String, Value>, ValidationError> {
    match raw {
        Value::Object(obj) => Ok(obj),
        _ => Err(ValidationError::NotAnObject {
            node: label.to_string(),
        }),
    }
}

fn take_string(
    obj: &mut Map<String, Value>,
    key: &str,
    label: &str,
) -> Result<Option<String>, ValidationError> {
    match obj.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(ValidationError::invalid(
            label,
            key,
            format!("expected a string, got {other}"),
        )),
    }
}

fn take_number(
    obj: &mut Map<String, Value>,
    key: &str,
    label: &str,
) -> Result<Option<f64>, ValidationError> {
    match obj.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            ValidationError::invalid(label, key, format!("expected a number, got {value}"))
        }),
    }
}

fn take_bool(
    obj: &mut Map<String, Value>,
    key: &str,
    label: &str,
) -> Result<Option<bool>, ValidationError> {
    match obj.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(other) => Err(ValidationError::invalid(
            label,
            key,
            format!("expected a boolean, got {other}"),
        )),
    }
}

fn take_sequence(obj: &mut Map<String, Value>, label: &str) -> Result<Vec<Value>, ValidationError> {
    match obj.remove("sequence") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ValidationError::invalid(
            label,
            "sequence",
            format!("expected a list, got {other}"),
        )),
    }
}

/// Unwrap parsed children of a command list, rejecting any non-command.
fn into_commands(nodes: Vec<Node>, owner: &str) -> Result<Vec<Command>, ValidationError> {
    nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| match node {
            Node::Command(command) => Ok(command),
            other => Err(ValidationError::UnexpectedKind {
                node: other
                    .id()
                    .map_or_else(|| format!("{owner}.sequence[{i}]"), str::to_string),
                kind: other.node_kind().to_string(),
                container: format!("the command list of {owner}"),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::load(
            br#"{
            "kinds": {
                "Plan": {"params": [
                    {"id": "defaultSpeed", "valueType": "number", "default": 0.5}
                ]},
                "PathElement": {"params": [
                    {"id": "notes", "valueType": "string", "required": false}
                ]},
                "Station": {"parent": "PathElement", "params": [
                    {"id": "tolerance", "valueType": "number", "default": 1},
                    {"id": "headingDegrees", "valueType": "number", "required": false}
                ]},
                "Segment": {"parent": "PathElement", "params": [
                    {"id": "hintedSpeed", "valueType": "number", "default": 1}
                ]},
                "Sequence": {},
                "Command": {"params": [
                    {"id": "duration", "valueType": "integer"}
                ]},
                "TakePicture": {"parent": "Command", "params": [
                    {"id": "duration", "valueType": "integer", "default": 5},
                    {"id": "mode", "valueType": "enum", "choices": ["wide", "zoom"], "default": "wide"}
                ]},
                "Site": {}
            },
            "sites": [{"id": "ARC", "name": "Ames"}],
            "platforms": [{"id": "R", "name": "Rover"}]
        }"#,
        )
        .expect("schema")
    }

    fn point(lon: f64, lat: f64) -> Value {
        json!({"type": "Point", "coordinates": [lon, lat]})
    }

    #[test]
    fn test_parse_fills_defaults() {
        let raw = json!({
            "type": "Plan",
            "id": "P",
            "platform": "R",
            "sequence": [
                {"type": "Station", "geometry": point(1.0, 2.0)},
                {"type": "Segment"},
                {"type": "Station", "geometry": point(1.5, 2.5), "tolerance": 3}
            ]
        });
        let plan = Plan::parse(raw, &schema(), ParseOptions::fill_defaults()).expect("parse");

        assert_eq!(plan.params.get("defaultSpeed"), Some(&ParamValue::Number(0.5)));
        let Node::Station(ref first) = plan.sequence[0] else {
            panic!("expected station");
        };
        assert_eq!(first.params.get("tolerance"), Some(&ParamValue::Number(1.0)));
        let Node::Station(ref last) = plan.sequence[2] else {
            panic!("expected station");
        };
        assert_eq!(last.params.get("tolerance"), Some(&ParamValue::Number(3.0)));
        let Node::Segment(ref segment) = plan.sequence[1] else {
            panic!("expected segment");
        };
        assert_eq!(segment.params.get("hintedSpeed"), Some(&ParamValue::Number(1.0)));
        assert_eq!(plan.platform, Some(LibraryRef::Id("R".into())));
    }

    #[test]
    fn test_parse_without_defaults_leaves_params_out() {
        let raw = json!({"type": "Plan", "sequence": [
            {"type": "Station", "geometry": point(1.0, 2.0)}
        ]});
        let plan = Plan::parse(raw, &schema(), ParseOptions::default()).expect("parse");
        let Node::Station(ref station) = plan.sequence[0] else {
            panic!("expected station");
        };
        assert!(station.params.get("tolerance").is_none());
    }

    #[test]
    fn test_subkind_becomes_command_with_inherited_defaults() {
        let raw = json!({"type": "Plan", "sequence": [
            {"type": "Station", "id": "S", "geometry": point(0.0, 0.0), "sequence": [
                {"type": "TakePicture", "id": "C"}
            ]}
        ]});
        let plan = Plan::parse(raw, &schema(), ParseOptions::fill_defaults()).expect("parse");
        let Node::Station(ref station) = plan.sequence[0] else {
            panic!("expected station");
        };
        let command = &station.sequence[0];
        assert_eq!(command.kind, "TakePicture");
        assert_eq!(command.params.get("duration"), Some(&ParamValue::Integer(5)));
        assert_eq!(command.params.get("mode"), Some(&ParamValue::from("wide")));
    }

    #[test]
    fn test_missing_required_parameter_names_node_and_param() {
        let raw = json!({"type": "Plan", "sequence": [
            {"type": "Command", "id": "CMD9"}
        ]});
        let err = Plan::parse(raw, &schema(), ParseOptions::fill_defaults()).unwrap_err();
        assert_eq!(err, ValidationError::missing("CMD9", "duration"));
    }

    #[test]
    fn test_missing_geometry_uses_positional_label() {
        let raw = json!({"type": "Plan", "sequence": [
            {"type": "Station", "geometry": point(0.0, 0.0)},
            {"type": "Segment"},
            {"type": "Station"}
        ]});
        let err = Plan::parse(raw, &schema(), ParseOptions::fill_defaults()).unwrap_err();
        assert_eq!(err, ValidationError::missing("plan.sequence[2]", "geometry"));
    }

    #[test]
    fn test_unknown_kind() {
        let raw = json!({"type": "Plan", "sequence": [{"type": "Teleport"}]});
        let err = Plan::parse(raw, &schema(), ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownKind { ref kind, .. } if kind == "Teleport"));
    }

    #[test]
    fn test_non_command_kind_in_station_body() {
        let raw = json!({"type": "Plan", "sequence": [
            {"type": "Station", "id": "S", "geometry": point(0.0, 0.0), "sequence": [
                {"type": "Segment"}
            ]}
        ]});
        let err = Plan::parse(raw, &schema(), ParseOptions::fill_defaults()).unwrap_err();
        assert!(matches!(err, ValidationError::UnexpectedKind { .. }), "{err}");
    }

    #[test]
    fn test_command_list_rejects_non_command_node() {
        let segment = Node::Segment(Segment {
            kind: "Segment".into(),
            id: None,
            name: None,
            geometry: None,
            params: ParamMap::new(),
            sequence: Vec::new(),
        });
        let command = Node::Command(Command {
            kind: "Command".into(),
            id: Some("CMD1".into()),
            name: None,
            params: ParamMap::new(),
        });

        let err = into_commands(vec![command, segment], "STN1").unwrap_err();

        assert_eq!(
            err,
            ValidationError::UnexpectedKind {
                node: "STN1.sequence[1]".to_string(),
                kind: "Segment".to_string(),
                container: "the command list of STN1".to_string(),
            }
        );
    }

    #[test]
    fn test_non_node_kind_in_sequence() {
        let raw = json!({"type": "Plan", "sequence": [{"type": "Site"}]});
        let err = Plan::parse(raw, &schema(), ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ValidationError::UnexpectedKind { .. }), "{err}");
    }

    #[test]
    fn test_duplicate_identifier() {
        let raw = json!({"type": "Plan", "id": "X", "sequence": [
            {"type": "Station", "id": "A", "geometry": point(0.0, 0.0)},
            {"type": "Segment", "id": "A"}
        ]});
        let err = Plan::parse(raw, &schema(), ParseOptions::fill_defaults()).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateIdentifier("A".into()));
    }

    #[test]
    fn test_station_geometry_arity() {
        let raw = json!({"type": "Plan", "sequence": [
            {"type": "Station", "id": "S", "geometry": point(0.0, 0.0)},
            {"type": "Segment", "id": "G", "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0]]}}
        ]});
        let err = Plan::parse(raw, &schema(), ParseOptions::fill_defaults()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidGeometry { ref node, .. } if node == "G"));

        let raw = json!({"type": "Plan", "sequence": [
            {"type": "Station", "id": "S", "geometry": {"type": "Point", "coordinates": [1.0]}}
        ]});
        let err = Plan::parse(raw, &schema(), ParseOptions::fill_defaults()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidGeometry { ref node, .. } if node == "S"));
    }

    #[test]
    fn test_invalid_enum_value() {
        let raw = json!({"type": "Plan", "sequence": [
            {"type": "TakePicture", "id": "C", "mode": "panorama"}
        ]});
        let err = Plan::parse(raw, &schema(), ParseOptions::fill_defaults()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidParameter { ref param, .. } if param == "mode"));
    }

    #[test]
    fn test_unresolved_library_reference() {
        let raw = json!({"type": "Plan", "site": "NOWHERE"});
        let err = Plan::parse(raw, &schema(), ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ValidationError::UnresolvedReference { ref id, .. } if id == "NOWHERE"));

        let raw = json!({"type": "Plan", "site": {"type": "Site", "id": "ELSEWHERE"}});
        let plan = Plan::parse(raw, &schema(), ParseOptions::default()).expect("embedded");
        assert_eq!(plan.site.as_ref().and_then(LibraryRef::id), Some("ELSEWHERE"));
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let raw = json!({"type": "Plan", "xpjson": "0.1", "planNumber": 7});
        let plan = Plan::parse(raw, &schema(), ParseOptions::default()).expect("parse");
        assert_eq!(plan.params.get("xpjson"), Some(&ParamValue::Raw(json!("0.1"))));
        assert_eq!(plan.params.get("planNumber"), Some(&ParamValue::Raw(json!(7))));
    }

    #[test]
    fn test_from_slice_rejects_malformed_json() {
        let err = Plan::from_slice(b"{\"type\": ", &schema(), ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn test_nested_sequences_are_parsed() {
        let raw = json!({"type": "Plan", "sequence": [
            {"type": "Sequence", "id": "Q", "sequence": [
                {"type": "Station", "id": "S", "geometry": point(0.0, 0.0)},
                {"type": "TakePicture", "id": "C"}
            ]}
        ]});
        let plan = Plan::parse(raw, &schema(), ParseOptions::fill_defaults()).expect("parse");
        let Node::Sequence(ref seq) = plan.sequence[0] else {
            panic!("expected sequence");
        };
        assert_eq!(seq.sequence.len(), 2);
        assert_eq!(seq.sequence[1].id(), Some("C"));
    }
}
