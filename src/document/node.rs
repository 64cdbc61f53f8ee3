//! Typed plan tree.
//!
//! The set of node variants is closed; schema kinds map onto a variant through
//! inheritance (`TakePicture` inheriting from `Command` becomes a
//! [`Node::Command`] whose `kind` is `TakePicture`).

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use smol_str::SmolStr;

use crate::schema::{LonLat, ParamValue};

/// Schema-defined parameters not promoted to typed fields, in document order.
pub type ParamMap = IndexMap<SmolStr, ParamValue>;

/// Variant tag of a node, used to key transform handler tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Plan,
    Station,
    Segment,
    Command,
    Sequence,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        Self::Plan,
        Self::Station,
        Self::Segment,
        Self::Command,
        Self::Sequence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "Plan",
            Self::Station => "Station",
            Self::Segment => "Segment",
            Self::Command => "Command",
            Self::Sequence => "Sequence",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a library entity: by id, or embedded by value.
#[derive(Clone, Debug, PartialEq)]
pub enum LibraryRef {
    Id(String),
    Embedded(Map<String, Value>),
}

impl LibraryRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Embedded(obj) => obj.get("id").and_then(Value::as_str),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Id(id) => Value::String(id.clone()),
            Self::Embedded(obj) => Value::Object(obj.clone()),
        }
    }
}

/// Top-level plan document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    pub kind: SmolStr,
    pub id: Option<String>,
    pub name: Option<String>,
    pub creator: Option<String>,
    pub platform: Option<LibraryRef>,
    pub site: Option<LibraryRef>,
    pub params: ParamMap,
    pub sequence: Vec<Node>,
}

/// Named point on the plan's path.
#[derive(Clone, Debug, PartialEq)]
pub struct Station {
    pub kind: SmolStr,
    pub id: Option<String>,
    pub name: Option<String>,
    pub geometry: LonLat,
    pub heading_degrees: Option<f64>,
    pub is_directional: Option<bool>,
    pub params: ParamMap,
    pub sequence: Vec<Command>,
}

/// Path between the stations on either side of it.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub kind: SmolStr,
    pub id: Option<String>,
    pub name: Option<String>,
    /// Explicit path; `None` means "straight between the bounding stations".
    pub geometry: Option<Vec<LonLat>>,
    pub params: ParamMap,
    pub sequence: Vec<Command>,
}

/// Leaf action.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    pub kind: SmolStr,
    pub id: Option<String>,
    pub name: Option<String>,
    pub params: ParamMap,
}

/// Nested group of nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    pub kind: SmolStr,
    pub id: Option<String>,
    pub name: Option<String>,
    pub params: ParamMap,
    pub sequence: Vec<Node>,
}

/// A child of a plan or sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Station(Station),
    Segment(Segment),
    Command(Command),
    Sequence(Sequence),
}

impl Node {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            Self::Station(_) => NodeKind::Station,
            Self::Segment(_) => NodeKind::Segment,
            Self::Command(_) => NodeKind::Command,
            Self::Sequence(_) => NodeKind::Sequence,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.as_node_ref().id()
    }

    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            Self::Station(s) => NodeRef::Station(s),
            Self::Segment(s) => NodeRef::Segment(s),
            Self::Command(c) => NodeRef::Command(c),
            Self::Sequence(s) => NodeRef::Sequence(s),
        }
    }

    fn id_slot(&mut self) -> &mut Option<String> {
        match self {
            Self::Station(s) => &mut s.id,
            Self::Segment(s) => &mut s.id,
            Self::Command(c) => &mut c.id,
            Self::Sequence(s) => &mut s.id,
        }
    }
}

/// Borrowed view of any node in a plan tree, the plan itself included.
#[derive(Clone, Copy, Debug)]
pub enum NodeRef<'a> {
    Plan(&'a Plan),
    Station(&'a Station),
    Segment(&'a Segment),
    Command(&'a Command),
    Sequence(&'a Sequence),
}

impl<'a> NodeRef<'a> {
    pub fn node_kind(&self) -> NodeKind {
        match *self {
            Self::Plan(_) => NodeKind::Plan,
            Self::Station(_) => NodeKind::Station,
            Self::Segment(_) => NodeKind::Segment,
            Self::Command(_) => NodeKind::Command,
            Self::Sequence(_) => NodeKind::Sequence,
        }
    }

    /// The schema kind name (may be a subtype, e.g. `TakePicture`).
    pub fn kind_name(&self) -> &'a str {
        match *self {
            Self::Plan(p) => &p.kind,
            Self::Station(s) => &s.kind,
            Self::Segment(s) => &s.kind,
            Self::Command(c) => &c.kind,
            Self::Sequence(s) => &s.kind,
        }
    }

    pub fn id(&self) -> Option<&'a str> {
        match *self {
            Self::Plan(p) => p.id.as_deref(),
            Self::Station(s) => s.id.as_deref(),
            Self::Segment(s) => s.id.as_deref(),
            Self::Command(c) => c.id.as_deref(),
            Self::Sequence(s) => s.id.as_deref(),
        }
    }

    pub fn name(&self) -> Option<&'a str> {
        match *self {
            Self::Plan(p) => p.name.as_deref(),
            Self::Station(s) => s.name.as_deref(),
            Self::Segment(s) => s.name.as_deref(),
            Self::Command(c) => c.name.as_deref(),
            Self::Sequence(s) => s.name.as_deref(),
        }
    }

    pub fn params(&self) -> &'a ParamMap {
        match *self {
            Self::Plan(p) => &p.params,
            Self::Station(s) => &s.params,
            Self::Segment(s) => &s.params,
            Self::Command(c) => &c.params,
            Self::Sequence(s) => &s.params,
        }
    }

    pub fn as_station(&self) -> Option<&'a Station> {
        match *self {
            Self::Station(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_segment(&self) -> Option<&'a Segment> {
        match *self {
            Self::Segment(s) => Some(s),
            _ => None,
        }
    }

    /// Id for messages, falling back to the kind name.
    pub fn label(&self) -> &'a str {
        self.id().unwrap_or_else(|| self.kind_name())
    }

    /// Direct children in document order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match *self {
            Self::Plan(p) => p.sequence.iter().map(Node::as_node_ref).collect(),
            Self::Station(s) => s.sequence.iter().map(NodeRef::Command).collect(),
            Self::Segment(s) => s.sequence.iter().map(NodeRef::Command).collect(),
            Self::Command(_) => Vec::new(),
            Self::Sequence(s) => s.sequence.iter().map(Node::as_node_ref).collect(),
        }
    }
}

impl Plan {
    pub fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Plan(self)
    }

    /// Every node in depth-first, left-to-right order, the plan first.
    pub fn iter_nodes(&self) -> Vec<NodeRef<'_>> {
        let mut out = Vec::new();
        collect_preorder(self.as_node(), &mut out);
        out
    }

    /// Visit every identifier slot in the same order as [`Plan::iter_nodes`].
    pub fn visit_ids_mut(&mut self, f: &mut impl FnMut(NodeKind, &mut Option<String>)) {
        f(NodeKind::Plan, &mut self.id);
        visit_nodes_ids_mut(&mut self.sequence, f);
    }

    /// Identifiers already present anywhere in the document.
    pub fn collect_ids(&self) -> FxHashSet<String> {
        self.iter_nodes()
            .into_iter()
            .filter_map(|n| n.id().map(str::to_string))
            .collect()
    }

    /// Name to display for the plan: its name, else its id.
    pub fn title(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.id.as_deref())
            .unwrap_or_default()
    }
}

fn collect_preorder<'a>(node: NodeRef<'a>, out: &mut Vec<NodeRef<'a>>) {
    out.push(node);
    for child in node.children() {
        collect_preorder(child, out);
    }
}

fn visit_nodes_ids_mut(nodes: &mut [Node], f: &mut impl FnMut(NodeKind, &mut Option<String>)) {
    for node in nodes {
        let kind = node.node_kind();
        f(kind, node.id_slot());
        match node {
            Node::Station(Station { sequence, .. }) | Node::Segment(Segment { sequence, .. }) => {
                for command in sequence {
                    f(NodeKind::Command, &mut command.id);
                }
            }
            Node::Sequence(s) => visit_nodes_ids_mut(&mut s.sequence, f),
            Node::Command(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str) -> Node {
        Node::Station(Station {
            kind: "Station".into(),
            id: Some(id.to_string()),
            name: None,
            geometry: LonLat::new(0.0, 0.0),
            heading_degrees: None,
            is_directional: None,
            params: ParamMap::new(),
            sequence: vec![Command {
                kind: "Command".into(),
                id: None,
                name: None,
                params: ParamMap::new(),
            }],
        })
    }

    fn segment() -> Node {
        Node::Segment(Segment {
            kind: "Segment".into(),
            id: None,
            name: None,
            geometry: None,
            params: ParamMap::new(),
            sequence: Vec::new(),
        })
    }

    #[test]
    fn test_iter_nodes_is_preorder() {
        let plan = Plan {
            kind: "Plan".into(),
            id: Some("P".into()),
            sequence: vec![station("A"), segment(), station("B")],
            ..Default::default()
        };
        let kinds: Vec<_> = plan.iter_nodes().iter().map(|n| n.node_kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Plan,
                NodeKind::Station,
                NodeKind::Command,
                NodeKind::Segment,
                NodeKind::Station,
                NodeKind::Command,
            ]
        );
    }

    #[test]
    fn test_visit_ids_mut_matches_iter_order() {
        let mut plan = Plan {
            kind: "Plan".into(),
            sequence: vec![station("A"), segment(), station("B")],
            ..Default::default()
        };
        let expected: Vec<_> = plan.iter_nodes().iter().map(|n| n.node_kind()).collect();

        let mut visited = Vec::new();
        plan.visit_ids_mut(&mut |kind, _| visited.push(kind));
        assert_eq!(visited, expected);
    }

    #[test]
    fn test_title_prefers_name() {
        let mut plan = Plan {
            id: Some("001A".into()),
            ..Default::default()
        };
        assert_eq!(plan.title(), "001A");
        plan.name = Some("Traverse".into());
        assert_eq!(plan.title(), "Traverse");
        plan.name = Some(String::new());
        assert_eq!(plan.title(), "001A");
    }
}
