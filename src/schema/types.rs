//! Resolved schema types: value types, parameter specs and kind definitions.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::value::ParamValue;

/// The value type a parameter accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueType {
    String,
    Integer,
    Number,
    Boolean,
    /// A string restricted to the listed choices.
    Enum(Vec<String>),
    /// GeoJSON point geometry.
    Point,
    /// GeoJSON line-string geometry.
    LineString,
    /// A nested object of the named kind.
    Kind(SmolStr),
    /// A list of nested objects of the named kind.
    List(SmolStr),
}

/// A single parameter definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    pub id: SmolStr,
    pub value_type: ValueType,
    /// Default value, already checked against `value_type`.
    pub default: Option<ParamValue>,
    /// Whether the parameter must be present after defaults are filled in.
    pub required: bool,
    pub notes: Option<String>,
}

/// A node kind with its effective (inherited + own) parameter set.
#[derive(Clone, Debug, PartialEq)]
pub struct KindDefinition {
    pub name: SmolStr,
    pub parent: Option<SmolStr>,
    /// Ancestor chain, nearest parent first.
    pub ancestors: Vec<SmolStr>,
    /// Effective parameters. Ancestor parameters come first; a redefinition
    /// in a more specific kind replaces the inherited spec in place.
    pub params: IndexMap<SmolStr, ParamSpec>,
}

impl KindDefinition {
    pub fn param(&self, id: &str) -> Option<&ParamSpec> {
        self.params.get(id)
    }

    /// True if this kind is `kind` or inherits from it.
    pub fn is_a(&self, kind: &str) -> bool {
        self.name == kind || self.ancestors.iter().any(|a| a == kind)
    }

    pub fn iter_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.values()
    }
}
