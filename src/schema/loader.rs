//! Schema loading and eager inheritance resolution.

use std::path::Path;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use serde_json::Value;
use smol_str::SmolStr;

use super::library::{Library, LibraryEntity};
use super::types::{KindDefinition, ParamSpec, ValueType};
use super::value::ParamValue;
use super::SchemaError;

/// A resolved plan schema plus the library it was shipped with.
///
/// Immutable after loading; share it by reference (or `Arc`) between
/// concurrent imports and exports.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    kinds: IndexMap<SmolStr, KindDefinition>,
    library: Library,
}

impl Schema {
    /// Parse and resolve a schema document.
    pub fn load(input: &[u8]) -> Result<Self, SchemaError> {
        let raw: RawSchema = serde_json::from_slice(input).map_err(|e| {
            SchemaError::parse(format!("line {} column {}: {e}", e.line(), e.column()))
        })?;
        let schema = resolve(raw)?;
        tracing::debug!(
            kinds = schema.kinds.len(),
            sites = schema.library.sites.len(),
            platforms = schema.library.platforms.len(),
            "loaded plan schema"
        );
        Ok(schema)
    }

    /// Read and parse a schema file. The file handle is closed before parsing.
    pub fn load_path(path: &Path) -> Result<Self, SchemaError> {
        let bytes = std::fs::read(path)?;
        Self::load(&bytes)
    }

    /// Replace the embedded library, e.g. with one loaded from its own file.
    pub fn with_library(mut self, library: Library) -> Self {
        self.library = library;
        self
    }

    pub fn kind(&self, name: &str) -> Option<&KindDefinition> {
        self.kinds.get(name)
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// True if `kind` exists and is `ancestor` or inherits from it.
    pub fn is_a(&self, kind: &str, ancestor: &str) -> bool {
        self.kind(kind).is_some_and(|k| k.is_a(ancestor))
    }

    /// Default value for `param` on `kind`, if the schema defines one.
    pub fn default_for(&self, kind: &str, param: &str) -> Option<&ParamValue> {
        self.kind(kind)?.param(param)?.default.as_ref()
    }
}

/// Parse a schema document. See [`Schema::load`].
pub fn load_schema(input: &[u8]) -> Result<Schema, SchemaError> {
    Schema::load(input)
}

// ============================================================================
// RAW SCHEMA FILE
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(default)]
    kinds: IndexMap<String, RawKind>,
    #[serde(default)]
    sites: Vec<LibraryEntity>,
    #[serde(default)]
    platforms: Vec<LibraryEntity>,
}

#[derive(Debug, Deserialize)]
struct RawKind {
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    params: Vec<RawParam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParam {
    id: String,
    value_type: String,
    #[serde(default)]
    choices: Option<Vec<String>>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default)]
    notes: Option<String>,
}

// ============================================================================
// RESOLUTION
// ============================================================================

fn resolve(raw: RawSchema) -> Result<Schema, SchemaError> {
    // Convert every kind's own params once, then merge along ancestor chains.
    let mut own_params: IndexMap<&str, Vec<ParamSpec>> = IndexMap::new();
    for (name, kind) in &raw.kinds {
        let specs = kind
            .params
            .iter()
            .map(|p| convert_param(name, p, &raw.kinds))
            .collect::<Result<Vec<_>, _>>()?;
        own_params.insert(name.as_str(), specs);
    }

    let mut kinds = IndexMap::new();
    for (name, kind) in &raw.kinds {
        let ancestors = ancestor_chain(name, &raw.kinds)?;

        let mut params: IndexMap<SmolStr, ParamSpec> = IndexMap::new();
        for level in ancestors.iter().rev().map(|a| a.as_str()).chain([name.as_str()]) {
            for spec in own_params.get(level).into_iter().flatten() {
                params.insert(spec.id.clone(), spec.clone());
            }
        }

        kinds.insert(
            SmolStr::new(name),
            KindDefinition {
                name: SmolStr::new(name),
                parent: kind.parent.as_deref().map(SmolStr::new),
                ancestors,
                params,
            },
        );
    }

    Ok(Schema {
        kinds,
        library: Library {
            sites: raw.sites,
            platforms: raw.platforms,
        },
    })
}

/// Ancestors of `name`, nearest first. Fails on dangling parents and cycles.
fn ancestor_chain(
    name: &str,
    kinds: &IndexMap<String, RawKind>,
) -> Result<Vec<SmolStr>, SchemaError> {
    let mut chain = Vec::new();
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    seen.insert(name);

    let mut child = name;
    let mut next = kinds.get(name).and_then(|k| k.parent.as_deref());
    while let Some(parent) = next {
        let Some(parent_kind) = kinds.get(parent) else {
            return Err(SchemaError::UnknownParentKind {
                kind: child.to_string(),
                parent: parent.to_string(),
            });
        };
        if !seen.insert(parent) {
            return Err(SchemaError::InheritanceCycle {
                kind: name.to_string(),
            });
        }
        chain.push(SmolStr::new(parent));
        child = parent;
        next = parent_kind.parent.as_deref();
    }
    Ok(chain)
}

fn convert_param(
    kind: &str,
    raw: &RawParam,
    kinds: &IndexMap<String, RawKind>,
) -> Result<ParamSpec, SchemaError> {
    let nested_kind = || -> Result<SmolStr, SchemaError> {
        let target = raw.kind.as_deref().ok_or_else(|| {
            SchemaError::invalid_param(kind, &raw.id, "missing 'kind' for nested value type")
        })?;
        if !kinds.contains_key(target) {
            return Err(SchemaError::invalid_param(
                kind,
                &raw.id,
                format!("unknown nested kind '{target}'"),
            ));
        }
        Ok(SmolStr::new(target))
    };

    let value_type = match raw.value_type.as_str() {
        "string" => ValueType::String,
        "integer" => ValueType::Integer,
        "number" => ValueType::Number,
        "boolean" => ValueType::Boolean,
        "enum" => match raw.choices {
            Some(ref choices) if !choices.is_empty() => ValueType::Enum(choices.clone()),
            _ => {
                return Err(SchemaError::invalid_param(
                    kind,
                    &raw.id,
                    "enum parameters need a non-empty 'choices' list",
                ));
            }
        },
        "Point" => ValueType::Point,
        "LineString" => ValueType::LineString,
        "kind" => ValueType::Kind(nested_kind()?),
        "list" => ValueType::List(nested_kind()?),
        other => {
            return Err(SchemaError::invalid_param(
                kind,
                &raw.id,
                format!("unknown value type '{other}'"),
            ));
        }
    };

    let default = raw
        .default
        .as_ref()
        .map(|d| ParamValue::coerce(d, &value_type))
        .transpose()
        .map_err(|message| SchemaError::InvalidDefault {
            kind: kind.to_string(),
            param: raw.id.clone(),
            message,
        })?;

    Ok(ParamSpec {
        id: SmolStr::new(&raw.id),
        required: raw.required.unwrap_or(default.is_none()),
        default,
        value_type,
        notes: raw.notes.clone(),
    })
}
