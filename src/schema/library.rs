//! Library of reusable named entities (sites, platforms).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::SchemaError;

/// A reusable entity referenced from plan metadata by id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntity {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// `[minLon, minLat, maxLon, maxLat]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_crs: Option<Value>,
}

impl LibraryEntity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Sites and platforms available to plans.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub sites: Vec<LibraryEntity>,
    #[serde(default)]
    pub platforms: Vec<LibraryEntity>,
}

impl Library {
    /// Load a standalone library document (`{"sites": [...], "platforms": [...]}`).
    pub fn load(input: &[u8]) -> Result<Self, SchemaError> {
        serde_json::from_slice(input)
            .map_err(|e| SchemaError::parse(format!("library: {e}")))
    }

    pub fn site(&self, id: &str) -> Option<&LibraryEntity> {
        self.sites.iter().find(|s| s.id == id)
    }

    pub fn platform(&self, id: &str) -> Option<&LibraryEntity> {
        self.platforms.iter().find(|p| p.id == id)
    }

    /// Embed a site by value, for plans that carry their site inline.
    ///
    /// Only `type`, `id`, `name` and `notes` are always present; `bbox` and
    /// `alternateCrs` are copied when the library defines them.
    pub fn denormalize_site(&self, id: &str) -> Option<Map<String, Value>> {
        let site = self.site(id)?;
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("Site"));
        obj.insert("name".to_string(), json!(site.name));
        obj.insert("id".to_string(), json!(site.id));
        obj.insert("notes".to_string(), json!(site.notes));
        if let Some(ref bbox) = site.bbox {
            obj.insert("bbox".to_string(), json!(bbox));
        }
        if let Some(ref crs) = site.alternate_crs {
            obj.insert("alternateCrs".to_string(), crs.clone());
        }
        Some(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &[u8] = br#"{
        "sites": [
            {"type": "Site", "id": "ARC", "name": "Ames", "notes": "lot",
             "bbox": [-122.1, 37.4, -122.0, 37.5]},
            {"type": "Site", "id": "BAS", "name": "Basalt Hills"}
        ],
        "platforms": [{"type": "Platform", "id": "R", "name": "Rover"}]
    }"#;

    #[test]
    fn test_library_load_and_lookup() {
        let library = Library::load(LIBRARY).expect("load");
        assert_eq!(library.sites.len(), 2);
        assert_eq!(library.site("BAS").and_then(|s| s.name.as_deref()), Some("Basalt Hills"));
        assert_eq!(library.platform("R").map(|p| p.id.as_str()), Some("R"));
        assert!(library.site("nope").is_none());
    }

    #[test]
    fn test_denormalize_site_copies_optional_fields() {
        let library = Library::load(LIBRARY).expect("load");

        let arc = library.denormalize_site("ARC").expect("site");
        assert_eq!(arc["type"], json!("Site"));
        assert_eq!(arc["bbox"], json!([-122.1, 37.4, -122.0, 37.5]));
        assert!(!arc.contains_key("alternateCrs"));

        let bas = library.denormalize_site("BAS").expect("site");
        assert!(!bas.contains_key("bbox"));
        assert_eq!(bas["notes"], Value::Null);
    }

    #[test]
    fn test_library_load_rejects_garbage() {
        assert!(matches!(
            Library::load(b"[1, 2"),
            Err(SchemaError::Parse(_))
        ));
    }
}
