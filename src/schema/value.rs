//! Typed parameter values and the geometry primitives they carry.

use serde_json::{Map, Value, json};

use super::types::ValueType;

/// A 2-D position in longitude/latitude order, as used by GeoJSON and KML.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Parse a `[lon, lat]` coordinate array. Exactly two numbers are accepted.
    pub fn from_coordinates(value: &Value) -> Result<Self, String> {
        let items = value
            .as_array()
            .ok_or_else(|| format!("expected a coordinate array, got {value}"))?;
        if items.len() != 2 {
            return Err(format!(
                "expected 2 coordinate components, got {}",
                items.len()
            ));
        }
        let lon = items[0]
            .as_f64()
            .ok_or_else(|| format!("non-numeric longitude {}", items[0]))?;
        let lat = items[1]
            .as_f64()
            .ok_or_else(|| format!("non-numeric latitude {}", items[1]))?;
        Ok(Self { lon, lat })
    }

    /// Parse a list of coordinate arrays with at least two points.
    pub fn line_from_coordinates(value: &Value) -> Result<Vec<Self>, String> {
        let items = value
            .as_array()
            .ok_or_else(|| format!("expected an array of coordinates, got {value}"))?;
        if items.len() < 2 {
            return Err(format!(
                "a line needs at least 2 points, got {}",
                items.len()
            ));
        }
        items.iter().map(Self::from_coordinates).collect()
    }

    pub fn to_coordinates(self) -> Value {
        json!([self.lon, self.lat])
    }
}

/// Parse a GeoJSON-style `{"type": "Point", "coordinates": [lon, lat]}` object.
pub fn point_from_geojson(value: &Value) -> Result<LonLat, String> {
    let coords = geojson_coordinates(value, "Point")?;
    LonLat::from_coordinates(coords)
}

/// Parse a GeoJSON-style `{"type": "LineString", "coordinates": [...]}` object.
pub fn line_from_geojson(value: &Value) -> Result<Vec<LonLat>, String> {
    let coords = geojson_coordinates(value, "LineString")?;
    LonLat::line_from_coordinates(coords)
}

fn geojson_coordinates<'v>(value: &'v Value, geometry_type: &str) -> Result<&'v Value, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| format!("expected a {geometry_type} geometry object"))?;
    match obj.get("type").and_then(Value::as_str) {
        Some(t) if t == geometry_type => {}
        Some(other) => return Err(format!("expected {geometry_type} geometry, got {other}")),
        None => return Err(format!("{geometry_type} geometry is missing its type")),
    }
    obj.get("coordinates")
        .ok_or_else(|| format!("{geometry_type} geometry has no coordinates"))
}

pub fn point_to_geojson(point: LonLat) -> Value {
    json!({"type": "Point", "coordinates": point.to_coordinates()})
}

pub fn line_to_geojson(points: &[LonLat]) -> Value {
    let coords: Vec<Value> = points.iter().map(|p| p.to_coordinates()).collect();
    json!({"type": "LineString", "coordinates": coords})
}

/// A parameter value checked against its schema [`ValueType`].
///
/// Values for keys the schema does not know about are kept as `Raw` so that
/// documents survive a parse/serialize cycle without losing data.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Point(LonLat),
    LineString(Vec<LonLat>),
    Object(Map<String, Value>),
    List(Vec<ParamValue>),
    Raw(Value),
}

impl ParamValue {
    /// Coerce a raw JSON value into the shape required by `ty`.
    pub fn coerce(value: &Value, ty: &ValueType) -> Result<Self, String> {
        match ty {
            ValueType::String => value
                .as_str()
                .map(|s| Self::String(s.to_string()))
                .ok_or_else(|| format!("expected a string, got {value}")),
            ValueType::Integer => value
                .as_i64()
                .map(Self::Integer)
                .ok_or_else(|| format!("expected an integer, got {value}")),
            ValueType::Number => value
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| format!("expected a number, got {value}")),
            ValueType::Boolean => value
                .as_bool()
                .map(Self::Boolean)
                .ok_or_else(|| format!("expected a boolean, got {value}")),
            ValueType::Enum(choices) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| format!("expected an enum string, got {value}"))?;
                if choices.iter().any(|c| c == s) {
                    Ok(Self::String(s.to_string()))
                } else {
                    Err(format!("'{s}' is not one of [{}]", choices.join(", ")))
                }
            }
            ValueType::Point => point_from_geojson(value).map(Self::Point),
            ValueType::LineString => line_from_geojson(value).map(Self::LineString),
            ValueType::Kind(_) => value
                .as_object()
                .map(|obj| Self::Object(obj.clone()))
                .ok_or_else(|| format!("expected an object, got {value}")),
            ValueType::List(kind) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| format!("expected a list, got {value}"))?;
                let item_type = ValueType::Kind(kind.clone());
                items
                    .iter()
                    .map(|item| Self::coerce(item, &item_type))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::List)
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => json!(s),
            Self::Integer(i) => json!(*i),
            Self::Number(f) => json!(*f),
            Self::Boolean(b) => json!(*b),
            Self::Point(p) => point_to_geojson(*p),
            Self::LineString(points) => line_to_geojson(points),
            Self::Object(obj) => Value::Object(obj.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Raw(value) => value.clone(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}
