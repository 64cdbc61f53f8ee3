//! Plan skeleton from a KML `<Placemark><LineString>`.
//!
//! Stations are placed at the vertices of the line string, with a segment
//! between each pair of consecutive vertices.

use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::{Map, Value, json};

use super::{ImportError, ImportMeta, PlanImporter, SourcePosition};
use crate::schema::{LonLat, Schema, kinds};

/// Imports a single KML line string as an alternating station/segment path.
#[derive(Debug, Clone, Copy, Default)]
pub struct KmlLineString;

impl PlanImporter for KmlLineString {
    fn label(&self) -> &'static str {
        "KML LineString"
    }

    fn skeleton(
        &self,
        input: &[u8],
        meta: &ImportMeta,
        schema: &Schema,
    ) -> Result<Map<String, Value>, ImportError> {
        let coordinates = line_string_coordinates(input)?;
        let points = parse_coordinates(&coordinates)?;
        tracing::debug!(vertices = points.len(), "read kml line string");

        let mut sequence = Vec::with_capacity(points.len() * 2);
        for (i, point) in points.iter().enumerate() {
            if i > 0 {
                sequence.push(json!({ "type": kinds::SEGMENT }));
            }
            sequence.push(json!({
                "type": kinds::STATION,
                "geometry": { "type": "Point", "coordinates": point.to_coordinates() },
            }));
        }

        let mut plan = meta.raw_plan(schema);
        plan.insert("sequence".to_string(), Value::Array(sequence));
        Ok(plan)
    }
}

/// Parse a KML coordinate list: whitespace-separated `lon,lat[,alt]` tuples.
///
/// Only the first two components of each tuple are kept.
pub fn parse_coordinates(text: &str) -> Result<Vec<LonLat>, ImportError> {
    let mut points = Vec::new();
    for (index, token) in text.split_whitespace().enumerate() {
        let components = token
            .split(',')
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                ImportError::unparseable(
                    SourcePosition::Token(index),
                    format!("invalid coordinate tuple '{token}': {e}"),
                )
            })?;
        if let Some(v) = components.iter().find(|v| !v.is_finite()) {
            return Err(ImportError::unparseable(
                SourcePosition::Token(index),
                format!("coordinate tuple '{token}' has non-finite component {v}"),
            ));
        }
        match components.as_slice() {
            [lon, lat, ..] => points.push(LonLat::new(*lon, *lat)),
            _ => {
                return Err(ImportError::unparseable(
                    SourcePosition::Token(index),
                    format!("coordinate tuple '{token}' needs at least lon,lat"),
                ));
            }
        }
    }
    if points.is_empty() {
        return Err(ImportError::unparseable(
            SourcePosition::Unknown,
            "line string has no coordinates",
        ));
    }
    Ok(points)
}

/// Text of the `coordinates` element of the one `Placemark/LineString`.
fn line_string_coordinates(input: &[u8]) -> Result<String, ImportError> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut found: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"coordinates" && in_placemark_line_string(&path) {
                    current = Some(String::new());
                }
                path.push(name);
            }
            Ok(Event::End(_)) => {
                if path.pop().as_deref() == Some(b"coordinates".as_slice()) {
                    if let Some(text) = current.take() {
                        found.push(text);
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"coordinates" && in_placemark_line_string(&path) {
                    found.push(String::new());
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref mut text) = current {
                    let unescaped = e.unescape().map_err(|err| {
                        ImportError::unparseable(
                            SourcePosition::Byte(reader.buffer_position()),
                            format!("XML text error: {err}"),
                        )
                    })?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(ref mut text) = current {
                    let raw = std::str::from_utf8(&**e).map_err(|err| {
                        ImportError::unparseable(
                            SourcePosition::Byte(reader.buffer_position()),
                            format!("CDATA is not valid UTF-8: {err}"),
                        )
                    })?;
                    text.push_str(raw);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ImportError::unparseable(
                    SourcePosition::Byte(reader.error_position()),
                    format!("XML parse error: {e}"),
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(ImportError::unparseable(
            SourcePosition::Unknown,
            "no <Placemark><LineString><coordinates> found",
        )),
        n => Err(ImportError::unparseable(
            SourcePosition::Unknown,
            format!("expected exactly one Placemark LineString, found {n}"),
        )),
    }
}

fn in_placemark_line_string(path: &[Vec<u8>]) -> bool {
    path.last().is_some_and(|p| p == b"LineString")
        && path.iter().any(|p| p == b"Placemark")
}
