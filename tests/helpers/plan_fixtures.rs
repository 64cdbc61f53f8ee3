//! Common schema, library and plan fixtures for tests.

use serde_json::{Value, json};
use xplan::Schema;

pub const PLAN_SCHEMA: &str = r#"{
    "kinds": {
        "Plan": {
            "params": [
                {"id": "planNumber", "valueType": "integer", "required": false},
                {"id": "planVersion", "valueType": "string", "required": false},
                {"id": "defaultSpeed", "valueType": "number", "default": 0.5}
            ]
        },
        "PathElement": {
            "params": [
                {"id": "notes", "valueType": "string", "required": false}
            ]
        },
        "Station": {
            "parent": "PathElement",
            "params": [
                {"id": "tolerance", "valueType": "number", "default": 1},
                {"id": "boundary", "valueType": "number", "required": false}
            ]
        },
        "Segment": {
            "parent": "PathElement",
            "params": [
                {"id": "hintedSpeed", "valueType": "number", "required": false}
            ]
        },
        "Sequence": {"params": []},
        "Command": {
            "params": [
                {"id": "duration", "valueType": "number", "default": 0}
            ]
        },
        "TakePicture": {
            "parent": "Command",
            "params": [
                {"id": "mode", "valueType": "enum", "choices": ["single", "burst"], "default": "single"}
            ]
        }
    },
    "sites": [
        {"type": "Site", "id": "ARC", "name": "NASA Ames", "notes": "Roverscape",
         "bbox": [-122.07, 37.41, -122.05, 37.43]}
    ],
    "platforms": [
        {"type": "Platform", "id": "R", "name": "Rover"}
    ]
}"#;

pub const PLAN_LIBRARY: &str = r#"{
    "sites": [
        {"type": "Site", "id": "BAS", "name": "Basalt Hills", "notes": "lava field"}
    ],
    "platforms": [
        {"type": "Platform", "id": "EV", "name": "Extravehicular"}
    ]
}"#;

pub fn schema() -> Schema {
    Schema::load(PLAN_SCHEMA.as_bytes()).expect("fixture schema should load")
}

/// A KML document with one `Placemark/LineString` over `coordinates`.
pub fn kml_line_string(coordinates: &[(f64, f64)]) -> String {
    let tuples: Vec<String> = coordinates
        .iter()
        .map(|(lon, lat)| format!("{lon},{lat},0"))
        .collect();
    kml_with_coordinates(&tuples.join("\n          "))
}

/// A KML document whose line string carries `text` verbatim.
pub fn kml_with_coordinates(text: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Traverse</name>
    <Placemark>
      <name>Path</name>
      <LineString>
        <tessellate>1</tessellate>
        <coordinates>
          {text}
        </coordinates>
      </LineString>
    </Placemark>
  </Document>
</kml>"#
    )
}

pub fn raw_station(id: &str, lon: f64, lat: f64) -> Value {
    json!({
        "type": "Station",
        "id": id,
        "geometry": {"type": "Point", "coordinates": [lon, lat]}
    })
}

pub fn raw_segment(id: &str) -> Value {
    json!({"type": "Segment", "id": id})
}

/// A raw plan with `n` stations and `n - 1` segments in strict alternation.
pub fn raw_alternating_plan(n: usize) -> Value {
    let mut sequence = Vec::new();
    for i in 1..=n {
        if i > 1 {
            sequence.push(raw_segment(&format!("SEG{}", i - 1)));
        }
        sequence.push(raw_station(
            &format!("STN{i}"),
            -122.4 - 0.1 * i as f64,
            37.7 + 0.1 * i as f64,
        ));
    }
    json!({
        "type": "Plan",
        "id": "001A",
        "name": "Alternating",
        "sequence": sequence
    })
}

/// A plan exercising commands, nested sequences, explicit geometry and defaults.
pub fn raw_rich_plan() -> Value {
    json!({
        "type": "Plan",
        "id": "007B",
        "name": "Rich & <Nested>",
        "creator": "alice",
        "platform": "R",
        "site": "ARC",
        "planNumber": 7,
        "planVersion": "B",
        "xpjson": "0.1",
        "sequence": [
            {
                "type": "Station",
                "id": "STN1",
                "geometry": {"type": "Point", "coordinates": [-122.06, 37.42]},
                "headingDegrees": 45,
                "sequence": [
                    {"type": "TakePicture", "id": "CMD1", "mode": "burst"},
                    {"type": "Command", "id": "CMD2", "duration": 30}
                ]
            },
            {
                "type": "Segment",
                "id": "SEG1",
                "hintedSpeed": 0.8,
                "geometry": {"type": "LineString", "coordinates": [
                    [-122.06, 37.42], [-122.061, 37.421], [-122.062, 37.422]
                ]}
            },
            {
                "type": "Station",
                "id": "STN2",
                "tolerance": 2.5,
                "geometry": {"type": "Point", "coordinates": [-122.062, 37.422]}
            },
            {
                "type": "Sequence",
                "id": "SEQ1",
                "sequence": [
                    {"type": "Command", "id": "CMD3"}
                ]
            }
        ]
    })
}
