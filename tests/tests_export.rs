//! Exporter Tests - XPJSON, KML, Stats and ID filling over parsed plans
#![allow(clippy::unwrap_used, clippy::expect_used)]

#[path = "helpers/mod.rs"]
mod helpers;

use helpers::plan_assertions::{assert_fully_identified, count_occurrences};
use helpers::plan_fixtures::{
    raw_alternating_plan, raw_rich_plan, raw_segment, raw_station, schema,
};
use rstest::rstest;
use serde_json::json;
#[cfg(feature = "kml")]
use xplan::export::Kml;
use xplan::export::{ExportError, Stats, Xpjson, fill_ids};
use xplan::{ParseOptions, Plan, PlanExporter};

fn parse(raw: serde_json::Value) -> Plan {
    Plan::parse(raw, &schema(), ParseOptions::fill_defaults()).expect("fixture plan should parse")
}

// ============================================================================
// XPJSON
// ============================================================================

#[test]
fn test_xpjson_reparse_is_identity() {
    let schema = schema();
    let plan = parse(raw_rich_plan());

    let bytes = Xpjson.export(&plan, &schema).expect("export");
    let reparsed = Plan::from_slice(&bytes, &schema, ParseOptions::fill_defaults())
        .expect("exported xpjson should parse");

    assert_eq!(reparsed, plan);
}

#[test]
fn test_xpjson_export_is_stable() {
    let schema = schema();
    let plan = parse(raw_rich_plan());

    let first = Xpjson.export(&plan, &schema).expect("export");
    let reparsed = Plan::from_slice(&first, &schema, ParseOptions::fill_defaults()).expect("parse");
    let second = Xpjson.export(&reparsed, &schema).expect("export");

    assert_eq!(first, second);
}

#[test]
fn test_xpjson_keeps_non_default_params() {
    let schema = schema();
    let plan = parse(raw_rich_plan());

    let value = Xpjson.to_value(&plan, &schema).expect("export");
    let sequence = value["sequence"].as_array().expect("sequence");

    assert_eq!(sequence[0]["sequence"][0]["mode"], "burst");
    assert_eq!(sequence[0]["sequence"][1]["duration"], 30.0);
    assert_eq!(sequence[2]["tolerance"], 2.5);
    assert!(sequence[3]["sequence"][0].get("duration").is_none());
}

// ============================================================================
// KML
// ============================================================================

#[cfg(feature = "kml")]
#[test]
fn test_kml_heading_style_only_on_directional_station() {
    let mut first = raw_station("STN1", -122.4, 37.7);
    first["headingDegrees"] = json!(90);
    let raw = json!({
        "type": "Plan",
        "id": "001A",
        "sequence": [first, raw_segment("SEG1"), raw_station("STN2", -122.5, 37.8)]
    });
    let plan = parse(raw);

    let bytes = Kml.export(&plan, &schema()).expect("export");
    let kml = String::from_utf8(bytes).expect("utf8");

    let heading = kml.find("<styleUrl>#heading</styleUrl>").expect("heading style");
    let station = kml.find("<styleUrl>#station</styleUrl>").expect("station style");
    assert!(heading < station, "first station should carry the heading style");
    assert_eq!(count_occurrences(&kml, "<styleUrl>#heading</styleUrl>"), 1);
    assert!(kml.contains("<heading>90</heading>"));
    assert!(kml.contains("<coordinates>-122.4,37.7 -122.5,37.8</coordinates>"));
}

#[cfg(feature = "kml")]
#[rstest]
#[case(1)]
#[case(2)]
#[case(6)]
fn test_kml_placemark_counts(#[case] n: usize) {
    let plan = parse(raw_alternating_plan(n));

    let bytes = Kml.export(&plan, &schema()).expect("export");
    let kml = String::from_utf8(bytes).expect("utf8");

    assert_eq!(count_occurrences(&kml, "<Point>"), n);
    assert_eq!(count_occurrences(&kml, "<LineString>"), n - 1);
    assert_eq!(count_occurrences(&kml, "<Placemark>"), 2 * n - 1);
}

#[cfg(feature = "kml")]
#[test]
fn test_kml_uses_explicit_segment_geometry() {
    let plan = parse(raw_rich_plan());

    let bytes = Kml.export(&plan, &schema()).expect("export");
    let kml = String::from_utf8(bytes).expect("utf8");

    assert!(kml.contains("-122.06,37.42 -122.061,37.421 -122.062,37.422"));
    assert!(kml.contains("<name>Rich &amp; &lt;Nested&gt;</name>"));
}

#[cfg(feature = "kml")]
#[rstest]
#[case::consecutive_segments(json!([
    raw_station("STN1", 0.0, 0.0), raw_segment("SEG1"), raw_segment("SEG2"), raw_station("STN2", 1.0, 1.0)
]))]
#[case::leading_segment(json!([raw_segment("SEG1"), raw_station("STN1", 0.0, 0.0)]))]
#[case::trailing_segment(json!([raw_station("STN1", 0.0, 0.0), raw_segment("SEG1")]))]
#[case::trailing_explicit_segment(json!([
    raw_station("STN1", 0.0, 0.0),
    {"type": "Segment", "id": "SEG1", "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}}
]))]
fn test_broken_alternation_is_malformed(#[case] sequence: serde_json::Value) {
    let plan = parse(json!({"type": "Plan", "id": "001A", "sequence": sequence}));

    let err = Kml.export(&plan, &schema()).unwrap_err();
    assert!(
        matches!(err, ExportError::MalformedSequence { .. }),
        "expected MalformedSequence, got {err:?}"
    );
    assert!(matches!(
        Stats.report(&plan),
        Err(ExportError::MalformedSequence { .. })
    ));
}

// ============================================================================
// Stats
// ============================================================================

#[test]
fn test_stats_counts_every_kind() {
    let plan = parse(raw_rich_plan());

    let report = Stats.report(&plan).expect("stats");

    assert_eq!(report.plan_id.as_deref(), Some("007B"));
    assert_eq!(report.num_stations, 2);
    assert_eq!(report.num_segments, 1);
    assert_eq!(report.num_commands, 3);
    assert_eq!(report.num_sequences, 1);
    assert_eq!(report.segment_lengths_meters.len(), 1);
    // Two legs of roughly 141 m each.
    assert!(report.length_meters > 250.0 && report.length_meters < 310.0);

    let bbox = report.bounding_box.expect("bounding box");
    assert_eq!(bbox.min_lon, -122.062);
    assert_eq!(bbox.max_lon, -122.06);
    assert_eq!(bbox.min_lat, 37.42);
    assert_eq!(bbox.max_lat, 37.422);
}

#[test]
fn test_stats_json_uses_camel_case() {
    let plan = parse(raw_alternating_plan(3));

    let bytes = Stats.export(&plan, &schema()).expect("export");
    let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json");

    assert_eq!(value["numStations"], 3);
    assert_eq!(value["numSegments"], 2);
    assert_eq!(value["planId"], "001A");
}

// ============================================================================
// ID filling
// ============================================================================

#[test]
fn test_fill_ids_is_idempotent() {
    let raw = json!({
        "type": "Plan",
        "planNumber": 3,
        "planVersion": "C",
        "sequence": [
            {"type": "Station", "geometry": {"type": "Point", "coordinates": [0, 0]},
             "sequence": [{"type": "Command"}]},
            {"type": "Segment"},
            {"type": "Station", "id": "STN1", "geometry": {"type": "Point", "coordinates": [1, 1]}}
        ]
    });
    let plan = parse(raw);

    let once = fill_ids(plan).expect("fill");
    let twice = fill_ids(once.clone()).expect("fill");

    assert_eq!(once, twice);
    assert_fully_identified(&once);
    assert_eq!(once.id.as_deref(), Some("003C"));
    let ids: Vec<String> = once
        .iter_nodes()
        .iter()
        .filter_map(|n| n.id())
        .map(str::to_string)
        .collect();
    assert_eq!(ids, vec!["003C", "STN1_1", "CMD1", "SEG1", "STN1"]);
}
