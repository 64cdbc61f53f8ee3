//! Plan statistics exporter.
//!
//! Unlike the text formats, the transforms here fold into an accumulator and
//! produce no per-node output; assembly serializes the aggregate.

use serde::{Deserialize, Serialize};

use super::{ExportError, PlanExporter, expect_segment, expect_station, segment_path};
use crate::document::{NodeKind, NodeRef, Plan};
use crate::schema::{LonLat, Schema};
use crate::walker::{TransformSet, TraversalContext, walk};

/// Mean Earth radius in meters (IUGG).
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Aggregate plan statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub plan_id: Option<String>,
    pub plan_name: Option<String>,
    pub num_stations: usize,
    pub num_segments: usize,
    pub num_commands: usize,
    pub num_sequences: usize,
    /// Great-circle length of the whole path.
    pub length_meters: f64,
    /// Per-segment lengths, in traversal order.
    pub segment_lengths_meters: Vec<f64>,
    pub bounding_box: Option<BoundingBox>,
}

/// Extent of every station and segment vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    fn around(point: LonLat) -> Self {
        Self {
            min_lon: point.lon,
            min_lat: point.lat,
            max_lon: point.lon,
            max_lat: point.lat,
        }
    }

    fn extend(&mut self, point: LonLat) {
        self.min_lon = self.min_lon.min(point.lon);
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lon = self.max_lon.max(point.lon);
        self.max_lat = self.max_lat.max(point.lat);
    }
}

/// Statistics report format (JSON).
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats;

#[derive(Default)]
struct Totals {
    stations: usize,
    segments: usize,
    commands: usize,
    sequences: usize,
    segment_lengths: Vec<f64>,
    bounding_box: Option<BoundingBox>,
}

impl Totals {
    fn include(&mut self, point: LonLat) {
        match self.bounding_box {
            Some(ref mut bbox) => bbox.extend(point),
            None => self.bounding_box = Some(BoundingBox::around(point)),
        }
    }
}

impl PlanExporter for Stats {
    fn label(&self) -> &'static str {
        "stats"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn export(&self, plan: &Plan, _schema: &Schema) -> Result<Vec<u8>, ExportError> {
        let report = self.report(plan)?;
        serde_json::to_vec_pretty(&report).map_err(|e| ExportError::json(e.to_string()))
    }
}

impl Stats {
    /// Compute the report without serializing it.
    pub fn report(&self, plan: &Plan) -> Result<StatsReport, ExportError> {
        let transforms = TransformSet::new()
            .on(NodeKind::Station, count_station)
            .on(NodeKind::Segment, measure_segment)
            .on(NodeKind::Command, count_command)
            .on(NodeKind::Sequence, count_sequence);

        let mut totals = Totals::default();
        walk(plan, &transforms, &mut totals)?;

        let report = StatsReport {
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
            num_stations: totals.stations,
            num_segments: totals.segments,
            num_commands: totals.commands,
            num_sequences: totals.sequences,
            length_meters: totals.segment_lengths.iter().sum(),
            segment_lengths_meters: totals.segment_lengths,
            bounding_box: totals.bounding_box,
        };
        tracing::debug!(
            plan = plan.title(),
            stations = report.num_stations,
            segments = report.num_segments,
            length_meters = report.length_meters,
            "computed plan stats"
        );
        Ok(report)
    }
}

fn count_station(
    totals: &mut Totals,
    node: NodeRef<'_>,
    _: &TraversalContext<'_>,
) -> Result<(), ExportError> {
    let station = expect_station(node)?;
    totals.stations += 1;
    totals.include(station.geometry);
    Ok(())
}

fn measure_segment(
    totals: &mut Totals,
    node: NodeRef<'_>,
    ctx: &TraversalContext<'_>,
) -> Result<(), ExportError> {
    let segment = expect_segment(node)?;
    let path = segment_path(segment, ctx)?;
    totals.segments += 1;
    for point in &path {
        totals.include(*point);
    }
    totals.segment_lengths.push(path_length(&path));
    Ok(())
}

fn count_command(
    totals: &mut Totals,
    _: NodeRef<'_>,
    _: &TraversalContext<'_>,
) -> Result<(), ExportError> {
    totals.commands += 1;
    Ok(())
}

fn count_sequence(
    totals: &mut Totals,
    _: NodeRef<'_>,
    _: &TraversalContext<'_>,
) -> Result<(), ExportError> {
    totals.sequences += 1;
    Ok(())
}

fn path_length(path: &[LonLat]) -> f64 {
    path.windows(2).map(|w| haversine_meters(w[0], w[1])).sum()
}

/// Great-circle distance between two points.
pub(crate) fn haversine_meters(a: LonLat, b: LonLat) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}
