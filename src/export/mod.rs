//! Plan exporters.
//!
//! Every exporter is a [`TransformSet`](crate::walker::TransformSet) run by
//! [`walk`](crate::walker::walk) plus an assembly step that turns the ordered
//! fragments into output bytes:
//!
//! - **XPJSON** ([`Xpjson`]) - canonical JSON with schema defaults elided
//! - **KML** ([`Kml`]) - placemarks per station and segment, behind the `kml` feature
//! - **Stats** ([`Stats`]) - aggregate report instead of per-node text
//! - **ID filling** ([`FillIds`]) - structural pass assigning missing identifiers
//!
//! ```text
//!   Plan ──walk──▶ [fragment, fragment, ...] ──assemble──▶ bytes
//!            ▲
//!   TransformSet { Station => fn, Segment => fn, ... }
//! ```
//!
//! Exports are all-or-nothing: the first transform error aborts the walk and
//! nothing is returned.

mod error;
mod fill_ids;
#[cfg(feature = "kml")]
mod kml;
mod stats;
#[cfg(feature = "kml")]
pub mod xml;
mod xpjson;

pub use error::ExportError;
pub use fill_ids::{FillIds, IdScheme, fill_ids};
#[cfg(feature = "kml")]
pub use kml::Kml;
pub use stats::{BoundingBox, Stats, StatsReport};
pub use xpjson::Xpjson;

use crate::document::{NodeRef, Plan, Segment, Station};
use crate::schema::{LonLat, Schema};
use crate::walker::TraversalContext;

/// A serialization format for plans.
///
/// Implementations are stateless unit values so that a registry can hold
/// `&'static dyn PlanExporter` and share them across threads.
pub trait PlanExporter: Send + Sync {
    /// Short human-readable name, e.g. `"kml"`.
    fn label(&self) -> &'static str;

    /// MIME type of the produced bytes.
    fn content_type(&self) -> &'static str;

    /// Export a validated plan.
    fn export(&self, plan: &Plan, schema: &Schema) -> Result<Vec<u8>, ExportError>;
}

/// Path of a segment in traversal context.
///
/// A segment must sit directly between two stations. Explicit geometry is
/// used as-is; otherwise the path runs straight from one station to the next.
pub(crate) fn segment_path(
    segment: &Segment,
    ctx: &TraversalContext<'_>,
) -> Result<Vec<LonLat>, ExportError> {
    let label = segment.id.as_deref().unwrap_or(segment.kind.as_str());
    let previous = ctx
        .adjacent_previous_station()
        .ok_or_else(|| ExportError::malformed(label, "segment is not preceded by a station"))?;
    let next = ctx
        .adjacent_next_station()
        .ok_or_else(|| ExportError::malformed(label, "segment is not followed by a station"))?;

    match segment.geometry {
        Some(ref geometry) => Ok(geometry.clone()),
        None => Ok(vec![previous.geometry, next.geometry]),
    }
}

pub(crate) fn expect_station<'d>(node: NodeRef<'d>) -> Result<&'d Station, ExportError> {
    node.as_station().ok_or_else(|| unexpected(node))
}

pub(crate) fn expect_segment<'d>(node: NodeRef<'d>) -> Result<&'d Segment, ExportError> {
    node.as_segment().ok_or_else(|| unexpected(node))
}

fn unexpected(node: NodeRef<'_>) -> ExportError {
    ExportError::UnexpectedNode {
        node: node.label().to_string(),
        kind: node.node_kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{NodeKind, ParamMap};

    fn station(lon: f64) -> Station {
        Station {
            kind: "Station".into(),
            id: None,
            name: None,
            geometry: LonLat::new(lon, 0.0),
            heading_degrees: None,
            is_directional: None,
            params: ParamMap::new(),
            sequence: Vec::new(),
        }
    }

    fn segment(geometry: Option<Vec<LonLat>>) -> Segment {
        Segment {
            kind: "Segment".into(),
            id: Some("SEG1".into()),
            name: None,
            geometry,
            params: ParamMap::new(),
            sequence: Vec::new(),
        }
    }

    #[test]
    fn test_segment_path_falls_back_to_bounding_stations() {
        let (a, b) = (station(1.0), station(2.0));
        let ctx = TraversalContext {
            previous_station: Some(&a),
            next_station: Some(&b),
            previous_path_kind: Some(NodeKind::Station),
            next_path_kind: Some(NodeKind::Station),
            ..Default::default()
        };
        let path = segment_path(&segment(None), &ctx).expect("path");
        assert_eq!(path, vec![LonLat::new(1.0, 0.0), LonLat::new(2.0, 0.0)]);
    }

    #[test]
    fn test_segment_path_prefers_explicit_geometry() {
        let (a, b) = (station(1.0), station(2.0));
        let ctx = TraversalContext {
            previous_station: Some(&a),
            next_station: Some(&b),
            previous_path_kind: Some(NodeKind::Station),
            next_path_kind: Some(NodeKind::Station),
            ..Default::default()
        };
        let explicit = vec![LonLat::new(5.0, 5.0), LonLat::new(6.0, 6.0)];
        let path = segment_path(&segment(Some(explicit.clone())), &ctx).expect("path");
        assert_eq!(path, explicit);
    }

    #[test]
    fn test_trailing_segment_with_geometry_is_malformed() {
        let a = station(1.0);
        let ctx = TraversalContext {
            previous_station: Some(&a),
            previous_path_kind: Some(NodeKind::Station),
            ..Default::default()
        };
        let explicit = vec![LonLat::new(5.0, 5.0), LonLat::new(6.0, 6.0)];
        let err = segment_path(&segment(Some(explicit)), &ctx).unwrap_err();
        assert!(matches!(err, ExportError::MalformedSequence { ref node, .. } if node == "SEG1"));
    }

    #[test]
    fn test_segment_without_previous_station_is_malformed() {
        let ctx = TraversalContext::default();
        let err = segment_path(&segment(None), &ctx).unwrap_err();
        assert!(matches!(err, ExportError::MalformedSequence { ref node, .. } if node == "SEG1"));
    }

    #[test]
    fn test_segment_after_segment_is_malformed() {
        let a = station(1.0);
        let ctx = TraversalContext {
            previous_station: Some(&a),
            previous_path_kind: Some(NodeKind::Segment),
            ..Default::default()
        };
        assert!(segment_path(&segment(None), &ctx).is_err());
    }
}
