//! KML exporter.
//!
//! One `<Placemark>` per station (a point) and per segment (a tessellated
//! line string), wrapped in a `<Document>` titled with the plan's name or id
//! and preceded by the fixed `station`, `heading` and `segment` styles.

use super::xml::{XmlElement, write_document};
use super::{ExportError, PlanExporter, expect_segment, expect_station, segment_path};
use crate::document::{NodeKind, NodeRef, Plan, Station};
use crate::schema::{LonLat, Schema};
use crate::walker::{TransformSet, TraversalContext, walk};

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
const STATION_ICON: &str = "https://maps.google.com/mapfiles/kml/shapes/placemark_circle.png";
const HEADING_ICON: &str =
    "https://earth.google.com/images/kml-icons/track-directional/track-0.png";

/// KML (Google Earth) plan format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Kml;

impl PlanExporter for Kml {
    fn label(&self) -> &'static str {
        "kml"
    }

    fn content_type(&self) -> &'static str {
        "application/vnd.google-earth.kml+xml"
    }

    fn export(&self, plan: &Plan, _schema: &Schema) -> Result<Vec<u8>, ExportError> {
        let transforms = TransformSet::new()
            .on(NodeKind::Station, station_placemark)
            .on(NodeKind::Segment, segment_placemark);
        let placemarks = walk(plan, &transforms, &mut ())?;

        tracing::debug!(
            plan = plan.title(),
            placemarks = placemarks.len(),
            "exported kml"
        );
        write_document(&wrap_document(plan.title(), placemarks))
    }
}

fn station_placemark(
    _: &mut (),
    node: NodeRef<'_>,
    _: &TraversalContext<'_>,
) -> Result<XmlElement, ExportError> {
    let station = expect_station(node)?;
    let mut placemark = XmlElement::new("Placemark").text_child("name", station_name(station));

    match directional_heading(station) {
        Some(heading) => {
            placemark = placemark.text_child("styleUrl", "#heading").child(
                XmlElement::new("Style").child(
                    XmlElement::new("IconStyle").text_child("heading", heading.to_string()),
                ),
            );
        }
        None => placemark = placemark.text_child("styleUrl", "#station"),
    }

    Ok(placemark.child(
        XmlElement::new("Point").text_child("coordinates", coordinate(station.geometry)),
    ))
}

fn segment_placemark(
    _: &mut (),
    node: NodeRef<'_>,
    ctx: &TraversalContext<'_>,
) -> Result<XmlElement, ExportError> {
    let segment = expect_segment(node)?;
    let path = segment_path(segment, ctx)?;
    let coordinates: Vec<String> = path.into_iter().map(coordinate).collect();

    Ok(XmlElement::new("Placemark")
        .text_child("name", segment.id.as_deref().unwrap_or_default())
        .text_child("styleUrl", "#segment")
        .child(
            XmlElement::new("MultiGeometry").child(
                XmlElement::new("LineString")
                    .text_child("tessellate", "1")
                    .text_child("coordinates", coordinates.join(" ")),
            ),
        ))
}

/// Display name: the station's name, else the number after `STN` in its id.
fn station_name(station: &Station) -> String {
    let name = match station.name.as_deref().filter(|n| !n.is_empty()) {
        Some(name) => name,
        None => {
            let id = station.id.as_deref().unwrap_or_default();
            id.find("STN").map_or(id, |i| &id[i + 3..])
        }
    };
    format!("__{name}")
}

fn directional_heading(station: &Station) -> Option<f64> {
    if station.is_directional == Some(false) {
        return None;
    }
    station.heading_degrees.filter(|h| *h != 0.0)
}

fn coordinate(point: LonLat) -> String {
    format!("{},{}", point.lon, point.lat)
}

fn styles() -> Vec<XmlElement> {
    vec![
        XmlElement::new("Style").attr("id", "station").child(
            XmlElement::new("IconStyle")
                .text_child("scale", "0.85")
                .child(XmlElement::new("Icon").text_child("href", STATION_ICON)),
        ),
        XmlElement::new("Style").attr("id", "heading").child(
            XmlElement::new("IconStyle")
                .child(XmlElement::new("Icon").text_child("href", HEADING_ICON)),
        ),
        XmlElement::new("Style")
            .attr("id", "segment")
            .child(XmlElement::new("LineStyle").text_child("width", "2")),
    ]
}

fn wrap_document(title: &str, placemarks: Vec<XmlElement>) -> XmlElement {
    XmlElement::new("kml").attr("xmlns", KML_NAMESPACE).child(
        XmlElement::new("Document")
            .text_child("name", title)
            .children(styles())
            .children(placemarks),
    )
}
