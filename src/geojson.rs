//! GeoJSON output for hosts that feed a map source directly.
//!
//! The feature collection mirrors what the session draws: one Point feature
//! per placed point (its id in `properties`), a LineString for the connecting
//! path once it exists, and a Polygon for the enclosing region once enough
//! points are placed.

use crate::geometry::{LonLat, MeasureGeometry};
use crate::session::Snapshot;
use serde_json::{json, Value};

/// Build a GeoJSON FeatureCollection from a session snapshot.
pub fn feature_collection(snapshot: &Snapshot) -> Value {
    let mut features = Vec::with_capacity(snapshot.points.len() + 2);

    for point in &snapshot.points {
        features.push(feature(
            &MeasureGeometry::Point { coordinate: point.coordinate },
            json!({ "id": point.id }),
        ));
    }

    if !snapshot.path.is_degenerate() {
        features.push(feature(
            &MeasureGeometry::Path { coordinates: snapshot.path.coordinates.clone() },
            json!({}),
        ));
    }

    if let Some(region) = &snapshot.region {
        features.push(feature(
            &MeasureGeometry::Region { ring: region.ring.clone() },
            json!({}),
        ));
    }

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Wrap a geometry as a GeoJSON Feature.
pub fn feature(geometry: &MeasureGeometry, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": geometry_value(geometry),
        "properties": properties,
    })
}

fn geometry_value(geometry: &MeasureGeometry) -> Value {
    match geometry {
        MeasureGeometry::Point { coordinate } => json!({
            "type": "Point",
            "coordinates": coordinate.to_array(),
        }),
        MeasureGeometry::Path { coordinates } => json!({
            "type": "LineString",
            "coordinates": positions(coordinates),
        }),
        MeasureGeometry::Region { ring } => json!({
            "type": "Polygon",
            "coordinates": [positions(ring)],
        }),
    }
}

fn positions(coordinates: &[LonLat]) -> Vec<[f64; 2]> {
    coordinates.iter().map(LonLat::to_array).collect()
}
