//! Pure derivation of path and region geometry from the current point
//! sequence. Stateless; recomputed in full on every mutation.

use crate::geometry::{PathGeometry, RegionGeometry};
use crate::points::PlacedPoint;

/// Build the connecting path over `points` in insertion order.
///
/// With fewer than 2 points the result is the empty (degenerate) path, not an
/// error; callers treat that as "no path to measure". When `close_ring` is
/// set the first coordinate is appended at the end.
pub fn derive_path(points: &[PlacedPoint], close_ring: bool) -> PathGeometry {
    if points.len() < 2 {
        return PathGeometry::default();
    }

    let mut coordinates: Vec<_> = points.iter().map(|p| p.coordinate).collect();
    if close_ring {
        coordinates.push(coordinates[0]);
    }
    PathGeometry { coordinates }
}

/// Build the enclosing ring over `points`, or `None` with 3 or fewer points.
///
/// The ring closes by repeating the first coordinate, so its length is always
/// point count + 1. Winding is not normalized; area primitives must accept
/// either orientation.
pub fn derive_region(points: &[PlacedPoint]) -> Option<RegionGeometry> {
    if points.len() <= 3 {
        return None;
    }

    let mut ring: Vec<_> = points.iter().map(|p| p.coordinate).collect();
    ring.push(ring[0]);
    Some(RegionGeometry { ring })
}
