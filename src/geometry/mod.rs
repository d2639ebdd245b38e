//! Geometry types shared across the measurement session.
//!
//! Coordinates are geographic (longitude, latitude) pairs in the convention
//! of the measurement primitives; no projection or normalization happens in
//! this crate.

use serde::{Deserialize, Serialize};

pub mod derive;
pub use derive::{derive_path, derive_region};

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn from_array(arr: [f64; 2]) -> Self {
        Self { lon: arr[0], lat: arr[1] }
    }

    pub fn to_array(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl From<[f64; 2]> for LonLat {
    fn from(arr: [f64; 2]) -> Self {
        Self::from_array(arr)
    }
}

/// Ordered coordinate sequence connecting placed points in insertion order.
///
/// Closed (first coordinate duplicated at the end) only after the session is
/// finalized. Degenerate (empty) below 2 points: there is no path to measure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathGeometry {
    pub coordinates: Vec<LonLat>,
}

impl PathGeometry {
    pub fn is_degenerate(&self) -> bool {
        self.coordinates.len() < 2
    }
}

/// Single closed ring over the placed points, present only once more than 3
/// points exist. Ring length is always point count + 1 (first coordinate
/// repeated at the end); winding is whatever insertion order implies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionGeometry {
    pub ring: Vec<LonLat>,
}

/// Tagged geometry variant for rendering output, carrying only the fields
/// relevant to each shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeasureGeometry {
    Point { coordinate: LonLat },
    Path { coordinates: Vec<LonLat> },
    Region { ring: Vec<LonLat> },
}
