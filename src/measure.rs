//! Measurement over derived geometry.
//!
//! The length/area primitives are external collaborators reached through the
//! `MeasurePrimitives` trait; `GeodesicPrimitives` is the default backend,
//! wrapping the `geo` crate. The engine owns unit conversion so the
//! primitives stay unit-agnostic: lengths cross the trait in meters, areas in
//! square meters.

use crate::geometry::{LonLat, PathGeometry, RegionGeometry};
use crate::units::LengthUnit;
use geo::{Coord, GeodesicArea, HaversineLength, LineString, Polygon};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a measurement primitive on malformed geometry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PrimitiveError {
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),
}

/// Result type for measurement operations.
pub type MeasureResult<T> = Result<T, PrimitiveError>;

/// Abstract interface for the external length/area primitives.
///
/// Implementations must be pure over the given geometry. Area must accept
/// arbitrary ring winding and return a non-negative magnitude.
pub trait MeasurePrimitives: Send + Sync {
    /// Length of a path in meters.
    fn path_length(&self, path: &PathGeometry) -> MeasureResult<f64>;

    /// Enclosed area of a closed ring in square meters.
    fn ring_area(&self, region: &RegionGeometry) -> MeasureResult<f64>;
}

/// Default backend: haversine length and unsigned geodesic area from `geo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeodesicPrimitives;

impl MeasurePrimitives for GeodesicPrimitives {
    fn path_length(&self, path: &PathGeometry) -> MeasureResult<f64> {
        let line = to_line_string(&path.coordinates)?;
        Ok(line.haversine_length())
    }

    fn ring_area(&self, region: &RegionGeometry) -> MeasureResult<f64> {
        let ring = to_line_string(&region.ring)?;
        let polygon = Polygon::new(ring, Vec::new());
        Ok(polygon.geodesic_area_unsigned())
    }
}

fn to_line_string(coordinates: &[LonLat]) -> MeasureResult<LineString<f64>> {
    for c in coordinates {
        if !c.lon.is_finite() || !c.lat.is_finite() {
            return Err(PrimitiveError::MalformedGeometry(format!(
                "non-finite coordinate ({}, {})",
                c.lon, c.lat
            )));
        }
    }
    Ok(LineString::new(
        coordinates.iter().map(|c| Coord { x: c.lon, y: c.lat }).collect(),
    ))
}

/// The running totals reported to the host after every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// Path length in the configured unit. 0 below 2 points.
    pub total_length: f64,
    /// Region area in square meters. 0 while the region is absent.
    pub total_area: f64,
}

/// Converts derived geometries into reported scalars.
#[derive(Debug, Clone)]
pub struct MeasureEngine<P = GeodesicPrimitives> {
    primitives: P,
    unit: LengthUnit,
}

impl MeasureEngine<GeodesicPrimitives> {
    pub fn geodesic(unit: LengthUnit) -> Self {
        Self::new(GeodesicPrimitives, unit)
    }
}

impl<P: MeasurePrimitives> MeasureEngine<P> {
    pub fn new(primitives: P, unit: LengthUnit) -> Self {
        Self { primitives, unit }
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// Path length in the configured unit. A degenerate path reports 0
    /// without invoking the primitive, which is not defined below 2 points.
    pub fn length(&self, path: &PathGeometry) -> MeasureResult<f64> {
        if path.is_degenerate() {
            return Ok(0.0);
        }
        let meters = self.primitives.path_length(path)?;
        Ok(self.unit.from_meters(meters))
    }

    /// Region area in square meters; 0 while the region is absent.
    pub fn area(&self, region: Option<&RegionGeometry>) -> MeasureResult<f64> {
        match region {
            None => Ok(0.0),
            Some(region) => self.primitives.ring_area(region),
        }
    }

    pub fn measure(
        &self,
        path: &PathGeometry,
        region: Option<&RegionGeometry>,
    ) -> MeasureResult<Measurement> {
        Ok(Measurement {
            total_length: self.length(path)?,
            total_area: self.area(region)?,
        })
    }
}
