use serde::{Deserialize, Serialize};
use std::fmt;

/// Reporting unit for path length. Resolved once at session creation;
/// affects only the reported scalar, never the stored geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Kilometers,
    Miles,
}

pub const METERS_PER_MILE: f64 = 1609.344;

impl LengthUnit {
    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            Self::Kilometers => meters / 1000.0,
            Self::Miles => meters / METERS_PER_MILE,
        }
    }

    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            Self::Kilometers => value * 1000.0,
            Self::Miles => value * METERS_PER_MILE,
        }
    }
}

impl Default for LengthUnit {
    fn default() -> Self {
        Self::Kilometers
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kilometers => write!(f, "km"),
            Self::Miles => write!(f, "mi"),
        }
    }
}
