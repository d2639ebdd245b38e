pub mod geojson;
pub mod geometry;
pub mod measure;
pub mod points;
pub mod session;
pub mod units;

pub fn version() -> &'static str {
    "0.1.0"
}
