use serde::{Deserialize, Serialize};

/// A WGS 84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    /// Config arrays are `[lat, lng]`, matching the map-options `center`.
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}
