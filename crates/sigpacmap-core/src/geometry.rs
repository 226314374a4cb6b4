//! WKT geometry helpers.
//!
//! Parcel records carry their outline as WKT. Hosts that render outlines or
//! fit the view to a parcel use these conversions; the widget core itself
//! never draws.

use std::str::FromStr;

use geo::{BoundingRect, Centroid, Geometry};
use wkt::Wkt;

use crate::error::GeometryError;
use crate::models::LatLng;

/// Parse a WKT string into a geometry.
pub fn parse_wkt(text: &str) -> Result<Geometry<f64>, GeometryError> {
    let parsed = Wkt::<f64>::from_str(text).map_err(|e| GeometryError::InvalidWkt {
        reason: e.to_string(),
    })?;
    Geometry::try_from(parsed).map_err(|e| GeometryError::InvalidWkt {
        reason: e.to_string(),
    })
}

/// Centroid of a geometry as a coordinate pair. WKT axis order is x=lng,
/// y=lat.
pub fn centroid(geometry: &Geometry<f64>) -> Option<LatLng> {
    geometry.centroid().map(|p| LatLng::new(p.y(), p.x()))
}

/// Bounding box as (south-west, north-east) corners, for host-side
/// fit-to-bounds.
pub fn bounding_box(geometry: &Geometry<f64>) -> Option<(LatLng, LatLng)> {
    let rect = geometry.bounding_rect()?;
    Some((
        LatLng::new(rect.min().y, rect.min().x),
        LatLng::new(rect.max().y, rect.max().x),
    ))
}
