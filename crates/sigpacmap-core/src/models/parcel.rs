//! Normalized SIGPAC parcel records.
//!
//! The coordinate query service returns a JSON array of raw objects whose
//! fields may be absent, null, numeric or string-typed depending on the
//! parcel. Normalization maps every non-identifying field to the `"N/A"`
//! sentinel when missing; the identifying triplet (poligono, parcela,
//! recinto) and the geometry (wkt, srid) pass through unmodified.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::LatLng;

/// Sentinel for upstream fields with no usable value.
pub const NOT_AVAILABLE: &str = "N/A";

/// A normalized parcel record from the SIGPAC registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelRecord {
    /// Province
    pub provincia: String,
    /// Municipality
    pub municipio: String,
    /// Zone, 0 when the registry omits it
    pub zona: i64,
    /// Polygon id (identifying, pass-through)
    pub poligono: Option<String>,
    /// Parcel id (identifying, pass-through)
    pub parcela: Option<String>,
    /// Enclosure id (identifying, pass-through)
    pub recinto: Option<String>,
    /// SIGPAC land-use code
    pub uso: String,
    /// Surface in hectares, two decimals (raw `dn_surface` is m²)
    pub superficie: String,
    /// Mean slope
    pub pendiente: String,
    /// Irrigation coefficient of the enclosure
    pub regadio: String,
    /// Registered incidents
    pub incidencias: String,
    /// Eligibility percentage for pasture enclosures
    pub admisibilidad: String,
    /// Parcel outline in WKT (pass-through)
    pub wkt: Option<String>,
    /// Spatial reference id of the WKT outline (pass-through)
    pub srid: Option<i64>,
}

impl ParcelRecord {
    /// Normalize one raw response object into a record.
    ///
    /// Total: any shape of input yields a record, falling back to sentinels.
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            provincia: text_or_na(raw.get("provincia")),
            municipio: text_or_na(raw.get("municipio")),
            zona: raw.get("zona").and_then(Value::as_i64).unwrap_or(0),
            poligono: text_opt(raw.get("poligono")),
            parcela: text_opt(raw.get("parcela")),
            recinto: text_opt(raw.get("recinto")),
            uso: text_or_na(raw.get("uso_sigpac")),
            superficie: surface_hectares(raw.get("dn_surface")),
            pendiente: text_or_na(raw.get("pendiente_media")),
            regadio: text_or_na(raw.get("coef_regadio")),
            incidencias: text_or_na(raw.get("incidencias")),
            admisibilidad: text_or_na(raw.get("admisibilidad")),
            wkt: raw.get("wkt").and_then(Value::as_str).map(str::to_owned),
            srid: raw.get("srid").and_then(Value::as_i64),
        }
    }

    /// Short marker/tooltip title for this parcel.
    pub fn title(&self) -> String {
        format!(
            "Parcela SIGPAC: {}-{}",
            self.poligono.as_deref().unwrap_or(NOT_AVAILABLE),
            self.parcela.as_deref().unwrap_or(NOT_AVAILABLE)
        )
    }
}

/// Payload published to subscribers and the host bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSelected {
    pub data: ParcelRecord,
    /// `[lat, lng]` of the originating click
    pub coordinates: [f64; 2],
}

impl FeatureSelected {
    pub fn new(data: ParcelRecord, coords: LatLng) -> Self {
        Self {
            data,
            coordinates: [coords.lat, coords.lng],
        }
    }
}

/// Identifying fields pass through: string or number becomes a string,
/// everything else stays absent.
fn text_opt(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-identifying fields clamp to the sentinel. Empty strings and zero
/// count as missing, matching the registry's use of falsy placeholders.
fn text_or_na(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => {
            if n.as_f64().map(|v| v != 0.0).unwrap_or(false) {
                n.to_string()
            } else {
                NOT_AVAILABLE.to_string()
            }
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Raw `dn_surface` is square meters; hectares with two decimals.
fn surface_hectares(value: Option<&Value>) -> String {
    let Some(raw) = value.and_then(Value::as_f64) else {
        return NOT_AVAILABLE.to_string();
    };
    if raw == 0.0 || !raw.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}", raw / 10_000.0)
}
