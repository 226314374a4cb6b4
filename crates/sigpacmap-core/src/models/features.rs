//! Features the host renders at startup, declared in configuration.

use serde::{Deserialize, Serialize};

/// A feature placed on the map when the widget initializes.
///
/// Parsed leniently from the `initialFeatures` config array: malformed
/// entries are skipped with a warning so one bad feature never blocks the
/// rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InitialFeature {
    Marker {
        /// `[lat, lng]`
        coordinates: [f64; 2],
        #[serde(default)]
        popup_content: Option<String>,
    },
    Wkt {
        /// WKT outline to render
        data: String,
        #[serde(default)]
        popup_content: Option<String>,
    },
}
