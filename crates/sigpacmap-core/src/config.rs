//! Layered widget configuration.
//!
//! Resolution merges three JSON layers, low to high precedence: built-in
//! defaults, optional deployment defaults (TOML file), caller overrides.
//! Legacy flat map keys (`zoom`, `minZoom`, `tileUrl`, ...) found at the top
//! level of a layer are relocated into the nested `defaultMapOptions`
//! object; the caller's own nested object wins over its relocated flat keys,
//! which win over defaults. Unknown keys pass through untouched.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ConfigError;
use crate::models::features::InitialFeature;
use crate::models::popup::PopupFieldSpec;

/// Top-level keys relocated into `defaultMapOptions` when found flat.
///
/// `interactionMode` and `popupFields` are behavioral keys and stay at the
/// top level.
const MAP_OPTION_KEYS: [&str; 7] = [
    "minZoom",
    "maxZoom",
    "center",
    "zoom",
    "tileUrl",
    "attribution",
    "hideLeafletAttribution",
];

/// How a resolved parcel is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Popup,
    Marker,
}

/// Nested map options handed to the host's map construction.
///
/// Always contains every default key, whatever the caller supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    /// Initial view center, `[lat, lng]`
    pub center: [f64; 2],
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub tile_url: String,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub hide_leaflet_attribution: bool,
    /// Unknown map options, passed through to the host untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Coordinate cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSettings {
    #[serde(default = "defaults::cache_enabled")]
    pub enabled: bool,
    /// Entry time-to-live in milliseconds
    #[serde(default = "defaults::cache_ttl")]
    pub ttl: u64,
    #[serde(default = "defaults::cache_max_size")]
    pub max_size: usize,
    /// Decimal digits kept when rounding coordinates into cache keys
    #[serde(default = "defaults::cache_precision")]
    pub precision: u32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: defaults::cache_enabled(),
            ttl: defaults::cache_ttl(),
            max_size: defaults::cache_max_size(),
            precision: defaults::cache_precision(),
        }
    }
}

/// Host bridge settings for the feature-selected broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "defaults::bridge_event_name")]
    pub event_name: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            event_name: defaults::bridge_event_name(),
        }
    }
}

/// Fully resolved, immutable widget configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub debug: bool,
    pub click_enabled: bool,
    pub interaction_mode: InteractionMode,
    /// Minimum zoom at which clicks trigger a parcel lookup
    pub min_zoom_feature: f64,
    /// Click coalescing window in milliseconds
    pub debounce_ms: u64,
    /// Optional delay between closing one transient visual and opening the
    /// next, letting the rendering surface settle
    pub visual_settle_ms: u64,
    pub sigpac_wms_url: String,
    pub sigpac_layer_name: String,
    pub sigpac_coordinate_query_url: String,
    pub marker_icon_url: String,
    #[serde(default, deserialize_with = "deserialize_initial_features")]
    pub initial_features: Vec<InitialFeature>,
    /// Static popup field list; `None` selects the built-in list
    #[serde(default)]
    pub popup_fields: Option<Vec<PopupFieldSpec>>,
    pub default_map_options: MapOptions,
    pub cache_config: CacheSettings,
    pub bridge: BridgeSettings,
    /// Unknown top-level keys, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResolvedConfig {
    /// Built-in defaults as a JSON tree, the lowest-precedence layer.
    pub fn default_value() -> Value {
        json!({
            "debug": false,
            "clickEnabled": true,
            "interactionMode": "popup",
            "minZoomFeature": 12.0,
            "debounceMs": 300,
            "visualSettleMs": 0,
            "sigpacWmsUrl": "https://sigpac-hubcloud.es/wms",
            "sigpacLayerName": "recinto",
            "sigpacCoordinateQueryUrl": "https://sigpac-hubcloud.es/servicioconsultassigpac/query/recinfobypoint/",
            "markerIconUrl": "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/images/marker-icon.png",
            "initialFeatures": [],
            "popupFields": null,
            "defaultMapOptions": {
                "center": [40.416775, -3.703790],
                "zoom": 13.0,
                "maxZoom": 19.0,
                "minZoom": 5.0,
                "tileUrl": "https://tms-pnoa-ma.idee.es/1.0.0/pnoa-ma/{z}/{x}/{-y}.jpeg",
                "attribution": "<a href=\"https://www.scne.es/\">CC BY 4.0 scne.es</a>",
                "hideLeafletAttribution": false,
            },
            "cacheConfig": {
                "enabled": true,
                "ttl": 300000,
                "maxSize": 100,
                "precision": 4,
            },
            "bridge": {
                "enabled": false,
                "eventName": "sigpacFeatureSelected",
            },
        })
    }

    /// Resolve caller configuration over the built-in defaults.
    ///
    /// The input is not mutated; resolution builds a new tree.
    pub fn resolve(user: &Value) -> Result<Self, ConfigError> {
        Self::resolve_layers(None, user)
    }

    /// Resolve with a deployment-defaults TOML file between the built-in
    /// defaults and the caller overrides.
    pub fn resolve_with_deployment_file(path: &Path, user: &Value) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::DeploymentFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let deployment: Value =
            toml::from_str(&content).map_err(|e| ConfigError::DeploymentFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Self::resolve_layers(Some(&deployment), user)
    }

    /// Parse declarative JSON configuration, as supplied by auto-init
    /// attributes. Malformed JSON is an error, never a panic.
    pub fn from_json_str(config_json: &str) -> Result<Self, ConfigError> {
        let user: Value = serde_json::from_str(config_json).map_err(|e| ConfigError::Malformed {
            reason: e.to_string(),
        })?;
        Self::resolve(&user)
    }

    fn resolve_layers(deployment: Option<&Value>, user: &Value) -> Result<Self, ConfigError> {
        let mut merged = match Self::default_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Some(layer) = deployment {
            merge_layer(&mut merged, layer);
        }
        merge_layer(&mut merged, user);

        serde_json::from_value(Value::Object(merged)).map_err(|e| ConfigError::Malformed {
            reason: e.to_string(),
        })
    }
}

/// Merge one configuration layer over the accumulated tree.
///
/// Top-level keys shallow-merge; whitelist keys relocate into
/// `defaultMapOptions`; the layer's own nested object has the last word.
fn merge_layer(base: &mut Map<String, Value>, layer: &Value) {
    let Some(layer_obj) = layer.as_object() else {
        // A non-object layer has nothing to merge.
        return;
    };

    let mut top = layer_obj.clone();
    let nested_layer = top.remove("defaultMapOptions");

    let mut relocated = Map::new();
    for key in MAP_OPTION_KEYS {
        if let Some(value) = top.remove(key) {
            relocated.insert(key.to_string(), value);
        }
    }

    for (key, value) in top {
        base.insert(key, value);
    }

    let nested = base
        .entry("defaultMapOptions")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(nested_obj) = nested.as_object_mut() {
        for (key, value) in relocated {
            nested_obj.insert(key, value);
        }
        if let Some(layer_nested) = nested_layer.as_ref().and_then(Value::as_object) {
            for (key, value) in layer_nested {
                nested_obj.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Lenient `initialFeatures` parsing: malformed entries are skipped with a
/// warning so one bad feature never fails the whole configuration.
fn deserialize_initial_features<'de, D>(deserializer: D) -> Result<Vec<InitialFeature>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            tracing::warn!("initialFeatures is not an array, ignoring");
        }
        return Ok(Vec::new());
    };

    let mut features = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<InitialFeature>(item.clone()) {
            Ok(feature) => features.push(feature),
            Err(error) => {
                tracing::warn!(error = %error, "skipping malformed initial feature");
            }
        }
    }
    Ok(features)
}

mod defaults {
    pub fn cache_enabled() -> bool {
        true
    }

    pub fn cache_ttl() -> u64 {
        300_000
    }

    pub fn cache_max_size() -> usize {
        100
    }

    pub fn cache_precision() -> u32 {
        4
    }

    pub fn bridge_event_name() -> String {
        "sigpacFeatureSelected".to_string()
    }
}
