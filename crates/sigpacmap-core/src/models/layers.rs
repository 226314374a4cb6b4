//! Tile/overlay layer parameters derived from configuration.
//!
//! The widget does not render tiles; it hands these specs to the host's
//! tile engine (base imagery layer plus the SIGPAC WMS overlay).

use serde::Serialize;

use crate::config::ResolvedConfig;

/// Parameters for the host's base imagery layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseLayerSpec {
    pub tile_url: String,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub attribution: Option<String>,
    /// Suppress the rendering library's own attribution prefix
    pub hide_default_attribution: bool,
}

impl BaseLayerSpec {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let options = &config.default_map_options;
        Self {
            tile_url: options.tile_url.clone(),
            min_zoom: options.min_zoom,
            max_zoom: options.max_zoom,
            attribution: options.attribution.clone(),
            hide_default_attribution: options.hide_leaflet_attribution,
        }
    }
}

/// WMS parameters for the SIGPAC parcel overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcelOverlaySpec {
    pub wms_url: String,
    pub layer_name: String,
    pub format: String,
    pub transparent: bool,
    pub version: String,
    pub tile_size: u32,
    pub opacity: f64,
    /// Parcels are only legible from this zoom level up
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl ParcelOverlaySpec {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            wms_url: config.sigpac_wms_url.clone(),
            layer_name: config.sigpac_layer_name.clone(),
            format: "image/png".to_string(),
            transparent: true,
            version: "1.3.0".to_string(),
            tile_size: 512,
            opacity: 0.7,
            min_zoom: config.min_zoom_feature,
            max_zoom: config.default_map_options.max_zoom,
        }
    }
}
