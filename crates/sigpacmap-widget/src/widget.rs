//! Per-map orchestration: configuration, wiring, and teardown.

use std::sync::Arc;

use serde_json::Value;

use sigpacmap_core::config::ResolvedConfig;
use sigpacmap_core::error::SetupError;
use sigpacmap_core::models::popup::PopupFields;
use sigpacmap_core::models::{
    BaseLayerSpec, FeatureSelected, InitialFeature, LatLng, ParcelOverlaySpec, ParcelRecord,
    PopupRow,
};
use sigpacmap_core::ports::{HostBridge, MapSurface, Presentation};
use sigpacmap_lookup::{HttpParcelEndpoint, LookupService, ParcelSource};

use crate::coordinator::{ClickCoordinator, ClickOutcome, InteractionState};
use crate::events::{FeatureBroadcaster, SubscriberId};

/// One SIGPAC-enabled map instance.
///
/// Owns the coordinator, the lookup service, and the broadcaster; the host
/// owns the rendering surface behind the injected ports. Dropping the
/// widget without calling [`MapWidget::destroy`] leaks nothing, but an
/// in-flight lookup would run to completion; `destroy` cancels it.
pub struct MapWidget<S, P, M> {
    config: Arc<ResolvedConfig>,
    coordinator: ClickCoordinator<S, P, M>,
    broadcaster: Arc<FeatureBroadcaster>,
    popup_fields: PopupFields,
}

impl<P, M> MapWidget<LookupService<HttpParcelEndpoint>, P, M>
where
    P: Presentation,
    M: MapSurface,
{
    /// Build a widget from caller configuration (a JSON tree).
    pub fn new(
        user_config: &Value,
        presentation: P,
        surface: M,
        bridge: Option<Arc<dyn HostBridge>>,
    ) -> Result<Self, SetupError> {
        let config = ResolvedConfig::resolve(user_config)?;
        Self::from_config(config, presentation, surface, bridge)
    }

    /// Build a widget from declarative JSON, as supplied by auto-init
    /// attributes. Malformed JSON fails this instance only.
    pub fn from_json_str(
        config_json: &str,
        presentation: P,
        surface: M,
        bridge: Option<Arc<dyn HostBridge>>,
    ) -> Result<Self, SetupError> {
        let config = ResolvedConfig::from_json_str(config_json)?;
        Self::from_config(config, presentation, surface, bridge)
    }

    /// Wire the production lookup stack around a resolved configuration.
    pub fn from_config(
        config: ResolvedConfig,
        presentation: P,
        surface: M,
        bridge: Option<Arc<dyn HostBridge>>,
    ) -> Result<Self, SetupError> {
        let source = LookupService::new(
            config.sigpac_coordinate_query_url.clone(),
            config.cache_config.clone(),
        )?;
        Ok(Self::from_parts(config, source, presentation, surface, bridge))
    }
}

impl<S, P, M> MapWidget<S, P, M>
where
    S: ParcelSource,
    P: Presentation,
    M: MapSurface,
{
    /// Wire a widget around a pre-built parcel source (tests, custom
    /// transports).
    pub fn from_parts(
        config: ResolvedConfig,
        source: S,
        presentation: P,
        surface: M,
        bridge: Option<Arc<dyn HostBridge>>,
    ) -> Self {
        let config = Arc::new(config);
        let broadcaster = Arc::new(FeatureBroadcaster::new(config.bridge.clone(), bridge));
        let popup_fields = match &config.popup_fields {
            Some(fields) => PopupFields::Static(fields.clone()),
            None => PopupFields::builtin(),
        };
        let coordinator = ClickCoordinator::new(
            config.clone(),
            source,
            presentation,
            surface,
            broadcaster.clone(),
        );

        tracing::info!(
            interaction_mode = ?config.interaction_mode,
            cache_enabled = config.cache_config.enabled,
            "sigpac map widget initialized"
        );

        Self {
            config,
            coordinator,
            broadcaster,
            popup_fields,
        }
    }

    /// Handle a click at these coordinates (debounced).
    pub async fn click(&self, lat: f64, lng: f64) -> ClickOutcome {
        self.coordinator.handle_click(LatLng::new(lat, lng)).await
    }

    pub fn state(&self) -> InteractionState {
        self.coordinator.state()
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Base imagery layer parameters for the host's tile engine.
    pub fn base_layer(&self) -> BaseLayerSpec {
        BaseLayerSpec::from_config(&self.config)
    }

    /// SIGPAC WMS overlay parameters for the host's tile engine.
    pub fn parcel_overlay(&self) -> ParcelOverlaySpec {
        ParcelOverlaySpec::from_config(&self.config)
    }

    /// Features the host should render at startup.
    pub fn initial_features(&self) -> &[InitialFeature] {
        &self.config.initial_features
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&FeatureSelected) + Send + Sync + 'static,
    ) -> SubscriberId {
        self.broadcaster.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.broadcaster.unsubscribe(id)
    }

    /// Replace the popup field configuration, e.g. with a callback.
    pub fn set_popup_fields(&mut self, fields: PopupFields) {
        self.popup_fields = fields;
    }

    /// Resolve popup rows for one record, honoring configured fields.
    /// Resolved fresh per record, never cached.
    pub fn popup_rows(&self, record: &ParcelRecord) -> Vec<PopupRow> {
        self.popup_fields.resolve(record)
    }

    /// Cancel in-flight work and detach all subscribers. Idempotent; after
    /// teardown clicks are ignored.
    pub fn destroy(&self) {
        self.coordinator.destroy();
        self.broadcaster.clear();
        tracing::debug!("sigpac map widget destroyed");
    }
}
