//! Click handling: debounce, cancellation, and the lookup state machine.
//!
//! One coordinator per map instance owns the single in-flight-request
//! invariant. Rapid clicks are coalesced inside the debounce window; a
//! click that does get processed cancels whatever lookup is still running
//! before starting its own. Cancellation is cooperative and silent: the
//! superseded lookup's result is discarded, never surfaced as an error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use sigpacmap_core::config::ResolvedConfig;
use sigpacmap_core::error::LookupError;
use sigpacmap_core::models::{LatLng, ParcelRecord};
use sigpacmap_core::ports::{MapSurface, Presentation};
use sigpacmap_lookup::ParcelSource;

use crate::events::FeatureBroadcaster;

/// Lifecycle of one click's lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// What became of one click.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Interaction disabled or the widget was torn down
    Ignored,
    /// Coalesced away by a newer click inside the debounce window
    Superseded,
    /// In-flight lookup cancelled by a newer click
    Cancelled,
    /// Zoom guard rejected the click before any lookup
    BelowMinZoom,
    /// Lookup succeeded but no parcel covers the location
    NoParcel,
    Resolved(ParcelRecord),
    /// Lookup failed; carries the user-facing message
    Failed(String),
}

struct InFlight {
    id: u64,
    token: CancellationToken,
    coords: LatLng,
}

/// Interaction controller for one map instance.
pub struct ClickCoordinator<S, P, M> {
    config: Arc<ResolvedConfig>,
    source: S,
    presentation: P,
    surface: M,
    broadcaster: Arc<FeatureBroadcaster>,
    shutdown: CancellationToken,
    clicks: AtomicU64,
    requests: AtomicU64,
    in_flight: Mutex<Option<InFlight>>,
    state: Mutex<InteractionState>,
}

impl<S, P, M> ClickCoordinator<S, P, M>
where
    S: ParcelSource,
    P: Presentation,
    M: MapSurface,
{
    pub fn new(
        config: Arc<ResolvedConfig>,
        source: S,
        presentation: P,
        surface: M,
        broadcaster: Arc<FeatureBroadcaster>,
    ) -> Self {
        Self {
            config,
            source,
            presentation,
            surface,
            broadcaster,
            shutdown: CancellationToken::new(),
            clicks: AtomicU64::new(0),
            requests: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            state: Mutex::new(InteractionState::Idle),
        }
    }

    /// Current interaction state, for observability and tests.
    pub fn state(&self) -> InteractionState {
        *self.state.lock().unwrap()
    }

    /// Tear down: cancel any in-flight lookup and refuse further clicks.
    /// Idempotent.
    pub fn destroy(&self) {
        self.shutdown.cancel();
        if let Some(current) = self.in_flight.lock().unwrap().take() {
            current.token.cancel();
        }
    }

    /// Handle one map click.
    ///
    /// Debounces first: the call sleeps through the configured window and
    /// proceeds only if no newer click arrived meanwhile, so only the last
    /// click of a burst performs a lookup.
    pub async fn handle_click(&self, coords: LatLng) -> ClickOutcome {
        if !self.config.click_enabled || self.shutdown.is_cancelled() {
            return ClickOutcome::Ignored;
        }

        let click = self.clicks.fetch_add(1, Ordering::SeqCst) + 1;
        let window = Duration::from_millis(self.config.debounce_ms);
        if !window.is_zero() {
            tokio::time::sleep(window).await;
        }
        if self.clicks.load(Ordering::SeqCst) != click {
            return ClickOutcome::Superseded;
        }
        if self.shutdown.is_cancelled() {
            return ClickOutcome::Ignored;
        }

        self.process_click(coords).await
    }

    async fn process_click(&self, coords: LatLng) -> ClickOutcome {
        tracing::debug!(lat = coords.lat, lng = coords.lng, "processing map click");

        let id = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        {
            let mut slot = self.in_flight.lock().unwrap();
            if let Some(previous) = slot.take() {
                tracing::debug!(
                    lat = previous.coords.lat,
                    lng = previous.coords.lng,
                    "cancelling superseded lookup"
                );
                previous.token.cancel();
            }
            *slot = Some(InFlight {
                id,
                token: token.clone(),
                coords,
            });
        }

        let zoom = self.surface.current_zoom();
        if zoom < self.config.min_zoom_feature {
            self.clear_in_flight(id);
            self.set_state(InteractionState::Error);
            let message = format!(
                "Zoom in to level {}+ to view SIGPAC parcels",
                self.config.min_zoom_feature
            );
            self.presentation.show_error(coords, &message);
            return ClickOutcome::BelowMinZoom;
        }

        self.set_state(InteractionState::Loading);
        self.presentation.show_loading(coords);

        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                // Torn down mid-flight: nothing may observe state anymore.
                return ClickOutcome::Ignored;
            }
            _ = token.cancelled() => {
                // Superseded: silent abort, visuals are the successor's to
                // clean up.
                self.set_state(InteractionState::Idle);
                return ClickOutcome::Cancelled;
            }
            result = self.source.fetch_by_coordinates(coords) => result,
        };

        self.clear_in_flight(id);

        match result {
            Ok(Some(record)) => {
                self.presentation.clear_transient_visuals();
                let settle = Duration::from_millis(self.config.visual_settle_ms);
                if !settle.is_zero() {
                    tokio::time::sleep(settle).await;
                }
                self.set_state(InteractionState::Success);
                self.presentation.show_result(&record, coords);
                self.broadcaster.notify_feature_selected(&record, coords);
                ClickOutcome::Resolved(record)
            }
            Ok(None) => {
                self.set_state(InteractionState::Error);
                self.presentation
                    .show_error(coords, "No SIGPAC parcels found at this location");
                ClickOutcome::NoParcel
            }
            Err(error) => {
                tracing::warn!(error = %error, "parcel lookup failed");
                self.set_state(InteractionState::Error);
                let message = user_message(&error);
                self.presentation.show_error(coords, &message);
                ClickOutcome::Failed(message)
            }
        }
    }

    fn set_state(&self, state: InteractionState) {
        *self.state.lock().unwrap() = state;
    }

    /// Drop the in-flight handle, but only if it still belongs to this
    /// request; a successor may already have replaced it.
    fn clear_in_flight(&self, id: u64) {
        let mut slot = self.in_flight.lock().unwrap();
        if slot.as_ref().map(|current| current.id == id).unwrap_or(false) {
            *slot = None;
        }
    }
}

/// Map a lookup failure to the user-facing message.
fn user_message(error: &LookupError) -> String {
    match error {
        LookupError::Http { status: 404, .. } => {
            "Parcel not found in the SIGPAC registry".to_string()
        }
        LookupError::Http { status: 400, .. } => {
            "Invalid coordinates for SIGPAC query".to_string()
        }
        LookupError::Http { status, .. } if *status >= 500 => "SIGPAC server error".to_string(),
        _ => "Error fetching parcel data".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{RecordingPresentation, VisualEvent};
    use async_trait::async_trait;
    use serde_json::json;
    use sigpacmap_core::config::BridgeSettings;
    use std::sync::atomic::AtomicUsize;

    struct StubSource {
        calls: AtomicUsize,
        delay: Duration,
        response: Result<Option<ParcelRecord>, StubError>,
    }

    /// Cloneable stand-in so the stub can hand out fresh LookupErrors.
    #[derive(Clone)]
    enum StubError {
        Http(u16),
        Network,
    }

    impl StubSource {
        fn returning(response: Option<ParcelRecord>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                response: Ok(response),
            }
        }

        fn failing(error: StubError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                response: Err(error),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ParcelSource for StubSource {
        async fn fetch_by_coordinates(
            &self,
            _coords: LatLng,
        ) -> Result<Option<ParcelRecord>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.response {
                Ok(record) => Ok(record.clone()),
                Err(StubError::Http(status)) => Err(LookupError::Http {
                    status: *status,
                    body_prefix: "stub".to_string(),
                }),
                Err(StubError::Network) => Err(LookupError::Network {
                    reason: "connection refused".to_string(),
                }),
            }
        }
    }

    struct FixedZoom(f64);

    impl MapSurface for FixedZoom {
        fn current_zoom(&self) -> f64 {
            self.0
        }
    }

    fn record() -> ParcelRecord {
        ParcelRecord::from_raw(&json!({ "poligono": "28", "parcela": "15", "dn_surface": 12000 }))
    }

    fn config(overrides: serde_json::Value) -> Arc<ResolvedConfig> {
        Arc::new(ResolvedConfig::resolve(&overrides).unwrap())
    }

    fn broadcaster() -> Arc<FeatureBroadcaster> {
        Arc::new(FeatureBroadcaster::new(BridgeSettings::default(), None))
    }

    type TestCoordinator =
        ClickCoordinator<Arc<StubSource>, Arc<RecordingPresentation>, FixedZoom>;

    fn coordinator(
        overrides: serde_json::Value,
        source: Arc<StubSource>,
        zoom: f64,
    ) -> (Arc<TestCoordinator>, Arc<RecordingPresentation>, Arc<FeatureBroadcaster>) {
        let presentation = Arc::new(RecordingPresentation::new());
        let events = broadcaster();
        let coordinator = Arc::new(ClickCoordinator::new(
            config(overrides),
            source,
            presentation.clone(),
            FixedZoom(zoom),
            events.clone(),
        ));
        (coordinator, presentation, events)
    }

    #[tokio::test]
    async fn test_success_flow() {
        let source = Arc::new(StubSource::returning(Some(record())));
        let (coordinator, presentation, events) =
            coordinator(json!({ "debounceMs": 0 }), source.clone(), 15.0);

        let selected = Arc::new(AtomicUsize::new(0));
        let counter = selected.clone();
        events.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let coords = LatLng::new(37.718, -0.874);
        let outcome = coordinator.handle_click(coords).await;

        assert_eq!(outcome, ClickOutcome::Resolved(record()));
        assert_eq!(coordinator.state(), InteractionState::Success);
        assert_eq!(selected.load(Ordering::SeqCst), 1);

        let events = presentation.events();
        assert_eq!(
            events,
            vec![
                VisualEvent::Loading { coords },
                VisualEvent::Cleared,
                VisualEvent::Result {
                    record: record(),
                    coords
                },
            ]
        );
        assert_eq!(presentation.transient_visual(), None);
    }

    #[tokio::test]
    async fn test_debounce_coalesces_rapid_clicks() {
        let source = Arc::new(StubSource::returning(Some(record())));
        let (coordinator, presentation, _) =
            coordinator(json!({ "debounceMs": 40 }), source.clone(), 15.0);

        let first_coords = LatLng::new(1.0, 1.0);
        let second_coords = LatLng::new(2.0, 2.0);

        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.handle_click(first_coords).await })
        };
        tokio::time::sleep(Duration::from_millis(15)).await;
        let second = coordinator.handle_click(second_coords).await;

        assert_eq!(first.await.unwrap(), ClickOutcome::Superseded);
        assert_eq!(second, ClickOutcome::Resolved(record()));
        assert_eq!(source.calls(), 1);

        // Only the surviving click produced visuals, at its coordinates.
        assert!(matches!(
            presentation.events().first(),
            Some(VisualEvent::Loading { coords }) if *coords == second_coords
        ));
    }

    #[tokio::test]
    async fn test_new_click_cancels_in_flight_lookup() {
        let source =
            Arc::new(StubSource::returning(Some(record())).with_delay(Duration::from_millis(100)));
        let (coordinator, presentation, _) =
            coordinator(json!({ "debounceMs": 0 }), source.clone(), 15.0);

        let first_coords = LatLng::new(1.0, 1.0);
        let second_coords = LatLng::new(2.0, 2.0);

        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.handle_click(first_coords).await })
        };
        // Let the first lookup reach its network await.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = coordinator.handle_click(second_coords).await;

        assert_eq!(first.await.unwrap(), ClickOutcome::Cancelled);
        assert_eq!(second, ClickOutcome::Resolved(record()));
        assert_eq!(source.calls(), 2);
        assert_eq!(coordinator.state(), InteractionState::Success);

        // The displayed result belongs to the second click.
        let last = presentation.events().into_iter().last().unwrap();
        assert!(matches!(
            last,
            VisualEvent::Result { coords, .. } if coords == second_coords
        ));
    }

    #[tokio::test]
    async fn test_zoom_guard_blocks_lookup() {
        let source = Arc::new(StubSource::returning(Some(record())));
        let (coordinator, presentation, _) =
            coordinator(json!({ "debounceMs": 0 }), source.clone(), 10.0);

        let outcome = coordinator.handle_click(LatLng::new(1.0, 1.0)).await;

        assert_eq!(outcome, ClickOutcome::BelowMinZoom);
        assert_eq!(coordinator.state(), InteractionState::Error);
        assert_eq!(source.calls(), 0);

        let events = presentation.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            VisualEvent::Error { message, .. } if message.contains("level 12+")
        ));
    }

    #[tokio::test]
    async fn test_no_parcel_found() {
        let source = Arc::new(StubSource::returning(None));
        let (coordinator, presentation, _) =
            coordinator(json!({ "debounceMs": 0 }), source, 15.0);

        let outcome = coordinator.handle_click(LatLng::new(1.0, 1.0)).await;

        assert_eq!(outcome, ClickOutcome::NoParcel);
        assert_eq!(coordinator.state(), InteractionState::Error);
        assert!(matches!(
            presentation.events().last(),
            Some(VisualEvent::Error { message, .. })
                if message == "No SIGPAC parcels found at this location"
        ));
    }

    #[tokio::test]
    async fn test_error_message_classification() {
        for (error, expected) in [
            (StubError::Http(404), "Parcel not found in the SIGPAC registry"),
            (StubError::Http(400), "Invalid coordinates for SIGPAC query"),
            (StubError::Http(500), "SIGPAC server error"),
            (StubError::Http(503), "SIGPAC server error"),
            (StubError::Network, "Error fetching parcel data"),
        ] {
            let source = Arc::new(StubSource::failing(error));
            let (coordinator, _, _) = coordinator(json!({ "debounceMs": 0 }), source, 15.0);

            let outcome = coordinator.handle_click(LatLng::new(1.0, 1.0)).await;
            assert_eq!(outcome, ClickOutcome::Failed(expected.to_string()));
            assert_eq!(coordinator.state(), InteractionState::Error);
        }
    }

    #[tokio::test]
    async fn test_error_updates_placeholder_instead_of_removing() {
        let source = Arc::new(StubSource::failing(StubError::Http(500)));
        let (coordinator, presentation, _) =
            coordinator(json!({ "debounceMs": 0 }), source, 15.0);

        let coords = LatLng::new(1.0, 1.0);
        coordinator.handle_click(coords).await;

        // Loading then error, never a clear: the placeholder becomes the
        // error visual.
        assert_eq!(
            presentation.events(),
            vec![
                VisualEvent::Loading { coords },
                VisualEvent::Error {
                    coords,
                    message: "SIGPAC server error".to_string()
                },
            ]
        );
        assert_eq!(presentation.transient_visual(), Some(coords));
    }

    #[tokio::test]
    async fn test_click_disabled_is_ignored() {
        let source = Arc::new(StubSource::returning(Some(record())));
        let (coordinator, presentation, _) = coordinator(
            json!({ "debounceMs": 0, "clickEnabled": false }),
            source.clone(),
            15.0,
        );

        let outcome = coordinator.handle_click(LatLng::new(1.0, 1.0)).await;

        assert_eq!(outcome, ClickOutcome::Ignored);
        assert_eq!(coordinator.state(), InteractionState::Idle);
        assert_eq!(source.calls(), 0);
        assert!(presentation.events().is_empty());
    }

    #[tokio::test]
    async fn test_destroy_silences_late_completion() {
        let source =
            Arc::new(StubSource::returning(Some(record())).with_delay(Duration::from_millis(100)));
        let (coordinator, presentation, events) =
            coordinator(json!({ "debounceMs": 0 }), source, 15.0);

        let selected = Arc::new(AtomicUsize::new(0));
        let counter = selected.clone();
        events.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let click = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.handle_click(LatLng::new(1.0, 1.0)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        coordinator.destroy();

        assert_eq!(click.await.unwrap(), ClickOutcome::Ignored);
        assert_eq!(selected.load(Ordering::SeqCst), 0);
        assert!(!presentation
            .events()
            .iter()
            .any(|event| matches!(event, VisualEvent::Result { .. })));

        // Destroyed widgets refuse further clicks. Idempotent teardown.
        coordinator.destroy();
        let outcome = coordinator.handle_click(LatLng::new(2.0, 2.0)).await;
        assert_eq!(outcome, ClickOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_visual_settle_delay_runs_between_clear_and_result() {
        let source = Arc::new(StubSource::returning(Some(record())));
        let (coordinator, presentation, _) = coordinator(
            json!({ "debounceMs": 0, "visualSettleMs": 10 }),
            source,
            15.0,
        );

        let outcome = coordinator.handle_click(LatLng::new(1.0, 1.0)).await;

        assert!(matches!(outcome, ClickOutcome::Resolved(_)));
        let events = presentation.events();
        assert!(matches!(events[1], VisualEvent::Cleared));
        assert!(matches!(events[2], VisualEvent::Result { .. }));
    }
}
