//! End-to-end click flow against a stubbed SIGPAC endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use sigpacmap_core::error::LookupError;
use sigpacmap_core::models::popup::PopupFields;
use sigpacmap_core::models::{LatLng, ParcelRecord, PopupRow};
use sigpacmap_core::ports::MapSurface;
use sigpacmap_core::ResolvedConfig;
use sigpacmap_lookup::ParcelSource;
use sigpacmap_widget::{ClickOutcome, InteractionState, MapWidget, RecordingPresentation, VisualEvent};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Serves a canned wire payload, exercising normalization end to end.
struct WirePayloadSource {
    payload: serde_json::Value,
    calls: AtomicUsize,
}

impl WirePayloadSource {
    fn new(payload: serde_json::Value) -> Self {
        Self {
            payload,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ParcelSource for WirePayloadSource {
    async fn fetch_by_coordinates(
        &self,
        _coords: LatLng,
    ) -> Result<Option<ParcelRecord>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .payload
            .as_array()
            .and_then(|items| items.first())
            .map(ParcelRecord::from_raw))
    }
}

struct FixedZoom(f64);

impl MapSurface for FixedZoom {
    fn current_zoom(&self) -> f64 {
        self.0
    }
}

#[tokio::test]
async fn test_click_resolves_parcel_and_broadcasts() {
    init_tracing();

    let config = ResolvedConfig::resolve(&json!({ "debounceMs": 0 })).unwrap();
    let source = Arc::new(WirePayloadSource::new(json!([
        { "poligono": "28", "parcela": "15", "dn_surface": 12000 }
    ])));
    let presentation = Arc::new(RecordingPresentation::new());
    let widget = MapWidget::from_parts(
        config,
        source.clone(),
        presentation.clone(),
        FixedZoom(15.0),
        None,
    );

    let selections = Arc::new(Mutex::new(Vec::new()));
    let sink = selections.clone();
    widget.subscribe(move |payload| {
        sink.lock().unwrap().push(payload.clone());
    });

    let outcome = widget.click(37.718, -0.874).await;

    let record = match outcome {
        ClickOutcome::Resolved(record) => record,
        other => panic!("expected a resolved parcel, got {other:?}"),
    };
    assert_eq!(record.poligono.as_deref(), Some("28"));
    assert_eq!(record.parcela.as_deref(), Some("15"));
    assert_eq!(record.superficie, "1.20");
    assert_eq!(widget.state(), InteractionState::Success);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    let selections = selections.lock().unwrap();
    assert_eq!(selections.len(), 1);
    assert_eq!(selections[0].coordinates, [37.718, -0.874]);

    // Loading placeholder, teardown of transients, then the result.
    let events = presentation.events();
    assert!(matches!(events[0], VisualEvent::Loading { .. }));
    assert!(matches!(events[1], VisualEvent::Cleared));
    assert!(matches!(events[2], VisualEvent::Result { .. }));
    assert_eq!(presentation.transient_visual(), None);
}

#[tokio::test]
async fn test_popup_rows_for_resolved_record() {
    let config = ResolvedConfig::resolve(&json!({ "debounceMs": 0 })).unwrap();
    let source = Arc::new(WirePayloadSource::new(json!([
        { "provincia": "Murcia", "poligono": "28", "parcela": "15", "dn_surface": 15000 }
    ])));
    let mut widget = MapWidget::from_parts(
        config,
        source,
        RecordingPresentation::new(),
        FixedZoom(15.0),
        None,
    );

    let record = match widget.click(37.718, -0.874).await {
        ClickOutcome::Resolved(record) => record,
        other => panic!("expected a resolved parcel, got {other:?}"),
    };

    // Built-in field list by default.
    let rows = widget.popup_rows(&record);
    assert_eq!(rows[0], PopupRow::new("Province:", "Murcia"));
    assert_eq!(rows[6], PopupRow::new("Surface:", "1.50").with_suffix("ha"));

    // A dynamic resolver replaces the list, resolved fresh per record.
    widget.set_popup_fields(PopupFields::Dynamic(Arc::new(|record| {
        vec![PopupRow::new("Parcela", record.title())]
    })));
    let rows = widget.popup_rows(&record);
    assert_eq!(rows, vec![PopupRow::new("Parcela", "Parcela SIGPAC: 28-15")]);
}

#[tokio::test]
async fn test_widget_exposes_layer_specs_and_initial_features() {
    let config = ResolvedConfig::resolve(&json!({
        "minZoomFeature": 14,
        "initialFeatures": [
            { "type": "marker", "coordinates": [37.718, -0.874] },
        ],
    }))
    .unwrap();
    let widget = MapWidget::from_parts(
        config,
        WirePayloadSource::new(json!([])),
        RecordingPresentation::new(),
        FixedZoom(15.0),
        None,
    );

    assert_eq!(widget.base_layer().max_zoom, 19.0);
    assert_eq!(widget.parcel_overlay().min_zoom, 14.0);
    assert_eq!(widget.parcel_overlay().layer_name, "recinto");
    assert_eq!(widget.initial_features().len(), 1);
}

#[tokio::test]
async fn test_destroy_detaches_subscribers_and_ignores_clicks() {
    let config = ResolvedConfig::resolve(&json!({ "debounceMs": 0 })).unwrap();
    let source = Arc::new(WirePayloadSource::new(json!([{ "poligono": "1" }])));
    let widget = MapWidget::from_parts(
        config,
        source.clone(),
        RecordingPresentation::new(),
        FixedZoom(15.0),
        None,
    );

    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = delivered.clone();
    widget.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    widget.destroy();
    widget.destroy(); // idempotent

    assert_eq!(widget.click(37.718, -0.874).await, ClickOutcome::Ignored);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    assert_eq!(delivered.load(Ordering::SeqCst), 0);
}

#[test]
fn test_malformed_declarative_config_fails_only_that_instance() {
    // One element's bad attribute JSON must not poison the page: the
    // constructor reports an error and a sibling still initializes.
    let failed = MapWidget::from_json_str(
        "{ not json",
        RecordingPresentation::new(),
        FixedZoom(15.0),
        None,
    );
    assert!(failed.is_err());

    let sibling = MapWidget::from_json_str(
        r#"{ "debounceMs": 0 }"#,
        RecordingPresentation::new(),
        FixedZoom(15.0),
        None,
    );
    assert!(sibling.is_ok());
}
