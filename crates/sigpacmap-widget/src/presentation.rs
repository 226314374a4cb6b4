//! Presentation adapters for development and testing.
//!
//! Real deployments implement [`Presentation`] against their rendering
//! surface (popup/marker primitives of the host map library). These
//! implementations record or discard calls so the coordinator can run
//! headless.

use std::sync::Mutex;

use sigpacmap_core::models::{LatLng, ParcelRecord};
use sigpacmap_core::ports::Presentation;

/// A single recorded presentation call.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualEvent {
    Loading { coords: LatLng },
    Error { coords: LatLng, message: String },
    Result { record: ParcelRecord, coords: LatLng },
    Cleared,
}

/// Records every call for inspection and tracks the single transient
/// visual, honoring the no-stacking guarantee of the port.
#[derive(Default)]
pub struct RecordingPresentation {
    events: Mutex<Vec<VisualEvent>>,
    transient: Mutex<Option<LatLng>>,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<VisualEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Coordinates of the transient visual currently on screen, if any.
    pub fn transient_visual(&self) -> Option<LatLng> {
        *self.transient.lock().unwrap()
    }
}

impl Presentation for RecordingPresentation {
    fn show_loading(&self, coords: LatLng) {
        *self.transient.lock().unwrap() = Some(coords);
        self.events.lock().unwrap().push(VisualEvent::Loading { coords });
    }

    fn show_error(&self, coords: LatLng, message: &str) {
        // An error replaces the loading visual in place.
        *self.transient.lock().unwrap() = Some(coords);
        self.events.lock().unwrap().push(VisualEvent::Error {
            coords,
            message: message.to_string(),
        });
    }

    fn show_result(&self, record: &ParcelRecord, coords: LatLng) {
        *self.transient.lock().unwrap() = None;
        self.events.lock().unwrap().push(VisualEvent::Result {
            record: record.clone(),
            coords,
        });
    }

    fn clear_transient_visuals(&self) {
        *self.transient.lock().unwrap() = None;
        self.events.lock().unwrap().push(VisualEvent::Cleared);
    }
}

/// Discards every call; for headless hosts and benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresentation;

impl Presentation for NullPresentation {
    fn show_loading(&self, _coords: LatLng) {}

    fn show_error(&self, _coords: LatLng, _message: &str) {}

    fn show_result(&self, _record: &ParcelRecord, _coords: LatLng) {}

    fn clear_transient_visuals(&self) {}
}
