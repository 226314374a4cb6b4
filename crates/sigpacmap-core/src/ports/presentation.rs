use std::sync::Arc;

use crate::models::{LatLng, ParcelRecord};

/// Visual capability the click coordinator drives.
///
/// Implementations render however they like (popup, marker, side panel) but
/// must guarantee that a `show_result`/`show_error` following a prior
/// `show_loading` leaves at most one transient visual for that click's
/// coordinates.
pub trait Presentation: Send + Sync {
    /// A lookup was dispatched for these coordinates.
    fn show_loading(&self, coords: LatLng);

    /// A lookup ended with a user-facing error message. When a loading
    /// visual exists it is updated in place, not removed.
    fn show_error(&self, coords: LatLng, message: &str);

    /// A parcel was resolved for these coordinates.
    fn show_result(&self, record: &ParcelRecord, coords: LatLng);

    /// Remove any transient visuals from superseded clicks.
    fn clear_transient_visuals(&self);
}

impl<T: Presentation + ?Sized> Presentation for Arc<T> {
    fn show_loading(&self, coords: LatLng) {
        (**self).show_loading(coords)
    }

    fn show_error(&self, coords: LatLng, message: &str) {
        (**self).show_error(coords, message)
    }

    fn show_result(&self, record: &ParcelRecord, coords: LatLng) {
        (**self).show_result(record, coords)
    }

    fn clear_transient_visuals(&self) {
        (**self).clear_transient_visuals()
    }
}
