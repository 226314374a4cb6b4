use std::sync::Arc;

/// Map-view state the widget queries from the host's rendering surface.
pub trait MapSurface: Send + Sync {
    /// Current zoom level of the map view.
    fn current_zoom(&self) -> f64;
}

impl<T: MapSurface + ?Sized> MapSurface for Arc<T> {
    fn current_zoom(&self) -> f64 {
        (**self).current_zoom()
    }
}
