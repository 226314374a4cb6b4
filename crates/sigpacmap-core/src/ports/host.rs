use std::sync::Arc;

use crate::error::BridgeError;
use crate::models::FeatureSelected;

/// Outbound bridge to the embedding page or a host framework event bus.
///
/// Typical implementations dispatch a bubbling custom event from the map
/// container or forward to a named reactive bus. Emit failures are logged
/// by the broadcaster and never propagate.
pub trait HostBridge: Send + Sync {
    fn emit(&self, event_name: &str, payload: &FeatureSelected) -> Result<(), BridgeError>;
}

impl<T: HostBridge + ?Sized> HostBridge for Arc<T> {
    fn emit(&self, event_name: &str, payload: &FeatureSelected) -> Result<(), BridgeError> {
        (**self).emit(event_name, payload)
    }
}
