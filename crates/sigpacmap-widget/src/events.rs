//! Feature-selected broadcast: internal subscribers plus the host bridge.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use sigpacmap_core::config::BridgeSettings;
use sigpacmap_core::models::{FeatureSelected, LatLng, ParcelRecord};
use sigpacmap_core::ports::HostBridge;

/// Handle for removing a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Arc<dyn Fn(&FeatureSelected) + Send + Sync>;

/// Publishes feature selections to internal subscribers and, when enabled,
/// to the embedding host through the bridge port.
///
/// Broadcasting never fails: a panicking subscriber and a failing bridge
/// are logged and the remaining listeners still run.
pub struct FeatureBroadcaster {
    settings: BridgeSettings,
    bridge: Option<Arc<dyn HostBridge>>,
    subscribers: Mutex<Vec<(SubscriberId, Subscriber)>>,
    next_id: AtomicU64,
}

impl FeatureBroadcaster {
    pub fn new(settings: BridgeSettings, bridge: Option<Arc<dyn HostBridge>>) -> Self {
        Self {
            settings,
            bridge,
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&FeatureSelected) + Send + Sync + 'static,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.subscribers
            .lock()
            .unwrap()
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove one subscriber. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap();
        let before = subscribers.len();
        subscribers.retain(|(subscriber_id, _)| *subscriber_id != id);
        subscribers.len() != before
    }

    /// Remove every subscriber (teardown).
    pub fn clear(&self) {
        self.subscribers.lock().unwrap().clear();
    }

    /// Synchronously notify subscribers and the host bridge.
    pub fn notify_feature_selected(&self, record: &ParcelRecord, coords: LatLng) {
        let payload = FeatureSelected::new(record.clone(), coords);

        // Snapshot under the lock, invoke outside it, so a listener may
        // subscribe or unsubscribe without deadlocking.
        let listeners: Vec<(SubscriberId, Subscriber)> =
            self.subscribers.lock().unwrap().clone();

        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(&payload))).is_err() {
                tracing::warn!(subscriber = id.0, "feature-selected subscriber panicked");
            }
        }

        if self.settings.enabled {
            if let Some(bridge) = &self.bridge {
                if let Err(error) = bridge.emit(&self.settings.event_name, &payload) {
                    tracing::warn!(error = %error, "host bridge emit failed");
                }
            }
        }
    }
}
