//! Sigpacmap Widget - click orchestration over the SIGPAC lookup service
//!
//! This crate wires the lookup stack to a host-provided rendering surface:
//! the [`coordinator`] debounces and cancels lookups and drives the
//! idle/loading/success/error lifecycle, [`events`] broadcasts selections,
//! and [`widget::MapWidget`] assembles one instance per map and owns its
//! teardown.

pub mod coordinator;
pub mod events;
pub mod presentation;
pub mod widget;

pub use coordinator::{ClickCoordinator, ClickOutcome, InteractionState};
pub use events::{FeatureBroadcaster, SubscriberId};
pub use presentation::{NullPresentation, RecordingPresentation, VisualEvent};
pub use widget::MapWidget;
