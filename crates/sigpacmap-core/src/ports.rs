//! Port trait definitions
//!
//! These traits define the capabilities the embedding host must provide.
//! The widget core talks to its rendering surface and host page only
//! through them, so it can be tested without a real map.

pub mod host;
pub mod presentation;
pub mod surface;

pub use host::HostBridge;
pub use presentation::Presentation;
pub use surface::MapSurface;
