//! Domain models for the sigpacmap widget.

pub mod coords;
pub mod features;
pub mod layers;
pub mod parcel;
pub mod popup;

pub use coords::LatLng;
pub use features::InitialFeature;
pub use layers::{BaseLayerSpec, ParcelOverlaySpec};
pub use parcel::{FeatureSelected, ParcelRecord, NOT_AVAILABLE};
pub use popup::{ParcelField, PopupFieldSpec, PopupFields, PopupRow};
