//! Port trait definitions for parcel lookup.

use std::sync::Arc;

use async_trait::async_trait;
use sigpacmap_core::error::LookupError;
use sigpacmap_core::models::{LatLng, ParcelRecord};

/// Wire-level SIGPAC coordinate query.
///
/// `Ok(None)` means the service answered and no parcel covers the point;
/// errors are reserved for network/protocol failures.
#[async_trait]
pub trait ParcelEndpoint: Send + Sync {
    async fn query(&self, coords: LatLng) -> Result<Option<ParcelRecord>, LookupError>;
}

/// Cache-aware parcel lookup consumed by the click coordinator.
#[async_trait]
pub trait ParcelSource: Send + Sync {
    async fn fetch_by_coordinates(
        &self,
        coords: LatLng,
    ) -> Result<Option<ParcelRecord>, LookupError>;
}

#[async_trait]
impl<T: ParcelSource + ?Sized> ParcelSource for Arc<T> {
    async fn fetch_by_coordinates(
        &self,
        coords: LatLng,
    ) -> Result<Option<ParcelRecord>, LookupError> {
        (**self).fetch_by_coordinates(coords).await
    }
}
