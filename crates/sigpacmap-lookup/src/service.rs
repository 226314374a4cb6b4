//! Cache-aware lookup pipeline.

use async_trait::async_trait;
use sigpacmap_core::config::CacheSettings;
use sigpacmap_core::error::LookupError;
use sigpacmap_core::models::{LatLng, ParcelRecord};

use crate::cache::CoordinateCache;
use crate::endpoint::HttpParcelEndpoint;
use crate::ports::{ParcelEndpoint, ParcelSource};

/// Parcel lookup combining the wire endpoint with the coordinate cache.
///
/// Cache hits skip the network entirely; successful non-empty lookups are
/// stored under the original unrounded coordinates. Empty results are not
/// cached, so a location without a parcel is re-queried on the next click.
pub struct LookupService<E: ParcelEndpoint> {
    endpoint: E,
    cache: CoordinateCache,
}

impl LookupService<HttpParcelEndpoint> {
    /// Production service against the configured SIGPAC query endpoint.
    pub fn new(
        query_url: impl Into<String>,
        cache_settings: CacheSettings,
    ) -> Result<Self, LookupError> {
        Ok(Self::with_endpoint(
            HttpParcelEndpoint::new(query_url)?,
            cache_settings,
        ))
    }
}

impl<E: ParcelEndpoint> LookupService<E> {
    pub fn with_endpoint(endpoint: E, cache_settings: CacheSettings) -> Self {
        Self {
            endpoint,
            cache: CoordinateCache::new(cache_settings),
        }
    }

    pub fn cache(&self) -> &CoordinateCache {
        &self.cache
    }
}

#[async_trait]
impl<E: ParcelEndpoint> ParcelSource for LookupService<E> {
    async fn fetch_by_coordinates(
        &self,
        coords: LatLng,
    ) -> Result<Option<ParcelRecord>, LookupError> {
        if self.cache.enabled() {
            if let Some(hit) = self.cache.get(coords) {
                tracing::debug!(lat = coords.lat, lng = coords.lng, "parcel cache hit");
                return Ok(Some(hit));
            }
        }

        let fetched = self.endpoint.query(coords).await?;

        if let Some(record) = &fetched {
            if self.cache.enabled() {
                self.cache.set(coords, record.clone());
            }
        }
        Ok(fetched)
    }
}
