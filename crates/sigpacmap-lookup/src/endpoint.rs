//! HTTP client for the SIGPAC coordinate query service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use sigpacmap_core::error::LookupError;
use sigpacmap_core::models::{LatLng, ParcelRecord};

use crate::ports::ParcelEndpoint;

/// Spatial reference of the query path segment.
const QUERY_SRID: u32 = 4326;

/// Hard upper bound on one lookup round-trip, independent of cancellation.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error bodies are truncated to this many characters.
const ERROR_BODY_PREFIX: usize = 100;

/// Wire client for `GET <base>/4326/<lon>/<lat>.json`.
pub struct HttpParcelEndpoint {
    base_url: String,
    client: reqwest::Client,
}

impl HttpParcelEndpoint {
    pub fn new(base_url: impl Into<String>) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LookupError::Network {
                reason: e.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Query URL for a coordinate pair.
    ///
    /// Longitude precedes latitude in the path, each formatted to six
    /// decimal digits.
    pub fn query_url(&self, coords: LatLng) -> String {
        format!(
            "{}/{}/{:.6}/{:.6}.json",
            self.base_url.trim_end_matches('/'),
            QUERY_SRID,
            coords.lng,
            coords.lat
        )
    }
}

#[async_trait]
impl ParcelEndpoint for HttpParcelEndpoint {
    async fn query(&self, coords: LatLng) -> Result<Option<ParcelRecord>, LookupError> {
        let url = self.query_url(coords);
        tracing::debug!(url = %url, "querying SIGPAC parcel service");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout {
                        seconds: REQUEST_TIMEOUT.as_secs(),
                    }
                } else {
                    LookupError::Network {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body_prefix: String = body.chars().take(ERROR_BODY_PREFIX).collect();
            return Err(LookupError::Http {
                status: status.as_u16(),
                body_prefix,
            });
        }

        let body = response.text().await.map_err(|e| LookupError::Network {
            reason: e.to_string(),
        })?;
        Ok(parse_response(&body))
    }
}

/// Parse a 2xx response body.
///
/// A non-empty JSON array yields the first element normalized into a
/// record. An empty array means no parcel covers the point. Anything
/// unparseable is downgraded to "no result" and logged, not propagated.
fn parse_response(body: &str) -> Option<ParcelRecord> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(error = %error, "unparseable SIGPAC response, treating as no result");
            return None;
        }
    };

    let first = value.as_array()?.first()?;
    if !first.is_object() {
        tracing::warn!("SIGPAC response element is not an object, treating as no result");
        return None;
    }
    Some(ParcelRecord::from_raw(first))
}
