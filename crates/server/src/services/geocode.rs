//! Geocoding client for resolving street addresses to coordinates.
//!
//! Speaks the Google-style geocoding JSON API: `GET <base>?address=..&key=..`
//! returning `{ status, results: [{ formatted_address, geometry: { location:
//! { lat, lng } } }] }`.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use shelter_finder_core::GeoPoint;

use crate::config::GeocodingConfig;

/// Errors that can occur when talking to the geocoding service.
///
/// Callers are expected to degrade on these: a shelter write proceeds
/// without coordinates rather than failing.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A successfully geocoded address.
#[derive(Debug, Clone)]
pub struct GeocodedLocation {
    pub point: GeoPoint,
    pub formatted_address: String,
}

/// Geocoding API client.
#[derive(Clone)]
pub struct GeocodeClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeocodeClient {
    /// Create a new geocoding client.
    #[must_use]
    pub fn new(config: &GeocodingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }

    /// Resolve an address to coordinates.
    ///
    /// Returns `Ok(None)` when the service answers but has no usable result
    /// (non-OK status, empty result set, or out-of-range coordinates); these
    /// are logged, not surfaced as errors.
    ///
    /// # Errors
    ///
    /// Returns `GeocodeError::Http` if the request fails, and
    /// `GeocodeError::Parse` if the response body is not the expected shape.
    pub async fn geocode(
        &self,
        address: &str,
    ) -> Result<Option<GeocodedLocation>, GeocodeError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", address), ("key", self.api_key.expose_secret())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                http_status = status.as_u16(),
                "geocoding request rejected"
            );
            return Ok(None);
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))?;

        if body.status != "OK" {
            tracing::warn!(
                geocoder_status = %body.status,
                "geocoding failed for address"
            );
            return Ok(None);
        }

        let Some(result) = body.results.into_iter().next() else {
            tracing::warn!("geocoding returned an empty result set");
            return Ok(None);
        };

        let location = result.geometry.location;
        match GeoPoint::new(location.lng, location.lat) {
            Ok(point) => Ok(Some(GeocodedLocation {
                point,
                formatted_address: result.formatted_address,
            })),
            Err(e) => {
                tracing::warn!(error = %e, "geocoder returned invalid coordinates");
                Ok(None)
            }
        }
    }
}

/// Top-level geocoding response.
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

/// A single geocoding result.
#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}
