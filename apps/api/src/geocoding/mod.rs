//! Geocoding: resolves a free-text address into coordinates and a canonical locality.
//!
//! `AppState` holds an `Arc<dyn Geocoder>`; the production backend is `NominatimGeocoder`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Geocoder returned status {0}")]
    Status(u16),
}

/// A place as resolved by the geocoder.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub latitude: f64,
    pub longitude: f64,
    pub locality: String,
}

/// `Ok(None)` means the query resolved to nothing.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    display_name: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
}

impl NominatimHit {
    fn into_place(self) -> Option<GeocodedPlace> {
        let latitude = self.lat.trim().parse::<f64>().ok()?;
        let longitude = self.lon.trim().parse::<f64>().ok()?;
        let address = self.address.unwrap_or_default();
        let locality = address
            .city
            .or(address.town)
            .or(address.village)
            .or(address.municipality)
            .or(address.county)
            .or(self.display_name)?;

        Some(GeocodedPlace {
            latitude,
            longitude,
            locality,
        })
    }
}

/// Geocoder backed by a Nominatim-compatible `/search` endpoint.
#[derive(Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let hits: Vec<NominatimHit> = response.json().await?;
        let place = hits.into_iter().next().and_then(NominatimHit::into_place);
        debug!(query, found = place.is_some(), "geocode lookup");
        Ok(place)
    }
}

/// Spaces out lookups so that consecutive calls to `inner` start at least `min_interval`
/// apart, across every request sharing this geocoder. Public Nominatim allows about one
/// request per second.
pub struct ThrottledGeocoder<G> {
    inner: G,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl<G: Geocoder> ThrottledGeocoder<G> {
    pub fn new(inner: G, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    async fn wait_turn(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for ThrottledGeocoder<G> {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        self.wait_turn().await;
        self.inner.geocode(query).await
    }
}
