//! Reverse geocoding and IP-based location via BigDataCloud's client endpoint.
//! Free, no API key required; locality names are requested in Chinese.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::error::LocationError;
use crate::types::UNKNOWN_CITY_TEXT;

const BIGDATACLOUD_BASE: &str = "https://api.bigdatacloud.net";
const REVERSE_GEOCODE_PATH: &str = "/data/reverse-geocode-client";
const LOCALITY_LANGUAGE: &str = "zh";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Approximate location inferred from the caller's IP address.
#[derive(Debug, Clone, PartialEq)]
pub struct IpLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
}

pub trait GeocodeProvider: Send + Sync {
    /// Place name for a coordinate.
    fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<String, LocationError>> + Send;

    /// Coordinates and place name for the caller's public IP.
    fn locate_by_ip(&self) -> impl Future<Output = Result<IpLocation, LocationError>> + Send;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseGeocodeResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    locality: Option<String>,
    principal_subdivision: Option<String>,
}

impl ReverseGeocodeResponse {
    /// city > locality > principal subdivision; blank values are skipped.
    fn place_name(&self) -> String {
        [&self.city, &self.locality, &self.principal_subdivision]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_CITY_TEXT.to_string())
    }

    /// Both coordinates present and non-zero.
    fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0 => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BigDataCloudClient {
    client: Arc<Client>,
    base_url: String,
}

impl BigDataCloudClient {
    pub fn new() -> Result<Self, LocationError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, LocationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            base_url: BIGDATACLOUD_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn request(
        &self,
        coordinates: Option<(f64, f64)>,
    ) -> Result<ReverseGeocodeResponse, LocationError> {
        let url = format!("{}{}", self.base_url, REVERSE_GEOCODE_PATH);
        let mut query = vec![("localityLanguage", LOCALITY_LANGUAGE.to_string())];
        if let Some((lat, lon)) = coordinates {
            query.push(("latitude", lat.to_string()));
            query.push(("longitude", lon.to_string()));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        if !response.status().is_success() {
            tracing::debug!("Geocode returned status {}", response.status());
            return Err(LocationError::MalformedResponse(format!(
                "status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LocationError::MalformedResponse(e.to_string()))
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<String, LocationError> {
        let body = self.request(Some((latitude, longitude))).await?;
        let name = body.place_name();
        tracing::info!("Reverse geocoded to: {}", name);
        Ok(name)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn by_ip(&self) -> Result<IpLocation, LocationError> {
        let body = self.request(None).await?;
        let (latitude, longitude) = body.coordinates().ok_or(LocationError::NotFound)?;
        let city = body.place_name();
        tracing::info!("IP location: {} ({}, {})", city, latitude, longitude);
        Ok(IpLocation {
            latitude,
            longitude,
            city,
        })
    }
}

impl GeocodeProvider for BigDataCloudClient {
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<String, LocationError> {
        self.reverse(latitude, longitude).await
    }

    async fn locate_by_ip(&self) -> Result<IpLocation, LocationError> {
        self.by_ip().await
    }
}
