//! Current-conditions weather provider backed by Open-Meteo.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::instrument;

use crate::error::WeatherError;
use crate::types::ForecastResponse;

const OPEN_METEO_BASE: &str = "https://api.open-meteo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const CURRENT_FIELDS: &str = "temperature_2m,rain,wind_speed_10m,is_day,apparent_temperature,\
showers,relative_humidity_2m,precipitation,weather_code";
const HOURLY_FIELDS: &str = "precipitation_probability,uv_index,temperature_2m";

/// Fetches current conditions plus same-day hourly detail for a coordinate.
pub trait WeatherProvider: Send + Sync {
    fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<ForecastResponse, WeatherError>> + Send;
}

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Arc<Client>,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            base_url: OPEN_METEO_BASE.to_string(),
        })
    }

    /// Point the client at another host (mirrors, tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<ForecastResponse, WeatherError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", "1".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Forecast request returned status {}", status);
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| WeatherError::MalformedResponse(e.to_string()))
    }
}

impl WeatherProvider for OpenMeteoClient {
    async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastResponse, WeatherError> {
        self.fetch(latitude, longitude).await
    }
}
