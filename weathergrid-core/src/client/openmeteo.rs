use reqwest::Client;

use crate::error::ClientError;
use crate::model::ForecastPayload;

use super::truncate_body;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Reference location requested at startup (Berlin).
const DEFAULT_LATITUDE: f64 = 52.52;
const DEFAULT_LONGITUDE: f64 = 13.41;

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,rain_sum";
const TIMEZONE: &str = "Europe/Berlin";

/// Client for the Open-Meteo forecast service. Unauthenticated.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    base_url: String,
    http: Client,
}

impl Default for ForecastClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastClient {
    pub fn new() -> Self {
        Self::with_base_url(FORECAST_URL.to_string())
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }

    /// Forecast for the hardcoded reference location; used once at startup.
    pub async fn fetch_default(&self) -> Result<ForecastPayload, ClientError> {
        self.fetch_for_coordinates(DEFAULT_LATITUDE, DEFAULT_LONGITUDE).await
    }

    /// Daily forecast for arbitrary coordinates. Single attempt, no retry.
    pub async fn fetch_for_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastPayload, ClientError> {
        tracing::debug!(latitude, longitude, "forecast fetch");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", TIMEZONE.to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let payload: ForecastPayload = serde_json::from_str(&body)?;

        if !payload.daily.is_aligned() {
            return Err(ClientError::MisalignedSeries);
        }

        Ok(payload)
    }
}
