use reqwest::Client;
use serde::Deserialize;

use crate::error::ClientError;
use crate::model::{Coordinates, Location};

use super::truncate_body;

const GEOCODING_URL: &str = "https://api.api-ninjas.com/v1/geocoding";

/// Client for the geocoding service. Authenticated via the `X-API-KEY`
/// request header.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl GeocodingClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GEOCODING_URL.to_string())
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    /// Resolve a city/country pair to the first matching coordinates.
    /// Empty inputs are replaced with the default location before the
    /// request is issued. Single attempt, no retry.
    pub async fn resolve(&self, location: &Location) -> Result<Coordinates, ClientError> {
        let city = location.effective_city();
        let country = location.effective_country();

        tracing::debug!(city, country, "geocoding lookup");

        let res = self
            .http
            .get(&self.base_url)
            .header("X-API-KEY", &self.api_key)
            .query(&[("city", city), ("country", country)])
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

        let matches: Vec<GeocodingMatch> = serde_json::from_str(&body)?;

        let first = matches.first().ok_or(ClientError::NoMatch)?;

        tracing::debug!(
            latitude = first.latitude,
            longitude = first.longitude,
            "geocoding hit"
        );

        Ok(Coordinates {
            latitude: first.latitude,
            longitude: first.longitude,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingMatch {
    latitude: f64,
    longitude: f64,
}
