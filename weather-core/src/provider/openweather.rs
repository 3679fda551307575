use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::{
    error::FetchError,
    model::{Coordinates, UnitSystem, WeatherRequest, WeatherResponse},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the OpenWeather current-weather endpoint.
///
/// Holds no state between calls apart from the pooled HTTP client.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One GET of `{base_url}/weather` for the given fix.
    pub async fn fetch(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
        api_key: &str,
    ) -> Result<WeatherResponse, FetchError> {
        validate(coordinates, api_key)?;

        let url = format!("{}/weather", self.base_url);
        let lat = coordinates.latitude().to_string();
        let lon = coordinates.longitude().to_string();

        tracing::debug!(%url, %lat, %lon, units = units.as_str(), "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", units.as_str()),
                ("appid", api_key),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                body = %truncate_body(&body),
                "OpenWeather request failed"
            );
            return Err(FetchError::from_status(status.as_u16()));
        }

        let parsed: WeatherResponse = serde_json::from_str(&body).map_err(|e| {
            FetchError::InvalidBody(format!("{e}: {}", truncate_body(&body)))
        })?;

        tracing::info!(place = %parsed.name, "received current weather");
        Ok(parsed)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(&self, request: &WeatherRequest) -> Result<WeatherResponse, FetchError> {
        self.fetch(request.coordinates, request.units, &request.api_key).await
    }
}

fn validate(coordinates: Coordinates, api_key: &str) -> Result<(), FetchError> {
    // Coordinates built through `Coordinates::new` are already in range; a
    // deserialized value is not.
    Coordinates::new(coordinates.latitude(), coordinates.longitude())
        .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;

    if api_key.trim().is_empty() {
        return Err(FetchError::InvalidRequest("API key is empty".to_string()));
    }

    Ok(())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
