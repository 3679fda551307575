use crate::{
    Config, WeatherRequest, WeatherResponse, error::FetchError,
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

pub mod openweather;

/// Source of current weather for one fix.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, request: &WeatherRequest) -> Result<WeatherResponse, FetchError>;
}

/// Construct the OpenWeather client described by the config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let client = OpenWeatherClient::new(
        config.base_url.as_str(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(client)
}
