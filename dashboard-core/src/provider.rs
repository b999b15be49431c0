use crate::{
    Config,
    error::ConfigError,
    model::{Coordinates, ForecastEntry, WeatherSnapshot},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Upstream weather data. Every failure, whatever its cause, is `None`.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Coordinates of the best match for a free-text city name.
    async fn resolve(&self, city: &str) -> Option<Coordinates>;

    async fn fetch_current(&self, city: &str) -> Option<WeatherSnapshot>;

    /// 3-hour forecast entries for the API's default window, in API order.
    async fn fetch_forecast(&self, at: Coordinates) -> Option<Vec<ForecastEntry>>;
}

/// Construct the OpenWeather source from config.
pub fn source_from_config(config: &Config) -> Result<Box<dyn WeatherSource>, ConfigError> {
    let api_key = config.require_api_key()?;
    let client = OpenWeatherClient::new(api_key.to_owned(), config.lang().to_owned());
    Ok(Box::new(client))
}
