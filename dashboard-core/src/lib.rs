//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather geocoding, current-weather and forecast clients
//! - Aggregation of 3-hour forecast samples into daily summaries
//! - The per-session dashboard state (search history, view selection)
//!
//! It is used by `dashboard-cli`, but can also be reused by other front ends.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod history;
pub mod model;
pub mod provider;

pub use config::Config;
pub use dashboard::{Dashboard, Panel, View};
pub use error::{ConfigError, LookupError, SourceError};
pub use forecast::{TemperatureSeries, aggregate, group_by_day};
pub use history::SessionHistory;
pub use model::{Coordinates, DailySummary, ForecastEntry, WeatherSnapshot};
pub use provider::{WeatherSource, source_from_config};
