use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::API_KEY_ENV;

/// Problems loading or validating configuration. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "API key not found.\n\
         Hint: set {} or run `weather-dashboard configure`.",
        API_KEY_ENV
    )]
    MissingApiKey,

    #[error("Unknown time zone '{0}'. Use an IANA name such as 'America/Sao_Paulo' or 'UTC'.")]
    InvalidTimezone(String),

    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration to TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Why an upstream call produced no data.
///
/// Callers of [`crate::WeatherSource`] only ever see an absent value; this
/// type exists so the reason can be logged.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to send request to OpenWeather ({endpoint}): {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse OpenWeather {endpoint} JSON: {source}")]
    Malformed {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("OpenWeather {endpoint} response is missing {field}")]
    Missing {
        endpoint: &'static str,
        field: &'static str,
    },

    #[error("No geocoding match for '{0}'")]
    NoMatch(String),
}

/// Outcome of a submission that cannot be rendered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Enter a city name to get started.")]
    EmptyCity,

    #[error("City not found or API error.")]
    NotFound,
}
