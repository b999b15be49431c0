use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::ConfigError;

/// Environment variable holding the OpenWeather API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Environment variable overriding the time zone used for day boundaries.
pub const TIMEZONE_ENV: &str = "WEATHER_DASHBOARD_TZ";
/// Environment variable overriding the description language.
pub const LANG_ENV: &str = "WEATHER_DASHBOARD_LANG";

pub const DEFAULT_LANG: &str = "pt_br";

/// Dashboard configuration.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// timezone = "America/Sao_Paulo"
/// lang = "pt_br"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// IANA zone name; days are grouped in UTC when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Config {
    /// Config file layered with environment overrides. The environment wins.
    pub fn from_env_and_file() -> Result<Self, ConfigError> {
        let mut cfg = Self::load()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Overrides fields with values from `lookup`, ignoring blank values.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_blank(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(tz) = non_blank(TIMEZONE_ENV) {
            self.timezone = Some(tz);
        }
        if let Some(lang) = non_blank(LANG_ENV) {
            self.lang = Some(lang);
        }
    }

    /// The API key, or the fatal missing-key error.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        match self.timezone.as_deref().map(str::trim) {
            None | Some("") => Ok(Tz::UTC),
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ConfigError::InvalidTimezone(name.to_string())),
        }
    }

    pub fn lang(&self) -> &str {
        self.lang
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANG)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml).map_err(write_err)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Best guess at the machine's own zone: `TZ`, then the `/etc/localtime` link.
pub fn system_timezone() -> Option<String> {
    std::env::var("TZ")
        .ok()
        .and_then(|tz| parse_zone(&tz))
        .or_else(|| zone_from_localtime_link(Path::new("/etc/localtime")))
}

/// Zone name from a `.../zoneinfo/<Area>/<City>` symlink.
pub fn zone_from_localtime_link(path: &Path) -> Option<String> {
    let target = fs::read_link(path).ok()?;
    let (_, name) = target.to_str()?.split_once("zoneinfo/")?;
    parse_zone(name)
}

fn parse_zone(name: &str) -> Option<String> {
    // POSIX allows a leading ':' in TZ.
    let tz: Tz = name.trim().trim_start_matches(':').parse().ok()?;
    Some(tz.name().to_string())
}
