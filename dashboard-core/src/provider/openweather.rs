use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::SourceError,
    model::{Coordinates, ForecastEntry, WeatherSnapshot},
};

use super::WeatherSource;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const GEOCODING_PATH: &str = "/geo/1.0/direct";
const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const UNITS: &str = "metric";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    lang: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, lang: String) -> Self {
        Self::with_base_url(api_key, lang, DEFAULT_BASE_URL)
    }

    /// Client against a non-default host, e.g. a mock server.
    pub fn with_base_url(api_key: String, lang: String, base_url: &str) -> Self {
        Self {
            api_key,
            lang,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub async fn try_resolve(&self, city: &str) -> Result<Coordinates, SourceError> {
        let matches: Vec<OwGeoMatch> = self
            .get_json(
                "geocoding",
                GEOCODING_PATH,
                &[("q", city), ("limit", "1"), ("appid", self.api_key.as_str())],
            )
            .await?;

        let first = matches
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NoMatch(city.to_string()))?;

        Ok(Coordinates {
            latitude: first.lat,
            longitude: first.lon,
        })
    }

    pub async fn try_current(&self, city: &str) -> Result<WeatherSnapshot, SourceError> {
        const ENDPOINT: &str = "current weather";

        let parsed: OwCurrentResponse = self
            .get_json(
                ENDPOINT,
                CURRENT_PATH,
                &[
                    ("q", city),
                    ("appid", self.api_key.as_str()),
                    ("units", UNITS),
                    ("lang", self.lang.as_str()),
                ],
            )
            .await?;

        let weather = parsed.weather.into_iter().next().ok_or(SourceError::Missing {
            endpoint: ENDPOINT,
            field: "weather[0]",
        })?;

        Ok(WeatherSnapshot {
            location_name: parsed.name,
            country: parsed.sys.country,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            clouds_pct: parsed.clouds.all,
            wind_speed_mps: parsed.wind.speed,
            sunrise: unix_to_utc(ENDPOINT, "sys.sunrise", parsed.sys.sunrise)?,
            sunset: unix_to_utc(ENDPOINT, "sys.sunset", parsed.sys.sunset)?,
            condition: weather.description,
            icon: weather.icon,
        })
    }

    pub async fn try_forecast(&self, at: Coordinates) -> Result<Vec<ForecastEntry>, SourceError> {
        const ENDPOINT: &str = "5-day forecast";

        let lat = at.latitude.to_string();
        let lon = at.longitude.to_string();

        let parsed: OwForecastResponse = self
            .get_json(
                ENDPOINT,
                FORECAST_PATH,
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("appid", self.api_key.as_str()),
                    ("units", UNITS),
                    ("lang", self.lang.as_str()),
                ],
            )
            .await?;

        parsed
            .list
            .into_iter()
            .map(|entry| -> Result<ForecastEntry, SourceError> {
                let weather = entry.weather.into_iter().next().ok_or(SourceError::Missing {
                    endpoint: ENDPOINT,
                    field: "list[].weather[0]",
                })?;

                Ok(ForecastEntry {
                    time: unix_to_utc(ENDPOINT, "list[].dt", entry.dt)?,
                    temp_min_c: entry.main.temp_min,
                    temp_max_c: entry.main.temp_max,
                    description: weather.description,
                    icon: weather.icon,
                })
            })
            .collect()
    }

    /// GET + strict parse. Anything but a 200 with the expected shape is an error.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| SourceError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| SourceError::Transport { endpoint, source })?;

        tracing::debug!(endpoint, %status, bytes = body.len(), "OpenWeather response");

        if status != StatusCode::OK {
            return Err(SourceError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| SourceError::Malformed { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    sys: OwSys,
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn resolve(&self, city: &str) -> Option<Coordinates> {
        self.try_resolve(city)
            .await
            .inspect_err(|e| tracing::debug!(city, error = %e, "geocoding failed"))
            .ok()
    }

    async fn fetch_current(&self, city: &str) -> Option<WeatherSnapshot> {
        self.try_current(city)
            .await
            .inspect_err(|e| tracing::debug!(city, error = %e, "current weather unavailable"))
            .ok()
    }

    async fn fetch_forecast(&self, at: Coordinates) -> Option<Vec<ForecastEntry>> {
        self.try_forecast(at)
            .await
            .inspect_err(|e| {
                tracing::debug!(
                    lat = at.latitude,
                    lon = at.longitude,
                    error = %e,
                    "forecast unavailable"
                )
            })
            .ok()
    }
}

fn unix_to_utc(
    endpoint: &'static str,
    field: &'static str,
    ts: i64,
) -> Result<DateTime<Utc>, SourceError> {
    DateTime::from_timestamp(ts, 0).ok_or(SourceError::Missing { endpoint, field })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::with_base_url("TEST_KEY".into(), "pt_br".into(), &server.uri())
    }

    fn current_body() -> serde_json::Value {
        json!({
            "name": "São Paulo",
            "dt": 1735732800,
            "main": {
                "temp": 24.3,
                "feels_like": 25.1,
                "humidity": 60,
                "pressure": 1015
            },
            "sys": { "country": "BR", "sunrise": 1735718400, "sunset": 1735767000 },
            "weather": [{ "id": 800, "description": "céu limpo", "icon": "01d" }],
            "wind": { "speed": 3.1, "deg": 120 },
            "clouds": { "all": 20 }
        })
    }

    fn forecast_entry(dt: i64, min: f64, max: f64) -> serde_json::Value {
        json!({
            "dt": dt,
            "main": { "temp": (min + max) / 2.0, "temp_min": min, "temp_max": max },
            "weather": [{ "description": "nublado", "icon": "04d" }]
        })
    }

    #[tokio::test]
    async fn resolve_returns_first_match() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(GEOCODING_PATH))
            .and(query_param("q", "São Paulo"))
            .and(query_param("limit", "1"))
            .and(query_param("appid", "TEST_KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "name": "São Paulo", "lat": -23.5505, "lon": -46.6333, "country": "BR" }
            ])))
            .mount(&server)
            .await;

        let coords = client(&server).resolve("São Paulo").await.unwrap();

        assert_eq!(coords.latitude, -23.5505);
        assert_eq!(coords.longitude, -46.6333);
    }

    #[tokio::test]
    async fn resolve_empty_result_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(GEOCODING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let c = client(&server);
        assert!(c.resolve("Atlantis").await.is_none());
        assert!(matches!(c.try_resolve("Atlantis").await, Err(SourceError::NoMatch(_))));
    }

    #[tokio::test]
    async fn resolve_unparseable_body_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(GEOCODING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        assert!(client(&server).resolve("Paris").await.is_none());
    }

    #[tokio::test]
    async fn current_weather_is_parsed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(CURRENT_PATH))
            .and(query_param("q", "São Paulo"))
            .and(query_param("units", "metric"))
            .and(query_param("lang", "pt_br"))
            .and(query_param("appid", "TEST_KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;

        let snapshot = client(&server).fetch_current("São Paulo").await.unwrap();

        assert_eq!(snapshot.location_name, "São Paulo");
        assert_eq!(snapshot.country, "BR");
        assert_eq!(snapshot.temperature_c, 24.3);
        assert_eq!(snapshot.feels_like_c, 25.1);
        assert_eq!(snapshot.humidity_pct, 60);
        assert_eq!(snapshot.pressure_hpa, 1015.0);
        assert_eq!(snapshot.clouds_pct, 20);
        assert_eq!(snapshot.wind_speed_mps, 3.1);
        assert_eq!(snapshot.sunrise.timestamp(), 1735718400);
        assert_eq!(snapshot.sunset.timestamp(), 1735767000);
        assert_eq!(snapshot.condition, "céu limpo");
        assert_eq!(snapshot.icon, "01d");
    }

    #[tokio::test]
    async fn current_weather_non_200_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(CURRENT_PATH))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let c = client(&server);
        assert!(c.fetch_current("Nowhere").await.is_none());

        let err = c.try_current("Nowhere").await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Status { status, .. } if status == StatusCode::NOT_FOUND
        ));
        assert!(err.to_string().contains("city not found"));
    }

    #[tokio::test]
    async fn current_weather_with_unexpected_shape_is_absent() {
        let server = MockServer::start().await;

        let mut body = current_body();
        body["weather"] = json!([]);

        Mock::given(method("GET"))
            .and(path(CURRENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let c = client(&server);
        assert!(c.fetch_current("São Paulo").await.is_none());
        assert!(matches!(
            c.try_current("São Paulo").await,
            Err(SourceError::Missing { field: "weather[0]", .. })
        ));
    }

    #[tokio::test]
    async fn current_weather_missing_section_is_malformed() {
        let server = MockServer::start().await;

        let mut body = current_body();
        body.as_object_mut().unwrap().remove("main");

        Mock::given(method("GET"))
            .and(path(CURRENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server).try_current("São Paulo").await,
            Err(SourceError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn forecast_is_fetched_by_coordinates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(FORECAST_PATH))
            .and(query_param("lat", "-23.5505"))
            .and(query_param("lon", "-46.6333"))
            .and(query_param("units", "metric"))
            .and(query_param("lang", "pt_br"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cod": "200",
                "cnt": 2,
                "list": [
                    forecast_entry(1735732800, 18.5, 22.0),
                    forecast_entry(1735743600, 19.0, 26.5)
                ],
                "city": { "name": "São Paulo", "country": "BR", "timezone": -10800 }
            })))
            .mount(&server)
            .await;

        let at = Coordinates {
            latitude: -23.5505,
            longitude: -46.6333,
        };
        let entries = client(&server).fetch_forecast(at).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].time.timestamp(), 1735732800);
        assert_eq!(entries[0].temp_min_c, 18.5);
        assert_eq!(entries[1].temp_max_c, 26.5);
        assert_eq!(entries[1].description, "nublado");
        assert_eq!(entries[1].icon, "04d");
    }

    #[tokio::test]
    async fn forecast_server_error_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(FORECAST_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let at = Coordinates {
            latitude: 48.85,
            longitude: 2.35,
        };
        assert!(client(&server).fetch_forecast(at).await.is_none());
    }

    async fn mount_forecast(server: &MockServer, entry: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(FORECAST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "list": [entry] })))
            .mount(server)
            .await;
    }

    const PARIS: Coordinates = Coordinates {
        latitude: 48.85,
        longitude: 2.35,
    };

    #[tokio::test]
    async fn forecast_entry_without_weather_is_absent() {
        let server = MockServer::start().await;
        let mut entry = forecast_entry(1735732800, 10.0, 12.0);
        entry["weather"] = json!([]);
        mount_forecast(&server, entry).await;

        let c = client(&server);
        assert!(c.fetch_forecast(PARIS).await.is_none());
        assert!(matches!(
            c.try_forecast(PARIS).await,
            Err(SourceError::Missing { field: "list[].weather[0]", .. })
        ));
    }

    #[tokio::test]
    async fn forecast_entry_with_out_of_range_time_is_absent() {
        let server = MockServer::start().await;
        mount_forecast(&server, forecast_entry(i64::MAX, 10.0, 12.0)).await;

        let c = client(&server);
        assert!(c.fetch_forecast(PARIS).await.is_none());
        assert!(matches!(
            c.try_forecast(PARIS).await,
            Err(SourceError::Missing { field: "list[].dt", .. })
        ));
    }

    #[tokio::test]
    async fn resolve_non_200_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(GEOCODING_PATH))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "cod": 401, "message": "Invalid API key" })),
            )
            .mount(&server)
            .await;

        let c = client(&server);
        assert!(c.resolve("Paris").await.is_none());

        let err = c.try_resolve("Paris").await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Status { status, .. } if status == StatusCode::UNAUTHORIZED
        ));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);

        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
