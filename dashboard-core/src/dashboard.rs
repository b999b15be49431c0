//! One user session: submissions, the selected view and the search history.

use std::{collections::BTreeSet, fmt};

use chrono_tz::Tz;

use crate::{
    error::LookupError,
    forecast::{self, TemperatureSeries},
    history::SessionHistory,
    model::{Coordinates, DailySummary, ForecastEntry, WeatherSnapshot},
    provider::WeatherSource,
};

/// The four dashboard views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Current,
    Forecast,
    Chart,
    History,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Current => "current",
            View::Forecast => "forecast",
            View::Chart => "chart",
            View::History => "history",
        }
    }

    pub const fn all() -> &'static [View] {
        &[View::Current, View::Forecast, View::Chart, View::History]
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Current => "🌍 Current weather",
            View::Forecast => "📆 Forecast",
            View::Chart => "📈 Chart",
            View::History => "🕓 Search history",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Data for one rendered view.
///
/// Forecast-based panels carry `None` when the forecast itself could not
/// be fetched after the city was found.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Current(WeatherSnapshot),
    Forecast(Option<Vec<DailySummary>>),
    Chart(Option<TemperatureSeries>),
    History(BTreeSet<String>),
}

/// Session state, created at session start and dropped at its end.
#[derive(Debug)]
pub struct Dashboard {
    source: Box<dyn WeatherSource>,
    timezone: Tz,
    history: SessionHistory,
}

impl Dashboard {
    pub fn new(source: Box<dyn WeatherSource>, timezone: Tz) -> Self {
        Self {
            source,
            timezone,
            history: SessionHistory::new(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Looks `city` up and builds the panel for `view`.
    ///
    /// Current weather and coordinates must both resolve before anything is
    /// recorded or rendered; the forecast is only requested for the views
    /// that need it.
    pub async fn submit(&mut self, city: &str, view: View) -> Result<Panel, LookupError> {
        if city.trim().is_empty() {
            return Err(LookupError::EmptyCity);
        }

        let current = self.source.fetch_current(city).await;
        let coordinates = self.source.resolve(city).await;

        let (Some(current), Some(coordinates)) = (current, coordinates) else {
            tracing::info!(city, "lookup failed");
            return Err(LookupError::NotFound);
        };

        self.history.record(city);
        tracing::info!(city, view = view.as_str(), "lookup succeeded");

        let panel = match view {
            View::Current => Panel::Current(current),
            View::Forecast => Panel::Forecast(
                self.fetch_entries(coordinates)
                    .await
                    .map(|entries| forecast::aggregate(&entries, &self.timezone)),
            ),
            // The chart plots every day in the window, not just the listed five.
            View::Chart => Panel::Chart(self.fetch_entries(coordinates).await.map(|entries| {
                let days = forecast::group_by_day(&entries, &self.timezone);
                TemperatureSeries::from(days.as_slice())
            })),
            View::History => Panel::History(self.history.snapshot()),
        };

        Ok(panel)
    }

    async fn fetch_entries(&self, at: Coordinates) -> Option<Vec<ForecastEntry>> {
        self.source.fetch_forecast(at).await
    }
}
