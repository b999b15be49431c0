//! Plain-text rendering of dashboard panels.

use std::collections::BTreeSet;

use chrono_tz::Tz;
use dashboard_core::{
    DailySummary, Panel, TemperatureSeries, WeatherSnapshot,
    model::{capitalize, icon_url},
};

const CHART_HEIGHT: usize = 10;
const COLUMN_WIDTH: usize = 8;
const MAX_MARK: char = '▲';
const MIN_MARK: char = '▼';
const BOTH_MARK: char = '◆';

pub fn panel(panel: &Panel, tz: Tz) -> String {
    match panel {
        Panel::Current(snapshot) => current(snapshot, tz),
        Panel::Forecast(Some(days)) => forecast(days),
        Panel::Chart(Some(series)) => chart(series),
        Panel::Forecast(None) | Panel::Chart(None) => "Forecast unavailable right now.".to_string(),
        Panel::History(cities) => history(cities),
    }
}

/// Terminal stand-in for an OpenWeather icon code such as `10d`.
pub fn glyph(icon: &str) -> &'static str {
    let night = icon.ends_with('n');
    match icon.get(..2) {
        Some("01") if night => "🌙",
        Some("01") => "☀️",
        Some("02") => "⛅",
        Some("03") | Some("04") => "☁️",
        Some("09") => "🌧️",
        Some("10") => "🌦️",
        Some("11") => "⛈️",
        Some("13") => "❄️",
        Some("50") => "🌫️",
        _ => "🌡️",
    }
}

fn current(s: &WeatherSnapshot, tz: Tz) -> String {
    let sunrise = s.sunrise.with_timezone(&tz).format("%H:%M");
    let sunset = s.sunset.with_timezone(&tz).format("%H:%M");

    [
        format!("📍 {}, {}", s.location_name, s.country),
        format!("{}  {}", glyph(&s.icon), icon_url(&s.icon)),
        String::new(),
        format!("🌡️  Temperature   {:.1}°C", s.temperature_c),
        format!("🥵 Feels like    {:.1}°C", s.feels_like_c),
        format!("💧 Humidity      {}%", s.humidity_pct),
        format!("🌀 Pressure      {:.0} hPa", s.pressure_hpa),
        format!("☁️  Clouds        {}%", s.clouds_pct),
        format!("🌬️  Wind          {:.1} m/s", s.wind_speed_mps),
        String::new(),
        format!("🌅 Sunrise: {sunrise} | 🌇 Sunset: {sunset}"),
        format!("📖 Condition: {}", capitalize(&s.condition)),
    ]
    .join("\n")
}

fn forecast(days: &[DailySummary]) -> String {
    let mut lines = vec![format!("📅 Forecast for the next {} days", days.len())];

    lines.extend(days.iter().map(|d| {
        format!(
            "{}  {} — {} 🌡️ {:.1}°C ~ {:.1}°C",
            glyph(&d.icon),
            d.label,
            capitalize(&d.description),
            d.temp_min_c,
            d.temp_max_c,
        )
    }));

    lines.join("\n")
}

/// ASCII chart of daily max and min, one column per day.
fn chart(series: &TemperatureSeries) -> String {
    if series.is_empty() {
        return "No forecast data to chart.".to_string();
    }

    let hi = series.max_c.iter().chain(&series.min_c).copied().fold(f64::MIN, f64::max);
    let lo = series.max_c.iter().chain(&series.min_c).copied().fold(f64::MAX, f64::min);
    let span = (hi - lo).max(1.0);
    let steps = (CHART_HEIGHT - 1) as f64;
    let row_of = |t: f64| (((hi - t) / span) * steps).round() as usize;

    let mut grid = vec![vec![' '; series.len()]; CHART_HEIGHT];
    for (col, (&max, &min)) in series.max_c.iter().zip(&series.min_c).enumerate() {
        let (max_row, min_row) = (row_of(max), row_of(min));
        if max_row == min_row {
            grid[max_row][col] = BOTH_MARK;
        } else {
            grid[max_row][col] = MAX_MARK;
            grid[min_row][col] = MIN_MARK;
        }
    }

    let mut lines = vec![format!("📊 Temperature chart ({} days)", series.len()), String::new()];

    for (row, marks) in grid.iter().enumerate() {
        let temp = hi - span * row as f64 / steps;
        let cells: String = marks
            .iter()
            .map(|m| format!("{:^width$}", m, width = COLUMN_WIDTH))
            .collect();
        lines.push(format!("{temp:>6.1} │{}", cells.trim_end()));
    }

    lines.push(format!("{:>6} └{}", "", "─".repeat(series.len() * COLUMN_WIDTH)));

    let labels: String = series
        .labels
        .iter()
        .map(|l| format!("{:^width$}", l, width = COLUMN_WIDTH))
        .collect();
    lines.push(format!("{:>6}  {}", "", labels.trim_end()));
    lines.push(String::new());
    lines.push(format!("{MAX_MARK} Max °C   {MIN_MARK} Min °C"));

    lines.join("\n")
}

fn history(cities: &BTreeSet<String>) -> String {
    if cities.is_empty() {
        return "No searches yet.".to_string();
    }

    let mut lines = vec!["📍 Search history".to_string()];
    lines.extend(cities.iter().map(|c| format!("  • {c}")));
    lines.join("\n")
}
