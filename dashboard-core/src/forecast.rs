//! Reduction of 3-hour forecast samples into per-day summaries.

use chrono::{NaiveDate, TimeZone};

use crate::model::{DailySummary, ForecastEntry};

/// Number of days kept after aggregation.
pub const MAX_DAYS: usize = 5;

pub fn day_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// Groups entries by calendar day in `tz` and keeps the first [`MAX_DAYS`]
/// days in order of first appearance.
///
/// Days are not sorted: if the input is out of order, the earliest days
/// *encountered* win, not the earliest dates.
pub fn aggregate<Z: TimeZone>(entries: &[ForecastEntry], tz: &Z) -> Vec<DailySummary> {
    let mut days = group_by_day(entries, tz);
    days.truncate(MAX_DAYS);
    days
}

/// Every calendar day in `tz`, in order of first appearance. No truncation.
pub fn group_by_day<Z: TimeZone>(entries: &[ForecastEntry], tz: &Z) -> Vec<DailySummary> {
    let mut days: Vec<DailySummary> = Vec::new();

    for entry in entries {
        let date = entry.time.with_timezone(tz).date_naive();

        match days.iter_mut().find(|day| day.date == date) {
            Some(day) => {
                day.temp_min_c = day.temp_min_c.min(entry.temp_min_c);
                day.temp_max_c = day.temp_max_c.max(entry.temp_max_c);
            }
            None => days.push(DailySummary {
                date,
                label: day_label(date),
                temp_min_c: entry.temp_min_c,
                temp_max_c: entry.temp_max_c,
                description: entry.description.clone(),
                icon: entry.icon.clone(),
            }),
        }
    }

    days
}

/// Parallel max/min series for charting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureSeries {
    pub labels: Vec<String>,
    pub max_c: Vec<f64>,
    pub min_c: Vec<f64>,
}

impl TemperatureSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl From<&[DailySummary]> for TemperatureSeries {
    fn from(days: &[DailySummary]) -> Self {
        Self {
            labels: days.iter().map(|d| d.label.clone()).collect(),
            max_c: days.iter().map(|d| d.temp_max_c).collect(),
            min_c: days.iter().map(|d| d.temp_min_c).collect(),
        }
    }
}
