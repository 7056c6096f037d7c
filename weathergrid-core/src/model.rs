use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// City used when the city input is empty.
pub const DEFAULT_CITY: &str = "Munich";
/// Country used when the country input is empty.
pub const DEFAULT_COUNTRY: &str = "Germany";

/// Fixed English day-name table, Sunday-first.
const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Free-text city/country pair as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub country: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            city: DEFAULT_CITY.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

impl Location {
    /// City to send upstream; an empty input falls back to the default.
    pub fn effective_city(&self) -> &str {
        if self.city.is_empty() { DEFAULT_CITY } else { &self.city }
    }

    /// Country to send upstream; an empty input falls back to the default.
    pub fn effective_country(&self) -> &str {
        if self.country.is_empty() { DEFAULT_COUNTRY } else { &self.country }
    }
}

/// Coordinates as resolved by the geocoding service. Ephemeral: handed
/// straight to the forecast client, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Daily forecast payload as returned by the weather service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub daily: DailySeries,
}

/// Four parallel ordered sequences, indexed positionally: entry `i` of
/// each sequence describes the same day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
    pub rain_sum: Vec<f64>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// All four sequences must have equal length.
    pub fn is_aligned(&self) -> bool {
        let n = self.time.len();
        self.temperature_2m_max.len() == n
            && self.temperature_2m_min.len() == n
            && self.rain_sum.len() == n
    }

    pub fn day(&self, index: usize) -> Option<ForecastDay<'_>> {
        Some(ForecastDay {
            date: self.time.get(index)?,
            temp_max: *self.temperature_2m_max.get(index)?,
            temp_min: *self.temperature_2m_min.get(index)?,
            rain_sum: *self.rain_sum.get(index)?,
        })
    }

    pub fn days(&self) -> impl Iterator<Item = ForecastDay<'_>> {
        (0..self.len()).filter_map(|i| self.day(i))
    }
}

/// One day of the forecast, viewed across the parallel sequences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastDay<'a> {
    pub date: &'a str,
    pub temp_max: f64,
    pub temp_min: f64,
    pub rain_sum: f64,
}

/// Grid label for day `index`: "Today" for index 0, otherwise the weekday
/// name of the `YYYY-MM-DD` date. An unparseable date is used verbatim.
pub fn day_label(index: usize, date: &str) -> String {
    if index == 0 {
        return "Today".to_string();
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => DAY_NAMES[parsed.weekday().num_days_from_sunday() as usize].to_string(),
        Err(_) => date.to_string(),
    }
}
