use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WeatherError;

/// A user-supplied location: city name, postal code or `"lat,lon"`.
///
/// Only emptiness is checked; whether the location resolves is up to the
/// provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationQuery(String);

impl LocationQuery {
    pub fn new(raw: impl Into<String>) -> Result<Self, WeatherError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::InvalidQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for LocationQuery {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    pub temperature_c: f64,
    pub condition: String,
    pub wind_kph: f64,
    pub wind_dir: Option<String>,
    pub humidity_pct: u8,
    pub visibility_km: Option<f64>,
    /// Absent when the provider omits it; rendered as a placeholder.
    pub feels_like_c: Option<f64>,
}

impl CurrentConditions {
    /// `"<name>, <country>"` as shown in headings and share text.
    pub fn display_location(&self) -> String {
        format!("{}, {}", self.location_name, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub condition: String,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub headline: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub days: Vec<ForecastDay>,
    pub alerts: Vec<Alert>,
}

/// Result of one successful fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: ForecastBundle,
}

impl WeatherReport {
    /// The provider's canonical name for the queried location.
    pub fn resolved_location(&self) -> &str {
        &self.current.location_name
    }
}
