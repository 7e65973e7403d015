//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use weathertap_core::{
    CurrentConditions, ForecastBundle, ForecastDay, Geolocator, LocationQuery, Theme, ThemeSink,
    WeatherError, WeatherFetcher, WeatherReport,
};

pub const API_KEY: &str = "test-key";

pub fn paris_current_json() -> serde_json::Value {
    serde_json::json!({
        "location": { "name": "Paris", "region": "Ile-de-France", "country": "France" },
        "current": {
            "temp_c": 18.0,
            "condition": { "text": "Partly cloudy", "code": 1003 },
            "wind_kph": 13.0,
            "wind_dir": "WSW",
            "humidity": 64,
            "vis_km": 10.0,
            "feelslike_c": 17.2
        }
    })
}

pub fn paris_forecast_json() -> serde_json::Value {
    let day = |date: &str, max: f64, min: f64, text: &str| {
        serde_json::json!({
            "date": date,
            "day": { "maxtemp_c": max, "mintemp_c": min, "condition": { "text": text } },
            "astro": { "sunrise": "06:31 AM", "sunset": "09:12 PM" }
        })
    };

    serde_json::json!({
        "location": { "name": "Paris", "country": "France" },
        "current": { "temp_c": 18.0 },
        "forecast": { "forecastday": [
            day("2024-05-01", 20.0, 12.0, "Sunny"),
            day("2024-05-02", 19.0, 11.0, "Rain"),
            day("2024-05-03", 17.0, 10.0, "Cloudy"),
        ] },
        "alerts": { "alert": [ { "headline": "Thunderstorm watch" } ] }
    })
}

pub fn report_for(name: &str) -> WeatherReport {
    WeatherReport {
        current: CurrentConditions {
            location_name: name.to_string(),
            country: "Testland".to_string(),
            temperature_c: 21.0,
            condition: "Sunny".to_string(),
            wind_kph: 7.0,
            wind_dir: Some("N".to_string()),
            humidity_pct: 40,
            visibility_km: Some(10.0),
            feels_like_c: Some(20.0),
        },
        forecast: ForecastBundle {
            days: vec![ForecastDay {
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                min_temp_c: 10.0,
                max_temp_c: 22.0,
                condition: "Sunny".to_string(),
                sunrise: None,
                sunset: None,
            }],
            alerts: vec![],
        },
    }
}

/// Answers every query with a canned report after a per-query delay.
/// Queries listed in `failing` fail instead.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    pub delays: HashMap<String, Duration>,
    pub failing: Vec<String>,
    pub calls: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with_delays(delays: &[(&str, Duration)]) -> Self {
        Self {
            delays: delays
                .iter()
                .map(|(q, d)| ((*q).to_string(), *d))
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherFetcher for FakeFetcher {
    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherReport, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());

        if let Some(delay) = self.delays.get(query.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.iter().any(|q| q == query.as_str()) {
            return Err(WeatherError::FetchFailed);
        }
        Ok(report_for(query.as_str()))
    }
}

/// Answers a location lookup after `delay`, with `coords` or a denial.
#[derive(Debug)]
pub struct SlowGeolocator {
    pub delay: Duration,
    pub coords: Option<String>,
}

impl SlowGeolocator {
    pub fn denying(delay: Duration) -> Self {
        Self { delay, coords: None }
    }

    pub fn resolving(delay: Duration, coords: &str) -> Self {
        Self {
            delay,
            coords: Some(coords.to_string()),
        }
    }
}

#[async_trait]
impl Geolocator for SlowGeolocator {
    async fn request_location(&self) -> Result<String, WeatherError> {
        tokio::time::sleep(self.delay).await;
        self.coords.clone().ok_or(WeatherError::GeolocationDenied)
    }
}

#[derive(Debug, Default)]
pub struct RecordingThemeSink {
    pub applied: Mutex<Vec<Theme>>,
}

impl ThemeSink for RecordingThemeSink {
    fn apply_theme(&self, theme: Theme) {
        self.applied.lock().unwrap().push(theme);
    }
}

pub fn recording_sink() -> Arc<RecordingThemeSink> {
    Arc::new(RecordingThemeSink::default())
}
