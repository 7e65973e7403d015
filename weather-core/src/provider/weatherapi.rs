use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    LocationQuery, WeatherError,
    model::{Alert, CurrentConditions, ForecastBundle, ForecastDay, WeatherReport},
};

use super::WeatherFetcher;

/// Forecast length requested from the provider.
pub const FORECAST_DAYS: u8 = 3;

/// Client for the WeatherAPI.com `current.json` and `forecast.json` endpoints.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for WeatherAPI")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch_current(&self, query: &LocationQuery) -> Result<CurrentConditions> {
        let parsed: WaCurrentResponse = self.get_json(query, "current", &[]).await?;

        Ok(parsed.into_conditions())
    }

    async fn fetch_forecast(&self, query: &LocationQuery) -> Result<ForecastBundle> {
        let days = FORECAST_DAYS.to_string();
        let parsed: WaForecastResponse = self
            .get_json(query, "forecast", &[("days", days.as_str()), ("alerts", "yes")])
            .await?;

        Ok(parsed.into_bundle())
    }

    /// GET `{base}/{endpoint}.json` and decode the body.
    ///
    /// Query parameters are URL-escaped by `reqwest`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        query: &LocationQuery,
        endpoint: &str,
        extra: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{endpoint}.json", self.base_url);
        debug!(%url, query = %query, "requesting WeatherAPI {endpoint}");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", query.as_str())])
            .query(extra)
            .send()
            .await
            // The request URL carries the API key.
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to send request to WeatherAPI.com ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to read WeatherAPI {endpoint} response body"))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<WaErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| truncate_body(&body));

            return Err(anyhow!(
                "WeatherAPI {endpoint} request failed with status {status}: {detail}"
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse WeatherAPI {endpoint} JSON"))
    }
}

#[async_trait]
impl WeatherFetcher for WeatherApiClient {
    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherReport, WeatherError> {
        // Both requests are in flight before either resolves; the first
        // failure short-circuits the join.
        let joined = tokio::try_join!(self.fetch_current(query), self.fetch_forecast(query));

        match joined {
            Ok((current, forecast)) => {
                info!(
                    query = %query,
                    resolved = %current.location_name,
                    days = forecast.days.len(),
                    alerts = forecast.alerts.len(),
                    "weather fetched"
                );
                Ok(WeatherReport { current, forecast })
            }
            Err(err) => {
                warn!(query = %query, error = ?err, "weather fetch failed");
                Err(WeatherError::FetchFailed)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    condition: WaCondition,
    wind_kph: f64,
    wind_dir: Option<String>,
    humidity: u8,
    vis_km: Option<f64>,
    feelslike_c: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    location: WaLocation,
    current: WaCurrent,
}

impl WaCurrentResponse {
    fn into_conditions(self) -> CurrentConditions {
        CurrentConditions {
            location_name: self.location.name,
            country: self.location.country,
            temperature_c: self.current.temp_c,
            condition: self.current.condition.text,
            wind_kph: self.current.wind_kph,
            wind_dir: self.current.wind_dir,
            humidity_pct: self.current.humidity,
            visibility_km: self.current.vis_km,
            feels_like_c: self.current.feelslike_c,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Default, Deserialize)]
struct WaAstro {
    sunrise: Option<String>,
    sunset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    day: WaDay,
    #[serde(default)]
    astro: WaAstro,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaAlert {
    headline: String,
}

#[derive(Debug, Default, Deserialize)]
struct WaAlerts {
    #[serde(default)]
    alert: Vec<WaAlert>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    forecast: WaForecast,
    #[serde(default)]
    alerts: WaAlerts,
}

impl WaForecastResponse {
    fn into_bundle(self) -> ForecastBundle {
        let days = self
            .forecast
            .forecastday
            .into_iter()
            .map(|d| ForecastDay {
                date: d.date,
                min_temp_c: d.day.mintemp_c,
                max_temp_c: d.day.maxtemp_c,
                condition: d.day.condition.text,
                sunrise: d.astro.sunrise,
                sunset: d.astro.sunset,
            })
            .collect();

        let alerts = self
            .alerts
            .alert
            .into_iter()
            .map(|a| Alert { headline: a.headline })
            .collect();

        ForecastBundle { days, alerts }
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaErrorResponse {
    error: WaErrorDetail,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
