//! One-shot device location lookup.
//!
//! A terminal has no GPS, so the default adapter asks an IP geolocation
//! service. Results are always handed back in the `"lat,lon"` form the
//! weather provider accepts as a query.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::{Config, WeatherError};

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Returns `"<lat>,<lon>"` on success.
    async fn request_location(&self) -> Result<String, WeatherError>;
}

pub fn format_coordinates(lat: f64, lon: f64) -> String {
    format!("{lat},{lon}")
}

/// Parses and normalises a `"lat,lon"` string.
pub fn parse_coordinates(raw: &str) -> Option<(f64, f64)> {
    let (lat, lon) = raw.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;

    let in_range = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon);
    in_range.then_some((lat, lon))
}

/// Looks up the public IP's approximate position via ip-api.com.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    endpoint: String,
    http: Client,
}

impl IpGeolocator {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for geolocation")?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            http,
        })
    }

    async fn lookup(&self) -> Result<(f64, f64)> {
        let res = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .context("Failed to send geolocation request")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("Geolocation request failed with status {status}"));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .context("Failed to parse geolocation response")?;

        if body.status.as_deref() == Some("fail") {
            return Err(anyhow!(
                "Geolocation service refused lookup: {}",
                body.message.unwrap_or_else(|| "unknown reason".to_string())
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err(anyhow!("Geolocation response contained no coordinates")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn request_location(&self) -> Result<String, WeatherError> {
        match self.lookup().await {
            Ok((lat, lon)) => {
                debug!(lat, lon, "geolocation resolved");
                Ok(format_coordinates(lat, lon))
            }
            Err(err) => {
                warn!(error = ?err, "geolocation failed");
                Err(WeatherError::GeolocationDenied)
            }
        }
    }
}

/// Returns preconfigured coordinates, or reports geolocation as unsupported.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    coordinates: Option<(f64, f64)>,
}

impl FixedGeolocator {
    pub fn new(coordinates: Option<(f64, f64)>) -> Self {
        Self { coordinates }
    }

    pub fn unsupported() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn request_location(&self) -> Result<String, WeatherError> {
        self.coordinates
            .map(|(lat, lon)| format_coordinates(lat, lon))
            .ok_or(WeatherError::GeolocationUnavailable)
    }
}

/// Fixed coordinates from config win; otherwise fall back to IP lookup.
pub fn geolocator_from_config(config: &Config) -> Result<Arc<dyn Geolocator>> {
    if let Some(raw) = config.coordinates.as_deref() {
        let coords = parse_coordinates(raw)
            .ok_or_else(|| anyhow!("Invalid coordinates '{raw}' in config, expected \"lat,lon\""))?;
        return Ok(Arc::new(FixedGeolocator::new(Some(coords))));
    }

    Ok(Arc::new(IpGeolocator::new(
        config.geolocation_url(),
        config.timeout(),
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_use_plain_comma_form() {
        assert_eq!(format_coordinates(48.8566, 2.3522), "48.8566,2.3522");
        assert_eq!(format_coordinates(-33.5, 151.0), "-33.5,151");
    }

    #[test]
    fn parse_coordinates_accepts_spaces_and_rejects_garbage() {
        assert_eq!(parse_coordinates("48.85, 2.35"), Some((48.85, 2.35)));
        assert_eq!(parse_coordinates("Paris"), None);
        assert_eq!(parse_coordinates("91,0"), None);
        assert_eq!(parse_coordinates("0,181"), None);
    }

    #[tokio::test]
    async fn fixed_geolocator_without_coordinates_is_unsupported() {
        let geo = FixedGeolocator::unsupported();
        assert_eq!(
            geo.request_location().await,
            Err(WeatherError::GeolocationUnavailable)
        );
    }

    #[tokio::test]
    async fn fixed_geolocator_returns_query_string() {
        let geo = FixedGeolocator::new(Some((51.5, -0.12)));
        assert_eq!(geo.request_location().await.as_deref(), Ok("51.5,-0.12"));
    }

    #[test]
    fn config_with_bad_coordinates_is_rejected() {
        let cfg = Config {
            coordinates: Some("north".into()),
            ..Config::default()
        };
        let err = geolocator_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Invalid coordinates"));
    }
}
