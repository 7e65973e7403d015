use crate::{
    Config, LocationQuery, WeatherError, WeatherReport, provider::weatherapi::WeatherApiClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

/// One fetch cycle against a weather provider.
///
/// Implementations must return either a complete report (current conditions
/// and forecast) or [`WeatherError::FetchFailed`]; partial results are never
/// surfaced.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherReport, WeatherError>;
}

/// Construct the WeatherAPI.com fetcher from config.
pub fn fetcher_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherFetcher>> {
    let api_key = config.require_api_key()?;
    let client = WeatherApiClient::new(api_key.to_owned(), config.base_url(), config.timeout())?;

    Ok(Arc::new(client))
}
