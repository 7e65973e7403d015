//! Core library for the `weathertap` client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The WeatherAPI.com fetcher and the geolocation adapters
//! - The view state machine and its async session driver
//! - Unit conversion, condition icons and text rendering
//!
//! It is used by `weathertap-cli`, but can also be reused by other front ends.

pub mod condition;
pub mod config;
pub mod controller;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod render;
pub mod session;
pub mod state;
pub mod units;

pub use condition::{IconCategory, classify};
pub use config::Config;
pub use controller::{Command, Controller, Event};
pub use error::WeatherError;
pub use geolocation::Geolocator;
pub use model::{Alert, CurrentConditions, ForecastBundle, ForecastDay, LocationQuery, WeatherReport};
pub use provider::WeatherFetcher;
pub use session::{SessionHandle, SessionOptions, ThemeSink};
pub use state::{Phase, Theme, ViewState};
pub use units::{TemperatureUnit, format_temperature};
