//! Text presentation of a [`ViewState`].
//!
//! Everything here is a pure function of the state passed in. Icons and
//! temperatures are derived on every call; nothing is cached.

use std::fmt::Write as _;

use crate::{
    condition::{IconCategory, classify},
    state::{Theme, ViewState},
    units::{UNAVAILABLE, format_reading, format_temperature},
};

pub const APP_NAME: &str = "WeatherTap";
pub const SHARE_BASE_URL: &str = "https://wa.me/";

/// ANSI styling for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub title: &'static str,
    pub accent: &'static str,
    pub muted: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                title: "\x1b[1;97m",
                accent: "\x1b[96m",
                muted: "\x1b[90m",
                error: "\x1b[91m",
                warning: "\x1b[93m",
                reset: "\x1b[0m",
            },
            Theme::Light => Self {
                title: "\x1b[1;34m",
                accent: "\x1b[34m",
                muted: "\x1b[37m",
                error: "\x1b[31m",
                warning: "\x1b[33m",
                reset: "\x1b[0m",
            },
        }
    }

    /// No escape codes at all, for pipes and tests.
    pub fn plain() -> Self {
        Self {
            title: "",
            accent: "",
            muted: "",
            error: "",
            warning: "",
            reset: "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedDetails {
    pub sunrise: String,
    pub sunset: String,
    pub feels_like: String,
    pub wind_direction: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastCard {
    /// Short weekday, e.g. `Mon`.
    pub weekday: String,
    pub icon: IconCategory,
    pub max: String,
    pub min: String,
    pub condition: String,
}

/// Sunrise/sunset of the first forecast day plus feels-like and wind
/// direction. `None` unless the panel is enabled and forecast days exist.
pub fn advanced_details(state: &ViewState) -> Option<AdvancedDetails> {
    if !state.show_advanced {
        return None;
    }
    let current = state.current.as_ref()?;
    let first_day = state.forecast.as_ref()?.days.first()?;

    Some(AdvancedDetails {
        sunrise: first_day
            .sunrise
            .clone()
            .unwrap_or_else(|| UNAVAILABLE.to_string()),
        sunset: first_day
            .sunset
            .clone()
            .unwrap_or_else(|| UNAVAILABLE.to_string()),
        feels_like: format_reading(current.feels_like_c, state.unit),
        wind_direction: current
            .wind_dir
            .clone()
            .unwrap_or_else(|| UNAVAILABLE.to_string()),
    })
}

pub fn forecast_cards(state: &ViewState) -> Vec<ForecastCard> {
    let Some(forecast) = state.forecast.as_ref() else {
        return Vec::new();
    };

    forecast
        .days
        .iter()
        .map(|day| ForecastCard {
            weekday: day.date.format("%a").to_string(),
            icon: classify(&day.condition),
            max: format_temperature(day.max_temp_c, state.unit),
            min: format_temperature(day.min_temp_c, state.unit),
            condition: day.condition.clone(),
        })
        .collect()
}

/// Message shared to chat apps. `None` until weather is loaded.
pub fn share_text(state: &ViewState) -> Option<String> {
    let current = state.current.as_ref()?;

    Some(format!(
        "🌦️ Current Weather in {location}:\n\
         Temperature: {temperature}\n\
         Condition: {condition}\n\
         Wind: {wind} km/h\n\
         Humidity: {humidity}%\n\
         \n\
         Shared via {APP_NAME} App 📱",
        location = current.display_location(),
        temperature = format_temperature(current.temperature_c, state.unit),
        condition = current.condition,
        wind = current.wind_kph,
        humidity = current.humidity_pct,
    ))
}

/// WhatsApp share link carrying `text`.
pub fn share_url(text: &str) -> String {
    format!("{SHARE_BASE_URL}?text={}", urlencoding::encode(text))
}

/// Full screen using the palette for the state's theme.
pub fn render(state: &ViewState) -> String {
    render_with(state, &Palette::for_theme(state.theme))
}

pub fn render_with(state: &ViewState, p: &Palette) -> String {
    let mut out = String::new();

    let theme = if state.theme.is_dark() { "dark" } else { "light" };
    let _ = writeln!(
        out,
        "{}{APP_NAME}{}  {}[{}] [{theme}]{}",
        p.title, p.reset, p.muted, state.unit, p.reset
    );
    if state.show_location_hint {
        let _ = writeln!(
            out,
            "{}Tip: type :locate to use your current location{}",
            p.accent, p.reset
        );
    }
    let _ = writeln!(out, "Search: {}", state.query);
    out.push('\n');

    if state.loading {
        let _ = writeln!(out, "Fetching weather data...");
        return out;
    }
    if state.locating {
        let _ = writeln!(out, "Locating...");
        return out;
    }
    if let Some(error) = state.error.as_deref() {
        let _ = writeln!(out, "{}{error}{}", p.error, p.reset);
        return out;
    }
    let Some(current) = state.current.as_ref() else {
        let _ = writeln!(
            out,
            "{}Enter a city or zip code to get started.{}",
            p.muted, p.reset
        );
        return out;
    };

    if let Some(alert) = state.forecast.as_ref().and_then(|f| f.alerts.first()) {
        let _ = writeln!(
            out,
            "{}⚠ Weather Alert: {}{}",
            p.warning, alert.headline, p.reset
        );
        out.push('\n');
    }

    let _ = writeln!(out, "{}📍 {}{}", p.accent, current.display_location(), p.reset);
    let _ = writeln!(
        out,
        "{}  {}  {}",
        classify(&current.condition).glyph(),
        format_temperature(current.temperature_c, state.unit),
        current.condition
    );
    let visibility = current
        .visibility_km
        .map(|v| format!("{v} km"))
        .unwrap_or_else(|| UNAVAILABLE.to_string());
    let _ = writeln!(
        out,
        "Wind: {} km/h   Humidity: {}%   Visibility: {visibility}",
        current.wind_kph, current.humidity_pct
    );

    if let Some(details) = advanced_details(state) {
        out.push('\n');
        let _ = writeln!(
            out,
            "Sunrise: {}   Sunset: {}",
            details.sunrise, details.sunset
        );
        let _ = writeln!(
            out,
            "Feels like: {}   Wind direction: {}",
            details.feels_like, details.wind_direction
        );
    }

    let cards = forecast_cards(state);
    if !cards.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "{}3-Day Forecast{}", p.title, p.reset);
        for card in cards {
            let _ = writeln!(
                out,
                "  {:<4}{} {:>6} / {:<6} {}{}{}",
                card.weekday,
                card.icon.glyph(),
                card.max,
                card.min,
                p.muted,
                card.condition,
                p.reset
            );
        }
    }

    out
}
