use serde::{Deserialize, Serialize};

use crate::{
    model::{CurrentConditions, ForecastBundle},
    units::TemperatureUnit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

/// Where the fetch state machine currently is. Derived from [`ViewState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Everything the renderer needs to draw a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub query: String,
    pub current: Option<CurrentConditions>,
    pub forecast: Option<ForecastBundle>,
    pub loading: bool,
    /// A geolocation request is outstanding.
    pub locating: bool,
    pub error: Option<String>,
    pub theme: Theme,
    pub unit: TemperatureUnit,
    pub show_advanced: bool,
    pub show_location_hint: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Theme::default(), TemperatureUnit::default())
    }
}

impl ViewState {
    pub fn new(theme: Theme, unit: TemperatureUnit) -> Self {
        Self {
            query: String::new(),
            current: None,
            forecast: None,
            loading: false,
            locating: false,
            error: None,
            theme,
            unit,
            show_advanced: false,
            show_location_hint: true,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.current.is_some() {
            Phase::Loaded
        } else {
            Phase::Idle
        }
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }
}
