use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Shown instead of a temperature the provider did not report.
pub const UNAVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "°{}", self.symbol())
    }
}

impl FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{s}'. Supported units: c, f."
            )),
        }
    }
}

/// Formats a Celsius reading in the requested unit.
///
/// Celsius values are printed as given; Fahrenheit values are converted and
/// rounded to the nearest integer, halves rounding up.
pub fn format_temperature(celsius: f64, unit: TemperatureUnit) -> String {
    match unit {
        TemperatureUnit::Celsius => format!("{celsius}°C"),
        TemperatureUnit::Fahrenheit => {
            let fahrenheit = (celsius * 9.0 / 5.0 + 32.0 + 0.5).floor();
            format!("{fahrenheit}°F")
        }
    }
}

/// Like [`format_temperature`], but missing readings become [`UNAVAILABLE`].
pub fn format_reading(celsius: Option<f64>, unit: TemperatureUnit) -> String {
    celsius
        .map(|c| format_temperature(c, unit))
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}
