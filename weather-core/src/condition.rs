use serde::{Deserialize, Serialize};

/// Icon shown next to a condition text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconCategory {
    Cloudy,
    Sunny,
    Rainy,
    Default,
}

impl IconCategory {
    /// Terminal glyph for the category. `Default` draws as sunny.
    pub fn glyph(&self) -> &'static str {
        match self {
            IconCategory::Cloudy => "☁",
            IconCategory::Sunny | IconCategory::Default => "☀",
            IconCategory::Rainy => "💧",
        }
    }
}

/// Maps a provider condition text to an icon.
///
/// Substring match ignoring ASCII case, first hit wins:
/// `cloudy`, then `sunny`, then `rain`.
pub fn classify(condition: &str) -> IconCategory {
    let condition = condition.to_ascii_lowercase();
    if condition.contains("cloudy") {
        IconCategory::Cloudy
    } else if condition.contains("sunny") {
        IconCategory::Sunny
    } else if condition.contains("rain") {
        IconCategory::Rainy
    } else {
        IconCategory::Default
    }
}
