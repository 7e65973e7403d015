use thiserror::Error;

/// Errors surfaced to the view layer.
///
/// Every variant carries a short message suitable for showing to the user
/// as-is. Detailed causes (HTTP status, JSON errors, ...) are logged where
/// they happen and deliberately not carried here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("Geolocation is not supported on this device")]
    GeolocationUnavailable,

    #[error("Unable to retrieve your location")]
    GeolocationDenied,

    #[error("Unable to fetch weather data. Please check the location and try again.")]
    FetchFailed,

    #[error(
        "No WeatherAPI key configured.\n\
         Hint: run `weathertap configure` or set WEATHER_API_KEY."
    )]
    MissingApiKey,

    #[error("Location query must not be empty")]
    InvalidQuery,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_never_empty() {
        let all = [
            WeatherError::GeolocationUnavailable,
            WeatherError::GeolocationDenied,
            WeatherError::FetchFailed,
            WeatherError::MissingApiKey,
            WeatherError::InvalidQuery,
        ];

        for err in all {
            assert!(!err.to_string().is_empty());
        }
    }
}
