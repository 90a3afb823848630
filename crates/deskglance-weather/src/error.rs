//! Error types for location and weather acquisition.
//!
//! None of these reach the caller of `resolve()`: every step converts its
//! failure into the next fallback and the view only sees resulting state.

use thiserror::Error;

/// Coarse failure classes shared by every acquisition step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    Timeout,
    NetworkFailure,
    MalformedResponse,
    /// No usable location data
    NotFound,
}

/// Geolocation and geocoding errors
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Malformed location response: {0}")]
    MalformedResponse(String),
    #[error("No usable location data")]
    NotFound,
}

impl LocationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::PermissionDenied => FailureKind::PermissionDenied,
            Self::Timeout => FailureKind::Timeout,
            Self::Unavailable | Self::NotFound => FailureKind::NotFound,
            Self::Network(e) => classify_reqwest(e),
            Self::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }
}

/// Weather provider errors
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API returned status {0}")]
    Status(u16),
    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(e) => classify_reqwest(e),
            Self::Status(_) => FailureKind::NetworkFailure,
            Self::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }
}

/// Why one step of the location-and-weather pipeline fell through.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Device geolocation refused or failed for a reason other than timeout.
    #[error("Geolocation failed: {0}")]
    GeolocationDenied(#[source] LocationError),
    #[error("Geolocation timed out")]
    GeolocationTimeout,
    /// Non-fatal: degrades to a coordinate label.
    #[error("Reverse geocoding failed: {0}")]
    ReverseGeocodeFailed(#[source] LocationError),
    #[error("IP location lookup failed: {0}")]
    IpLookupFailed(#[source] LocationError),
    #[error("Weather fetch failed: {0}")]
    WeatherFetchFailed(#[from] WeatherError),
}

impl AcquisitionError {
    pub fn from_geolocation(err: LocationError) -> Self {
        match err {
            LocationError::Timeout => Self::GeolocationTimeout,
            other => Self::GeolocationDenied(other),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::GeolocationDenied(e) | Self::ReverseGeocodeFailed(e) | Self::IpLookupFailed(e) => {
                e.kind()
            }
            Self::GeolocationTimeout => FailureKind::Timeout,
            Self::WeatherFetchFailed(e) => e.kind(),
        }
    }

    /// User-friendly message for logs surfaced in a diagnostics view.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            FailureKind::PermissionDenied => "Location permission was denied.",
            FailureKind::Timeout => "The request timed out. Please try again.",
            FailureKind::NetworkFailure => "Unable to connect. Check your internet connection.",
            FailureKind::MalformedResponse => "Received an unexpected response. Please try again.",
            FailureKind::NotFound => "Location could not be determined.",
        }
    }
}

fn classify_reqwest(error: &reqwest::Error) -> FailureKind {
    if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_decode() {
        FailureKind::MalformedResponse
    } else {
        FailureKind::NetworkFailure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geolocation_timeout_is_distinct() {
        let err = AcquisitionError::from_geolocation(LocationError::Timeout);
        assert!(matches!(err, AcquisitionError::GeolocationTimeout));
        assert_eq!(err.kind(), FailureKind::Timeout);
    }

    #[test]
    fn test_geolocation_denied_keeps_cause() {
        let err = AcquisitionError::from_geolocation(LocationError::PermissionDenied);
        assert_eq!(err.kind(), FailureKind::PermissionDenied);
        assert_eq!(err.user_message(), "Location permission was denied.");
    }

    #[test]
    fn test_ip_lookup_not_found() {
        let err = AcquisitionError::IpLookupFailed(LocationError::NotFound);
        assert_eq!(err.kind(), FailureKind::NotFound);
        assert!(err.to_string().contains("IP location lookup failed"));
    }

    #[test]
    fn test_weather_error_kinds() {
        assert_eq!(WeatherError::Status(503).kind(), FailureKind::NetworkFailure);
        assert_eq!(
            WeatherError::MalformedResponse("eof".into()).kind(),
            FailureKind::MalformedResponse
        );
    }
}
