use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Persisted aggregate of everything the widget remembers between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Clock appearance
    pub clock: ClockConfig,

    /// Home Assistant endpoint (consumed by the dashboard panel, not the core)
    pub home_assistant: HomeAssistantConfig,

    /// Location and weather acquisition settings
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Digit colour, `#rgb` or `#rrggbb`
    pub color: String,

    /// CSS-style font weight
    pub font_weight: u16,

    /// Randomly tilt individual digits
    pub enable_tilt: bool,

    /// Show the seconds pair
    pub show_seconds: bool,

    /// 0.0 (transparent) to 1.0 (opaque)
    pub opacity: f32,

    /// 24-hour display; false means 12-hour
    pub is_24_hour: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            font_weight: 800,
            enable_tilt: true,
            show_seconds: false,
            opacity: 0.9,
            is_24_hour: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HomeAssistantConfig {
    pub url: String,
    pub token: String,
    pub entities: Vec<String>,
}

impl HomeAssistantConfig {
    /// Check if an endpoint has been entered
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.token.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Upper wait bound handed to the platform geolocation request
    pub geolocation_timeout_secs: u64,

    /// Outer bound for a whole location-and-weather resolution
    pub resolve_timeout_secs: u64,

    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,

    /// Reference city used when every location source fails
    pub fallback_latitude: f64,
    pub fallback_longitude: f64,
    pub fallback_name: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geolocation_timeout_secs: 5,
            resolve_timeout_secs: 30,
            request_timeout_secs: 10,
            fallback_latitude: 39.9,
            fallback_longitude: 116.4,
            fallback_name: "北京市 (默认)".to_string(),
        }
    }
}

impl AppConfig {
    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !is_hex_color(&self.clock.color) {
            result.add_error(
                "clock.color",
                format!("Expected #rgb or #rrggbb, got: {}", self.clock.color),
            );
        }

        if !(0.0..=1.0).contains(&self.clock.opacity) {
            result.add_error("clock.opacity", "Opacity must be between 0 and 1");
        } else if self.clock.opacity < 0.05 {
            result.add_warning("clock.opacity", "Clock is almost invisible (<0.05)");
        }

        if !(100..=900).contains(&self.clock.font_weight) {
            result.add_error("clock.font_weight", "Font weight must be between 100 and 900");
        }

        if !self.home_assistant.url.is_empty() {
            validate_url(&self.home_assistant.url, "home_assistant.url", &mut result);
            if self.home_assistant.token.is_empty() {
                result.add_warning(
                    "home_assistant.token",
                    "Home Assistant URL set without an access token",
                );
            }
        }

        let timeouts = [
            ("weather.geolocation_timeout_secs", self.weather.geolocation_timeout_secs),
            ("weather.resolve_timeout_secs", self.weather.resolve_timeout_secs),
            ("weather.request_timeout_secs", self.weather.request_timeout_secs),
        ];
        for (field, secs) in timeouts {
            if secs == 0 {
                result.add_error(field, "Timeout must be greater than 0");
            }
        }

        if self.weather.resolve_timeout_secs
            < self.weather.geolocation_timeout_secs + self.weather.request_timeout_secs
        {
            result.add_warning(
                "weather.resolve_timeout_secs",
                "Resolve timeout is shorter than geolocation plus one request",
            );
        }

        if !(-90.0..=90.0).contains(&self.weather.fallback_latitude) {
            result.add_error("weather.fallback_latitude", "Latitude must be within ±90");
        }
        if !(-180.0..=180.0).contains(&self.weather.fallback_longitude) {
            result.add_error("weather.fallback_longitude", "Longitude must be within ±180");
        }

        result
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }
            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
