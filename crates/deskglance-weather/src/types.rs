use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::condition::WeatherDisplay;

/// Placeholder shown until a location name is known.
pub const LOCATING_TEXT: &str = "定位中...";
/// Weather text before the first refresh.
pub const TAP_TO_REFRESH_TEXT: &str = "点击刷新";
/// Weather text after a failed fetch.
pub const API_ERROR_TEXT: &str = "接口错误";
/// Weather text when a whole resolution ran past its bound.
pub const TIMED_OUT_TEXT: &str = "更新超时";
/// Place name when the geocoder knows the coordinates but no locality.
pub const UNKNOWN_CITY_TEXT: &str = "未知城市";

/// A location the weather was (or will be) fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    /// From geolocation or IP lookup, as opposed to the configured fallback.
    pub is_real_location: bool,
}

/// `longitude, latitude` with two decimals, used when no place name exists.
pub fn coordinate_label(latitude: f64, longitude: f64) -> String {
    format!("{:.2}, {:.2}", longitude, latitude)
}

/// `current=` block of an Open-Meteo forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    #[serde(default)]
    pub apparent_temperature: Option<f64>,
    #[serde(default)]
    pub relative_humidity_2m: Option<f64>,
    #[serde(default)]
    pub wind_speed_10m: Option<f64>,
    #[serde(default)]
    pub precipitation: Option<f64>,
    #[serde(default)]
    pub rain: Option<f64>,
    #[serde(default)]
    pub showers: Option<f64>,
    /// 1 during daylight, 0 at night
    pub is_day: u8,
    pub weather_code: i32,
}

impl CurrentConditions {
    pub fn is_daytime(&self) -> bool {
        self.is_day == 1
    }
}

/// `hourly=` block; every array is indexed by hour of the local day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyConditions {
    pub time: Vec<String>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub uv_index: Vec<Option<f64>>,
    pub temperature_2m: Vec<Option<f64>>,
}

/// Forecast response as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub current_units: HashMap<String, String>,
    pub current: CurrentConditions,
    #[serde(default)]
    pub hourly_units: HashMap<String, String>,
    #[serde(default)]
    pub hourly: HourlyConditions,
}

/// One hour of the same-day detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: String,
    pub temperature: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub uv_index: Option<f64>,
}

/// Provider response plus the local hour it was fetched at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(flatten)]
    pub forecast: ForecastResponse,
    /// Local hour at fetch time, 0–23
    pub current_hour_index: u32,
}

impl WeatherSnapshot {
    /// Hourly entry for the fetch hour, if the provider returned one.
    pub fn current_hour(&self) -> Option<HourlyPoint> {
        let i = self.current_hour_index as usize;
        let hourly = &self.forecast.hourly;
        let time = hourly.time.get(i)?.clone();
        Some(HourlyPoint {
            time,
            temperature: hourly.temperature_2m.get(i).copied().flatten(),
            precipitation_probability: hourly.precipitation_probability.get(i).copied().flatten(),
            uv_index: hourly.uv_index.get(i).copied().flatten(),
        })
    }
}

/// Everything the weather panel observes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherState {
    pub loading: bool,
    pub location_text: String,
    pub display: WeatherDisplay,
    pub snapshot: Option<WeatherSnapshot>,
}

impl WeatherState {
    pub fn initial(display: WeatherDisplay) -> Self {
        Self {
            loading: true,
            location_text: LOCATING_TEXT.to_string(),
            display,
            snapshot: None,
        }
    }

    /// Whether the location text still shows the locating placeholder.
    pub fn is_locating(&self) -> bool {
        self.location_text.contains(LOCATING_TEXT.trim_end_matches('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{WeatherDisplay, WeatherIcon};

    fn forecast_json() -> serde_json::Value {
        serde_json::json!({
            "latitude": 39.875,
            "longitude": 116.375,
            "timezone": "Asia/Shanghai",
            "current": {
                "time": "2026-10-18T14:00",
                "temperature_2m": 18.4,
                "rain": 0.0,
                "wind_speed_10m": 7.2,
                "is_day": 1,
                "apparent_temperature": 16.9,
                "showers": 0.0,
                "relative_humidity_2m": 41,
                "precipitation": 0.0,
                "weather_code": 2
            },
            "hourly": {
                "time": ["2026-10-18T00:00", "2026-10-18T01:00", "2026-10-18T02:00"],
                "precipitation_probability": [0, 5, null],
                "uv_index": [0.0, 0.0, 0.1],
                "temperature_2m": [11.2, 10.8, 10.5]
            }
        })
    }

    #[test]
    fn test_parse_forecast() {
        let forecast: ForecastResponse = serde_json::from_value(forecast_json()).unwrap();
        assert_eq!(forecast.current.weather_code, 2);
        assert!(forecast.current.is_daytime());
        assert_eq!(forecast.current.relative_humidity_2m, Some(41.0));
        assert_eq!(forecast.hourly.time.len(), 3);
    }

    #[test]
    fn test_missing_weather_code_is_rejected() {
        let mut json = forecast_json();
        json["current"].as_object_mut().unwrap().remove("weather_code");
        assert!(serde_json::from_value::<ForecastResponse>(json).is_err());
    }

    #[test]
    fn test_current_hour_lookup() {
        let forecast: ForecastResponse = serde_json::from_value(forecast_json()).unwrap();
        let snapshot = WeatherSnapshot {
            forecast,
            current_hour_index: 2,
        };
        let hour = snapshot.current_hour().unwrap();
        assert_eq!(hour.time, "2026-10-18T02:00");
        assert_eq!(hour.temperature, Some(10.5));
        assert_eq!(hour.precipitation_probability, None);

        let late = WeatherSnapshot {
            current_hour_index: 23,
            ..snapshot
        };
        assert!(late.current_hour().is_none());
    }

    #[test]
    fn test_coordinate_label_is_lon_first() {
        assert_eq!(coordinate_label(39.9042, 116.4074), "116.41, 39.90");
        assert_eq!(coordinate_label(-33.8688, 151.2093), "151.21, -33.87");
    }

    #[test]
    fn test_initial_state() {
        let state = WeatherState::initial(WeatherDisplay::new(WeatherIcon::Unknown, TAP_TO_REFRESH_TEXT));
        assert!(state.loading);
        assert!(state.is_locating());
        assert!(state.snapshot.is_none());
    }
}
