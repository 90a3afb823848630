//! WMO weather code → display icon and short text.

use serde::{Deserialize, Serialize};

/// Code used for "no data yet" and for the error display.
pub const UNKNOWN_WEATHER_CODE: i32 = -1;

/// Pure mapping from `(weather_code, is_day)` to what the widget shows.
pub type WeatherCodeMapper = fn(i32, bool) -> WeatherDisplay;

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
    #[default]
    Unknown,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::Sleet, // Freezing drizzle
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            66 | 67 => Self::Sleet, // Freezing rain
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }
}

/// Icon identifiers understood by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    Sun,
    Moon,
    CloudSun,
    CloudMoon,
    Cloud,
    CloudFog,
    CloudDrizzle,
    CloudRain,
    CloudRainHeavy,
    CloudSleet,
    CloudSnow,
    CloudLightning,
    #[default]
    Unknown,
}

impl WeatherIcon {
    pub fn for_condition(condition: WeatherCondition, is_day: bool) -> Self {
        match condition {
            WeatherCondition::Clear if is_day => Self::Sun,
            WeatherCondition::Clear => Self::Moon,
            WeatherCondition::PartlyCloudy if is_day => Self::CloudSun,
            WeatherCondition::PartlyCloudy => Self::CloudMoon,
            WeatherCondition::Cloudy => Self::Cloud,
            WeatherCondition::Fog => Self::CloudFog,
            WeatherCondition::Drizzle => Self::CloudDrizzle,
            WeatherCondition::Rain => Self::CloudRain,
            WeatherCondition::HeavyRain => Self::CloudRainHeavy,
            WeatherCondition::Sleet => Self::CloudSleet,
            WeatherCondition::Snow => Self::CloudSnow,
            WeatherCondition::Thunderstorm => Self::CloudLightning,
            WeatherCondition::Unknown => Self::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Moon => "moon",
            Self::CloudSun => "cloud_sun",
            Self::CloudMoon => "cloud_moon",
            Self::Cloud => "cloud",
            Self::CloudFog => "cloud_fog",
            Self::CloudDrizzle => "cloud_drizzle",
            Self::CloudRain => "cloud_rain",
            Self::CloudRainHeavy => "cloud_rain_heavy",
            Self::CloudSleet => "cloud_sleet",
            Self::CloudSnow => "cloud_snow",
            Self::CloudLightning => "cloud_lightning",
            Self::Unknown => "question",
        }
    }
}

/// Icon and short text shown next to the temperature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherDisplay {
    pub icon: WeatherIcon,
    pub text: String,
}

impl WeatherDisplay {
    pub fn new(icon: WeatherIcon, text: impl Into<String>) -> Self {
        Self {
            icon,
            text: text.into(),
        }
    }
}

/// Short Chinese description for a WMO code.
fn wmo_text(code: i32) -> &'static str {
    match code {
        0 => "晴",
        1 => "少云",
        2 => "多云",
        3 => "阴",
        45 => "雾",
        48 => "雾凇",
        51 | 53 | 55 => "毛毛雨",
        56 | 57 => "冻毛毛雨",
        61 => "小雨",
        63 => "中雨",
        65 => "大雨",
        66 | 67 => "冻雨",
        71 => "小雪",
        73 => "中雪",
        75 => "大雪",
        77 => "雪粒",
        80 => "小阵雨",
        81 => "中阵雨",
        82 => "强阵雨",
        85 => "小阵雪",
        86 => "大阵雪",
        95 => "雷阵雨",
        96 | 99 => "雷阵雨伴冰雹",
        _ => "未知",
    }
}

/// Default [`WeatherCodeMapper`].
pub fn map_wmo_code(code: i32, is_day: bool) -> WeatherDisplay {
    let condition = WeatherCondition::from_wmo_code(code);
    WeatherDisplay::new(WeatherIcon::for_condition(condition, is_day), wmo_text(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmo_code_clear() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::Clear);
    }

    #[test]
    fn test_wmo_code_partly_cloudy() {
        assert_eq!(WeatherCondition::from_wmo_code(1), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_wmo_code(2), WeatherCondition::PartlyCloudy);
    }

    #[test]
    fn test_wmo_code_precipitation() {
        assert_eq!(WeatherCondition::from_wmo_code(53), WeatherCondition::Drizzle);
        assert_eq!(WeatherCondition::from_wmo_code(63), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_wmo_code(82), WeatherCondition::HeavyRain);
        assert_eq!(WeatherCondition::from_wmo_code(67), WeatherCondition::Sleet);
        assert_eq!(WeatherCondition::from_wmo_code(86), WeatherCondition::Snow);
        assert_eq!(WeatherCondition::from_wmo_code(99), WeatherCondition::Thunderstorm);
    }

    #[test]
    fn test_wmo_code_unknown() {
        assert_eq!(WeatherCondition::from_wmo_code(999), WeatherCondition::Unknown);
        assert_eq!(
            WeatherCondition::from_wmo_code(UNKNOWN_WEATHER_CODE),
            WeatherCondition::Unknown
        );
    }

    #[test]
    fn test_day_night_icons() {
        assert_eq!(map_wmo_code(0, true).icon, WeatherIcon::Sun);
        assert_eq!(map_wmo_code(0, false).icon, WeatherIcon::Moon);
        assert_eq!(map_wmo_code(2, false).icon, WeatherIcon::CloudMoon);
        // Overcast looks the same at night
        assert_eq!(map_wmo_code(3, true), map_wmo_code(3, false));
    }

    #[test]
    fn test_display_text() {
        assert_eq!(map_wmo_code(0, true).text, "晴");
        assert_eq!(map_wmo_code(65, true).text, "大雨");
        assert_eq!(map_wmo_code(95, false).text, "雷阵雨");
    }

    #[test]
    fn test_unknown_display_is_always_present() {
        let display = map_wmo_code(UNKNOWN_WEATHER_CODE, true);
        assert_eq!(display.icon, WeatherIcon::Unknown);
        assert_eq!(display.text, "未知");
        assert_eq!(display.icon.name(), "question");
    }
}
