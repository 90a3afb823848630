//! Location and weather acquisition for DeskGlance
//!
//! Resolves where the viewer is (device geolocation, IP lookup, or a
//! configured fallback city), fetches current conditions from Open-Meteo,
//! and publishes the result as observable [`WeatherState`].

pub mod cache;
pub mod condition;
pub mod error;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod resolver;
pub mod types;

pub use cache::LocationCache;
pub use condition::{
    map_wmo_code, WeatherCodeMapper, WeatherCondition, WeatherDisplay, WeatherIcon,
    UNKNOWN_WEATHER_CODE,
};
pub use error::{AcquisitionError, FailureKind, LocationError, WeatherError};
pub use geocode::{BigDataCloudClient, GeocodeProvider, IpLocation};
pub use location::{current_position, Geolocator, Position, PositionOptions};
pub use provider::{OpenMeteoClient, WeatherProvider};
pub use resolver::{LocationWeatherResolver, ResolverOptions};
pub use types::*;
