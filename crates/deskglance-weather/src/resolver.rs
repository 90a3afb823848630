//! Location-and-weather acquisition pipeline.
//!
//! Sources are tried strictly in order, each awaited before the next:
//! cached real location, device geolocation (+ reverse geocoding), IP
//! lookup, then the configured fallback city. Every step failure turns into
//! the next fallback; the caller only ever observes [`WeatherState`].
//!
//! Overlapping `resolve()` calls are not sequenced: whichever finishes last
//! publishes last.

use std::time::Duration;

use chrono::{Local, Timelike};
use tokio::sync::watch;

use crate::cache::LocationCache;
use crate::condition::{map_wmo_code, WeatherCodeMapper, WeatherDisplay, UNKNOWN_WEATHER_CODE};
use crate::error::AcquisitionError;
use crate::geocode::GeocodeProvider;
use crate::location::{current_position, Geolocator, PositionOptions};
use crate::provider::WeatherProvider;
use crate::types::{
    coordinate_label, ResolvedLocation, WeatherSnapshot, WeatherState, API_ERROR_TEXT,
    TAP_TO_REFRESH_TEXT, TIMED_OUT_TEXT,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverOptions {
    /// Passed to the platform with each position request.
    pub geolocation_timeout: Duration,
    /// Bound on one uncached resolution, geolocation through weather fetch.
    pub resolve_timeout: Duration,
    /// Used when both geolocation and IP lookup fail; never cached.
    pub fallback: ResolvedLocation,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            geolocation_timeout: Duration::from_secs(5),
            resolve_timeout: Duration::from_secs(30),
            fallback: ResolvedLocation {
                latitude: 39.9,
                longitude: 116.4,
                display_name: "北京市 (默认)".to_string(),
                is_real_location: false,
            },
        }
    }
}

pub struct LocationWeatherResolver<W, G> {
    weather: W,
    geocoder: G,
    geolocator: Option<Box<dyn Geolocator>>,
    mapper: WeatherCodeMapper,
    options: ResolverOptions,
    cache: LocationCache,
    state: watch::Sender<WeatherState>,
}

fn initial_display(mapper: WeatherCodeMapper) -> WeatherDisplay {
    WeatherDisplay::new(mapper(UNKNOWN_WEATHER_CODE, true).icon, TAP_TO_REFRESH_TEXT)
}

impl<W, G> LocationWeatherResolver<W, G>
where
    W: WeatherProvider,
    G: GeocodeProvider,
{
    /// Resolver without a geolocation capability; add one with
    /// [`Self::with_geolocator`].
    pub fn new(weather: W, geocoder: G, mut options: ResolverOptions) -> Self {
        options.fallback.is_real_location = false;
        let mapper: WeatherCodeMapper = map_wmo_code;
        let (state, _) = watch::channel(WeatherState::initial(initial_display(mapper)));
        Self {
            weather,
            geocoder,
            geolocator: None,
            mapper,
            options,
            cache: LocationCache::new(),
            state,
        }
    }

    pub fn with_geolocator(mut self, geolocator: impl Geolocator + 'static) -> Self {
        self.geolocator = Some(Box::new(geolocator));
        self
    }

    pub fn with_mapper(mut self, mapper: WeatherCodeMapper) -> Self {
        self.mapper = mapper;
        self.state.send_modify(|state| {
            if state.snapshot.is_none() {
                state.display = initial_display(mapper);
            }
        });
        self
    }

    /// Observe every state change.
    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> WeatherState {
        self.state.borrow().clone()
    }

    pub fn cached_location(&self) -> Option<ResolvedLocation> {
        self.cache.get()
    }

    /// Drop the cached location so the next `resolve()` locates again.
    pub fn forget_location(&self) {
        self.cache.clear();
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve a location and refresh the weather state.
    ///
    /// Never fails: errors become fallbacks or status text.
    pub async fn resolve(&self) {
        self.state.send_modify(|state| state.loading = true);

        if let Some(cached) = self.cache.get() {
            tracing::debug!("Using cached location {}", cached.display_name);
            self.fetch_weather(cached.latitude, cached.longitude, Some(cached.display_name), true)
                .await;
            return;
        }

        let bound = self.options.resolve_timeout;
        if tokio::time::timeout(bound, self.locate_and_fetch()).await.is_err() {
            tracing::error!("Location and weather resolution exceeded {:?}", bound);
            self.state.send_modify(|state| {
                state.display.text = TIMED_OUT_TEXT.to_string();
                state.loading = false;
            });
        }
    }

    async fn locate_and_fetch(&self) {
        match self.geolocator.as_deref() {
            Some(geolocator) => match self.locate_by_device(geolocator).await {
                Ok(location) => {
                    self.fetch_weather(
                        location.latitude,
                        location.longitude,
                        Some(location.display_name),
                        true,
                    )
                    .await;
                    return;
                }
                Err(e) => tracing::warn!("{}, falling back to IP lookup", e),
            },
            None => tracing::debug!("No geolocation capability, using IP lookup"),
        }

        self.locate_by_ip().await;
    }

    async fn locate_by_device(
        &self,
        geolocator: &dyn Geolocator,
    ) -> Result<ResolvedLocation, AcquisitionError> {
        let options = PositionOptions {
            timeout: self.options.geolocation_timeout,
            ..Default::default()
        };
        let position = current_position(geolocator, options)
            .await
            .map_err(AcquisitionError::from_geolocation)?;
        tracing::info!("Got location: {}, {}", position.latitude, position.longitude);

        let display_name = self.place_name(position.latitude, position.longitude).await;
        Ok(ResolvedLocation {
            latitude: position.latitude,
            longitude: position.longitude,
            display_name,
            is_real_location: true,
        })
    }

    /// Best effort: a geocoding failure yields the coordinate label.
    async fn place_name(&self, latitude: f64, longitude: f64) -> String {
        match self.geocoder.reverse_geocode(latitude, longitude).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("{}", AcquisitionError::ReverseGeocodeFailed(e));
                coordinate_label(latitude, longitude)
            }
        }
    }

    async fn locate_by_ip(&self) {
        let location = match self.geocoder.locate_by_ip().await {
            Ok(ip) => ResolvedLocation {
                latitude: ip.latitude,
                longitude: ip.longitude,
                display_name: ip.city,
                is_real_location: true,
            },
            Err(e) => {
                tracing::warn!(
                    "{}, using fallback {}",
                    AcquisitionError::IpLookupFailed(e),
                    self.options.fallback.display_name
                );
                self.options.fallback.clone()
            }
        };

        self.fetch_weather(
            location.latitude,
            location.longitude,
            Some(location.display_name),
            location.is_real_location,
        )
        .await;
    }

    /// Fetch and publish weather for a coordinate.
    ///
    /// A failed fetch shows the error display and leaves `loading` as it
    /// was; only a successful fetch or the outer timeout clears it.
    ///
    /// With a `display_name` the location text is replaced (and cached when
    /// `is_real_location`); without one, a coordinate label replaces the
    /// locating placeholder but never an existing name.
    pub async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
        display_name: Option<String>,
        is_real_location: bool,
    ) {
        let forecast = match self.weather.current_conditions(latitude, longitude).await {
            Ok(forecast) => forecast,
            Err(e) => {
                tracing::warn!("{}", AcquisitionError::WeatherFetchFailed(e));
                let icon = (self.mapper)(UNKNOWN_WEATHER_CODE, true).icon;
                self.state
                    .send_modify(|state| state.display = WeatherDisplay::new(icon, API_ERROR_TEXT));
                return;
            }
        };

        let weather_display =
            (self.mapper)(forecast.current.weather_code, forecast.current.is_daytime());
        let snapshot = WeatherSnapshot {
            forecast,
            current_hour_index: Local::now().hour(),
        };

        if let Some(name) = &display_name {
            if is_real_location {
                self.cache.store(ResolvedLocation {
                    latitude,
                    longitude,
                    display_name: name.clone(),
                    is_real_location,
                });
            }
        }

        tracing::info!(
            "Weather updated: {} ({})",
            weather_display.text,
            display_name.as_deref().unwrap_or("unnamed location")
        );

        self.state.send_modify(|state| {
            state.snapshot = Some(snapshot);
            state.display = weather_display;
            state.loading = false;
            match display_name {
                Some(name) => state.location_text = name,
                None if state.is_locating() => {
                    state.location_text = coordinate_label(latitude, longitude);
                }
                None => {}
            }
        });
    }
}
