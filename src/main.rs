use std::time::Duration;

use anyhow::Result;
use deskglance_clock::{ClockTicker, HourFormat, SexagenaryConverter};
use deskglance_core::{AppError, ConfigStore, FileStorage, WeatherConfig};
use deskglance_weather::{
    BigDataCloudClient, LocationWeatherResolver, OpenMeteoClient, ResolvedLocation,
    ResolverOptions, WeatherState,
};

fn resolver_options(config: &WeatherConfig) -> ResolverOptions {
    ResolverOptions {
        geolocation_timeout: Duration::from_secs(config.geolocation_timeout_secs),
        resolve_timeout: Duration::from_secs(config.resolve_timeout_secs),
        fallback: ResolvedLocation {
            latitude: config.fallback_latitude,
            longitude: config.fallback_longitude,
            display_name: config.fallback_name.clone(),
            is_real_location: false,
        },
    }
}

fn log_weather(state: &WeatherState) {
    let temperature = state
        .snapshot
        .as_ref()
        .and_then(|s| s.forecast.current.temperature_2m)
        .map(|t| format!("{:.1}°C", t))
        .unwrap_or_else(|| "--".to_string());
    tracing::info!(
        "Weather: {} {} [{}] at {}",
        state.display.text,
        temperature,
        state.display.icon.name(),
        state.location_text
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    deskglance_core::init()?;

    let storage = FileStorage::default_location()?;
    tracing::info!("Config directory: {}", storage.dir().display());

    let store = ConfigStore::open(storage).map_err(|e| {
        let e = AppError::from(e);
        tracing::error!("{}", e.user_message());
        e
    })?;

    let validation = store.config().validate();
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }
    if !validation.is_valid() {
        tracing::warn!("Invalid configuration: {}", validation.error_summary());
    }

    let clock = ClockTicker::new(SexagenaryConverter, HourFormat::Watched(store.watch_24_hour()));
    let mut clock_rx = clock.subscribe();
    clock.start();

    // No platform geolocator on the desktop; resolution starts at IP lookup.
    let weather_config = store.weather();
    let request_timeout = Duration::from_secs(weather_config.request_timeout_secs);
    let resolver = LocationWeatherResolver::new(
        OpenMeteoClient::with_timeout(request_timeout)?,
        BigDataCloudClient::with_timeout(request_timeout)?,
        resolver_options(&weather_config),
    );

    resolver.resolve().await;
    log_weather(&resolver.state());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last_minute = None;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                break;
            }
            changed = clock_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = clock_rx.borrow_and_update().clone();
                let minute = (state.now.date(), state.digits.h1, state.digits.h2, state.digits.m1, state.digits.m2);
                if last_minute != Some(minute) {
                    last_minute = Some(minute);
                    tracing::info!("{} {}", state.digits, state.lunar);
                }
            }
        }
    }

    clock.stop();
    Ok(())
}
