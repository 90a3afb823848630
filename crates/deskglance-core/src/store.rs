//! Durable configuration store with one-time legacy migration.
//!
//! The whole [`AppConfig`] aggregate is written back after every mutation.
//! Older releases kept the Home Assistant settings under their own
//! `ha_config` key; [`ConfigStore::migrate_legacy`] folds that key into the
//! aggregate and deletes it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::{AppConfig, ClockConfig, HomeAssistantConfig, WeatherConfig};
use crate::error::{ConfigError, StorageError};
use crate::storage::Storage;

/// Storage key of the TOML aggregate.
pub const CONFIG_KEY: &str = "config.toml";

/// Storage key used by releases before the aggregate existed (JSON).
pub const LEGACY_HOME_ASSISTANT_KEY: &str = "ha_config";

/// What [`ConfigStore::migrate_legacy`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// No legacy key present.
    NothingToMigrate,
    /// Legacy value became the Home Assistant section.
    Migrated,
    /// An aggregate was already persisted; its section was kept.
    Superseded,
    /// Legacy value could not be parsed and was dropped.
    Discarded,
}

struct State {
    config: AppConfig,
    persisted: bool,
}

pub struct ConfigStore {
    storage: Box<dyn Storage>,
    state: Mutex<State>,
    is_24_hour: watch::Sender<bool>,
}

impl ConfigStore {
    /// Load the aggregate (or defaults), migrate any legacy key, and make
    /// sure an aggregate exists in storage afterwards.
    pub fn open(storage: impl Storage + 'static) -> Result<Self, ConfigError> {
        let (config, persisted) = match storage.get(CONFIG_KEY)? {
            Some(contents) => {
                let config: AppConfig = toml::from_str(&contents)
                    .map_err(|e| ConfigError::ParseError(e.to_string()))?;
                (config, true)
            }
            None => {
                tracing::info!("No saved configuration, starting from defaults");
                (AppConfig::default(), false)
            }
        };

        let (is_24_hour, _) = watch::channel(config.clock.is_24_hour);
        let store = Self {
            storage: Box::new(storage),
            state: Mutex::new(State { config, persisted }),
            is_24_hour,
        };

        store.migrate_legacy()?;
        if !store.state.lock().persisted {
            store.persist()?;
        }

        Ok(store)
    }

    /// Fold the legacy Home Assistant key into the aggregate.
    ///
    /// The aggregate is persisted before the legacy key is removed, so an
    /// interrupted migration is simply repeated on the next start. Running
    /// this with no legacy key present changes nothing.
    pub fn migrate_legacy(&self) -> Result<MigrationOutcome, ConfigError> {
        let Some(raw) = self.storage.get(LEGACY_HOME_ASSISTANT_KEY)? else {
            return Ok(MigrationOutcome::NothingToMigrate);
        };

        let outcome = match serde_json::from_str::<HomeAssistantConfig>(&raw) {
            Ok(legacy) => {
                let mut state = self.state.lock();
                if state.persisted {
                    MigrationOutcome::Superseded
                } else {
                    state.config.home_assistant = legacy;
                    MigrationOutcome::Migrated
                }
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable legacy Home Assistant config: {}", e);
                MigrationOutcome::Discarded
            }
        };

        self.persist()?;
        self.storage.remove(LEGACY_HOME_ASSISTANT_KEY)?;

        tracing::info!(?outcome, "Legacy key {} removed", LEGACY_HOME_ASSISTANT_KEY);
        Ok(outcome)
    }

    /// Snapshot of the whole aggregate.
    pub fn config(&self) -> AppConfig {
        self.state.lock().config.clone()
    }

    pub fn clock(&self) -> ClockConfig {
        self.state.lock().config.clock.clone()
    }

    pub fn home_assistant(&self) -> HomeAssistantConfig {
        self.state.lock().config.home_assistant.clone()
    }

    pub fn weather(&self) -> WeatherConfig {
        self.state.lock().config.weather.clone()
    }

    /// Reactive view of the 24-hour flag; updated by [`Self::update_clock`].
    pub fn watch_24_hour(&self) -> watch::Receiver<bool> {
        self.is_24_hour.subscribe()
    }

    /// Apply `f` to the clock section. The change is validated and
    /// persisted before it becomes visible; on error nothing changes.
    pub fn update_clock(&self, f: impl FnOnce(&mut ClockConfig)) -> Result<(), ConfigError> {
        let committed = self.commit("clock", |config| f(&mut config.clock))?;
        let is_24_hour = committed.clock.is_24_hour;
        self.is_24_hour.send_if_modified(|current| {
            if *current == is_24_hour {
                return false;
            }
            *current = is_24_hour;
            true
        });
        Ok(())
    }

    pub fn update_home_assistant(
        &self,
        f: impl FnOnce(&mut HomeAssistantConfig),
    ) -> Result<(), ConfigError> {
        self.commit("home_assistant", |config| f(&mut config.home_assistant))
            .map(|_| ())
    }

    pub fn update_weather(&self, f: impl FnOnce(&mut WeatherConfig)) -> Result<(), ConfigError> {
        self.commit("weather", |config| f(&mut config.weather)).map(|_| ())
    }

    /// Restore every section to its default and persist.
    pub fn reset(&self) -> Result<(), ConfigError> {
        let defaults = AppConfig::default();
        {
            let mut state = self.state.lock();
            self.write(&defaults)?;
            state.config = defaults;
            state.persisted = true;
        }
        self.is_24_hour.send_replace(ClockConfig::default().is_24_hour);
        Ok(())
    }

    /// Edit a copy of the aggregate, reject it if `section` fails
    /// validation, write it, and only then replace the in-memory config.
    /// The state lock is held throughout so concurrent updates serialize.
    fn commit(
        &self,
        section: &str,
        apply: impl FnOnce(&mut AppConfig),
    ) -> Result<AppConfig, ConfigError> {
        let mut state = self.state.lock();
        let mut candidate = state.config.clone();
        apply(&mut candidate);

        let prefix = format!("{}.", section);
        let errors: Vec<String> = candidate
            .validate()
            .errors
            .iter()
            .filter(|e| e.field.starts_with(&prefix))
            .map(|e| e.to_string())
            .collect();
        if !errors.is_empty() {
            tracing::warn!("Rejected {} update: {}", section, errors.join("; "));
            return Err(ConfigError::Invalid(errors.join("; ")));
        }

        self.write(&candidate)?;
        state.config = candidate.clone();
        state.persisted = true;
        Ok(candidate)
    }

    fn persist(&self) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        self.write(&state.config)?;
        state.persisted = true;
        Ok(())
    }

    fn write(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.storage.set(CONFIG_KEY, &contents)?;
        tracing::debug!("Configuration persisted");
        Ok(())
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ConfigStore")
            .field("clock", &state.config.clock)
            .field("home_assistant_configured", &state.config.home_assistant.is_configured())
            .field("persisted", &state.persisted)
            .finish()
    }
}
