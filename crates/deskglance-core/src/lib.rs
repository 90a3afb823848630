pub mod config;
pub mod error;
pub mod storage;
pub mod store;

pub use config::{
    AppConfig, ClockConfig, HomeAssistantConfig, ValidationResult, WeatherConfig,
};
pub use error::{AppError, ConfigError, StorageError};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{ConfigStore, MigrationOutcome, CONFIG_KEY, LEGACY_HOME_ASSISTANT_KEY};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("DeskGlance core initialized");
    Ok(())
}
