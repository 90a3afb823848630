//! Integration tests for ConfigStore persistence and legacy migration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use deskglance_core::{
    AppConfig, ConfigError, ConfigStore, FileStorage, HomeAssistantConfig, MemoryStorage,
    MigrationOutcome, Storage, StorageError, CONFIG_KEY, LEGACY_HOME_ASSISTANT_KEY,
};
use tempfile::tempdir;

const LEGACY_JSON: &str = r#"{
    "url": "http://homeassistant.local:8123",
    "token": "long-lived-token",
    "entities": ["light.desk", "sensor.temperature"]
}"#;

/// Memory storage whose writes start failing once `fail_writes` is set.
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: AtomicBool,
}

impl Storage for FlakyStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

#[test]
fn test_first_run_persists_defaults() {
    let storage = Arc::new(MemoryStorage::new());
    let store = ConfigStore::open(storage.clone()).unwrap();

    assert_eq!(store.config(), AppConfig::default());
    assert!(storage.contains(CONFIG_KEY));
}

#[test]
fn test_legacy_key_becomes_home_assistant_section() {
    let storage = Arc::new(MemoryStorage::new().with_entry(LEGACY_HOME_ASSISTANT_KEY, LEGACY_JSON));
    let store = ConfigStore::open(storage.clone()).unwrap();

    let ha = store.home_assistant();
    assert_eq!(ha.url, "http://homeassistant.local:8123");
    assert_eq!(ha.token, "long-lived-token");
    assert_eq!(ha.entities, vec!["light.desk", "sensor.temperature"]);
    assert!(!storage.contains(LEGACY_HOME_ASSISTANT_KEY));

    // The migrated section is part of the persisted aggregate
    let persisted: AppConfig = toml::from_str(&storage.get(CONFIG_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted.home_assistant, ha);
}

#[test]
fn test_migration_twice_is_noop() {
    let storage = Arc::new(MemoryStorage::new().with_entry(LEGACY_HOME_ASSISTANT_KEY, LEGACY_JSON));
    let store = ConfigStore::open(storage.clone()).unwrap();

    let before = store.config();
    let persisted_before = storage.get(CONFIG_KEY).unwrap();

    assert_eq!(store.migrate_legacy().unwrap(), MigrationOutcome::NothingToMigrate);
    assert_eq!(store.config(), before);
    assert_eq!(storage.get(CONFIG_KEY).unwrap(), persisted_before);
}

#[test]
fn test_existing_aggregate_supersedes_legacy() {
    let storage = Arc::new(MemoryStorage::new());
    {
        let store = ConfigStore::open(storage.clone()).unwrap();
        store
            .update_home_assistant(|ha| ha.url = "https://ha.example.com".to_string())
            .unwrap();
    }
    storage.set(LEGACY_HOME_ASSISTANT_KEY, LEGACY_JSON).unwrap();

    let store = ConfigStore::open(storage.clone()).unwrap();
    assert_eq!(store.home_assistant().url, "https://ha.example.com");
    assert!(!storage.contains(LEGACY_HOME_ASSISTANT_KEY));
}

#[test]
fn test_malformed_legacy_is_discarded() {
    let storage = Arc::new(MemoryStorage::new().with_entry(LEGACY_HOME_ASSISTANT_KEY, "{not json"));
    let store = ConfigStore::open(storage.clone()).unwrap();

    assert_eq!(store.home_assistant(), HomeAssistantConfig::default());
    assert!(!storage.contains(LEGACY_HOME_ASSISTANT_KEY));
}

#[test]
fn test_malformed_aggregate_is_parse_error() {
    let storage = MemoryStorage::new().with_entry(CONFIG_KEY, "clock = [");
    let result = ConfigStore::open(storage);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_update_clock_persists_and_publishes() {
    let storage = Arc::new(MemoryStorage::new());
    let store = ConfigStore::open(storage.clone()).unwrap();
    let rx = store.watch_24_hour();
    assert!(*rx.borrow());

    store
        .update_clock(|clock| {
            clock.is_24_hour = false;
            clock.show_seconds = true;
        })
        .unwrap();

    assert!(!*rx.borrow());
    let persisted: AppConfig = toml::from_str(&storage.get(CONFIG_KEY).unwrap().unwrap()).unwrap();
    assert!(!persisted.clock.is_24_hour);
    assert!(persisted.clock.show_seconds);
}

#[test]
fn test_reset_restores_defaults() {
    let store = ConfigStore::open(MemoryStorage::new()).unwrap();
    store.update_clock(|clock| clock.is_24_hour = false).unwrap();
    let rx = store.watch_24_hour();

    store.reset().unwrap();
    assert_eq!(store.config(), AppConfig::default());
    assert!(*rx.borrow());
}

#[test]
fn test_file_storage_survives_reopen() {
    let dir = tempdir().unwrap();
    let legacy_path = dir.path().join(LEGACY_HOME_ASSISTANT_KEY);
    std::fs::write(&legacy_path, LEGACY_JSON).unwrap();

    {
        let store = ConfigStore::open(FileStorage::new(dir.path())).unwrap();
        store.update_clock(|clock| clock.color = "#ff8800".to_string()).unwrap();
    }
    assert!(!legacy_path.exists());

    let store = ConfigStore::open(FileStorage::new(dir.path())).unwrap();
    assert_eq!(store.clock().color, "#ff8800");
    assert_eq!(store.home_assistant().token, "long-lived-token");
}

#[test]
fn test_failed_write_leaves_config_unchanged() {
    let storage = Arc::new(FlakyStorage::default());
    let store = ConfigStore::open(storage.clone()).unwrap();
    let rx = store.watch_24_hour();
    let persisted_before = storage.get(CONFIG_KEY).unwrap();

    storage.fail_writes.store(true, Ordering::SeqCst);
    let result = store.update_clock(|clock| {
        clock.is_24_hour = false;
        clock.color = "#123456".to_string();
    });

    assert!(matches!(result, Err(ConfigError::Storage(StorageError::Io { .. }))));
    assert_eq!(store.config(), AppConfig::default());
    assert!(*rx.borrow());
    assert_eq!(storage.get(CONFIG_KEY).unwrap(), persisted_before);

    assert!(store.reset().is_err());
    storage.fail_writes.store(false, Ordering::SeqCst);
    store.update_clock(|clock| clock.is_24_hour = false).unwrap();
    assert!(!*rx.borrow());
}

#[test]
fn test_invalid_update_is_rejected() {
    let storage = Arc::new(MemoryStorage::new());
    let store = ConfigStore::open(storage.clone()).unwrap();
    let persisted_before = storage.get(CONFIG_KEY).unwrap();

    let result = store.update_clock(|clock| {
        clock.opacity = 2.0;
        clock.is_24_hour = false;
    });
    match result {
        Err(ConfigError::Invalid(summary)) => assert!(summary.contains("clock.opacity")),
        other => panic!("expected Invalid, got {:?}", other),
    }
    assert_eq!(store.clock(), AppConfig::default().clock);
    assert!(*store.watch_24_hour().borrow());

    let result = store.update_weather(|weather| weather.fallback_latitude = 120.0);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
    let result = store.update_home_assistant(|ha| ha.url = "ftp://ha.local".to_string());
    assert!(matches!(result, Err(ConfigError::Invalid(_))));

    assert_eq!(store.config(), AppConfig::default());
    assert_eq!(storage.get(CONFIG_KEY).unwrap(), persisted_before);
}
