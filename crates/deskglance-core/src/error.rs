//! Centralized error types for the DeskGlance application.
//!
//! This module provides a typed error hierarchy that:
//! - Separates configuration problems from storage failures
//! - Provides short messages suitable for the widget's status line
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Storage(e) => e.user_message(),
        }
    }
}

/// Key-value storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage IO failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No platform config directory")]
    Unavailable,

    #[error("Failed to serialize {0}")]
    Serialize(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Io { .. } => "Unable to access saved settings. Try restarting the app.",
            StorageError::Unavailable => "No settings directory available. Changes won't be saved.",
            StorageError::Serialize(_) => "Failed to save settings. Please try again.",
        }
    }
}
