//! Error types for the profile credential store.
//!
//! Responsibilities:
//! - Define error variants for config-store, secret-store, and profile
//!   operations.
//! - Provide conversion from lower-level errors (io, parse, keyring).
//!
//! Invariants:
//! - Every variant carries enough context to debug (paths, field keys).
//! - Error messages never include credential material.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the plaintext key-value config backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unable to determine config directory: {0}")]
    ConfigDirUnavailable(String),

    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Failed to write config file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config key '{0}' not found")]
    KeyNotFound(String),
}

/// Errors from the secure secret backend.
#[derive(Debug, Error)]
pub enum SecureStoreError {
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Errors surfaced by profile read and write operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// No device name found in the environment, in memory, or on disk.
    #[error("device name is not configured, please run `stripe login` first")]
    DeviceNameNotConfigured,

    /// No account id found in memory or on disk.
    #[error("account id is not configured, please run `stripe login` first")]
    AccountIdNotConfigured,

    /// No API key found anywhere in the precedence chain.
    #[error("you have not configured API keys yet, please run `stripe login`")]
    ApiKeyNotConfigured,

    /// A key was found but its format is structurally invalid.
    #[error("the configured API key is invalid: {message}")]
    InvalidApiKey { message: String },

    /// A persisted color value outside `{auto, on, off}`.
    #[error("color value not supported: {0}")]
    UnsupportedColor(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Secure(#[from] SecureStoreError),
}
