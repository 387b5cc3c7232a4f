//! Profile credential store for the Stripe CLI.
//!
//! This crate manages per-profile developer credentials (API keys,
//! publishable keys, account metadata), split between a plaintext config
//! file and the OS secret store, with legacy field migration and
//! redaction for display.

pub mod constants;
mod env;
mod error;
mod profile;
mod secure;
mod store;
pub mod validators;

pub use env::env_var_or_none;
pub use error::{ProfileError, SecureStoreError, StoreError};
pub use profile::{
    ACCOUNT_ID_FIELD, API_KEY_FIELD, CleanupOutcome, DEVICE_NAME_FIELD, DISPLAY_NAME_FIELD,
    IS_TERMS_ACCEPTANCE_VALID_FIELD, KeyMode, LIVE_MODE_API_KEY_FIELD, LIVE_MODE_EXPIRES_AT_FIELD,
    LIVE_MODE_PUBLISHABLE_KEY_FIELD, PUBLISHABLE_KEY_FIELD, Profile, SECRET_KEY_FIELD,
    TERMINAL_POS_DEVICE_ID_FIELD, TEST_MODE_API_KEY_FIELD, TEST_MODE_EXPIRES_AT_FIELD,
    TEST_MODE_PUBLISHABLE_KEY_FIELD,
};
pub use secure::{KeyringSecretStore, MemorySecretStore, SecretStore};
pub use store::ConfigStore;
