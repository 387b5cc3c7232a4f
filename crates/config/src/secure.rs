//! Secure secret backend.
//!
//! Responsibilities:
//! - Define the [`SecretStore`] contract used for live-mode credential
//!   material.
//! - Provide the OS keyring implementation and an in-memory fallback for
//!   tests and environments without a keyring.
//!
//! Does NOT handle:
//! - Deciding which fields are secret-grade (see `profile`).
//! - Plaintext config persistence (see `store`).
//!
//! Invariants:
//! - Entries are keyed by `(account, field)`; the keyring account name is
//!   `"<account>.<field>"` under the [`KEYRING_SERVICE`] service.
//! - A missing entry is `Ok(None)`, never an error.
//! - Secret values cross this boundary only as `SecretString`.

use std::collections::BTreeMap;
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};

use crate::constants::KEYRING_SERVICE;
use crate::error::SecureStoreError;

/// Storage for recoverable secret values, keyed by account and field.
pub trait SecretStore {
    /// Stores one opaque value under `(account, field)`, labeled with a
    /// human-readable description.
    fn store(
        &self,
        account: &str,
        field: &str,
        value: &SecretString,
        label: &str,
    ) -> Result<(), SecureStoreError>;

    /// Retrieves the value stored under `(account, field)`, if any.
    fn retrieve(&self, account: &str, field: &str)
    -> Result<Option<SecretString>, SecureStoreError>;
}

/// [`SecretStore`] backed by the operating system keyring.
#[derive(Debug, Default)]
pub struct KeyringSecretStore;

impl KeyringSecretStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(account: &str, field: &str) -> Result<keyring::Entry, SecureStoreError> {
        let keyring_account = format!("{}.{}", account, field);
        Ok(keyring::Entry::new(KEYRING_SERVICE, &keyring_account)?)
    }
}

impl SecretStore for KeyringSecretStore {
    fn store(
        &self,
        account: &str,
        field: &str,
        value: &SecretString,
        label: &str,
    ) -> Result<(), SecureStoreError> {
        let entry = Self::entry(account, field)?;
        entry.set_password(value.expose_secret())?;

        // The keyring API carries no label; record it for debugging.
        tracing::debug!(account, field, label, "stored secret in keyring");
        Ok(())
    }

    fn retrieve(
        &self,
        account: &str,
        field: &str,
    ) -> Result<Option<SecretString>, SecureStoreError> {
        let entry = Self::entry(account, field)?;
        match entry.get_password() {
            Ok(password) => Ok(Some(SecretString::new(password.into()))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory [`SecretStore`] for tests and keyring-less environments.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when no secret has been stored.
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // Recover from a poisoned lock; the map itself stays consistent.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn key(account: &str, field: &str) -> String {
        format!("{}.{}", account, field)
    }
}

impl SecretStore for MemorySecretStore {
    fn store(
        &self,
        account: &str,
        field: &str,
        value: &SecretString,
        _label: &str,
    ) -> Result<(), SecureStoreError> {
        self.lock_entries()
            .insert(Self::key(account, field), value.expose_secret().to_string());
        Ok(())
    }

    fn retrieve(
        &self,
        account: &str,
        field: &str,
    ) -> Result<Option<SecretString>, SecureStoreError> {
        Ok(self
            .lock_entries()
            .get(&Self::key(account, field))
            .map(|v| SecretString::new(v.clone().into())))
    }
}
