//! Named configuration profiles and their credential fields.
//!
//! Responsibilities:
//! - Namespace every persisted field under its owning profile.
//! - Resolve effective credential values (environment > in-memory >
//!   persisted) and validate them on the way out.
//! - Commit in-memory fields to the plaintext and secure backends,
//!   redacting live-mode material and cleaning up superseded legacy
//!   fields.
//!
//! Does NOT handle:
//! - File parsing/serialization (see `store`).
//! - OS keyring mechanics (see `secure`).
//!
//! Invariants:
//! - The plaintext backend never holds a recoverable live-mode secret;
//!   the secure backend always holds the raw value once a live-mode key
//!   is written.
//! - A live-mode key and its expiry are written in the same pass, never
//!   independently.
//! - Legacy-field cleanup is best-effort and never fails a write.

use secrecy::{ExposeSecret, SecretString};

use crate::constants::{
    API_KEY_ENV, COLOR_AUTO, COLOR_KEY, COLOR_OFF, COLOR_ON, DEVICE_NAME_ENV, EXPIRES_AT_FORMAT,
    KEY_VALID_IN_DAYS,
};
use crate::env::env_var_or_none;
use crate::error::ProfileError;
use crate::secure::SecretStore;
use crate::store::ConfigStore;
use crate::validators::{redact_api_key, validate_api_key};

// Persisted field names. Kept stable for compatibility with existing
// config files.
pub const ACCOUNT_ID_FIELD: &str = "account_id";
pub const DEVICE_NAME_FIELD: &str = "device_name";
pub const DISPLAY_NAME_FIELD: &str = "display_name";
pub const IS_TERMS_ACCEPTANCE_VALID_FIELD: &str = "is_terms_acceptance_valid";
pub const TEST_MODE_API_KEY_FIELD: &str = "test_mode_api_key";
pub const TEST_MODE_PUBLISHABLE_KEY_FIELD: &str = "test_mode_publishable_key";
pub const TEST_MODE_EXPIRES_AT_FIELD: &str = "test_mode_key_expires_at";
pub const LIVE_MODE_API_KEY_FIELD: &str = "live_mode_api_key";
pub const LIVE_MODE_PUBLISHABLE_KEY_FIELD: &str = "live_mode_publishable_key";
pub const LIVE_MODE_EXPIRES_AT_FIELD: &str = "live_mode_key_expires_at";
pub const TERMINAL_POS_DEVICE_ID_FIELD: &str = "terminal_pos_device_id";

// Legacy field names superseded by the test-mode fields above.
pub const SECRET_KEY_FIELD: &str = "secret_key";
pub const API_KEY_FIELD: &str = "api_key";
pub const PUBLISHABLE_KEY_FIELD: &str = "publishable_key";

/// Which credential set an operation targets.
///
/// Live-mode material is secret-grade: raw values live only in the secure
/// backend, with a redacted copy in the plaintext config. Test-mode
/// material is stored in the plaintext config directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    Test,
    Live,
}

impl KeyMode {
    /// The persisted field name for this mode's API key.
    pub fn api_key_field(self) -> &'static str {
        match self {
            Self::Test => TEST_MODE_API_KEY_FIELD,
            Self::Live => LIVE_MODE_API_KEY_FIELD,
        }
    }

    /// The persisted field name for this mode's key expiry.
    pub fn expires_at_field(self) -> &'static str {
        match self {
            Self::Test => TEST_MODE_EXPIRES_AT_FIELD,
            Self::Live => LIVE_MODE_EXPIRES_AT_FIELD,
        }
    }
}

/// Outcome of a best-effort legacy field removal.
///
/// Informational only: a `Failed` cleanup must never abort the write that
/// triggered it.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    Removed,
    NotPresent,
    Failed,
}

/// One named bundle of configuration and credentials.
///
/// A `Profile` is constructed transiently per command invocation from
/// user input; only [`Profile::create_profile`] (and the single-field
/// write/delete helpers) mutate persisted state.
#[derive(Debug, Clone)]
pub struct Profile {
    pub profile_name: String,
    pub device_name: Option<String>,
    pub display_name: Option<String>,
    pub account_id: Option<String>,
    /// Mode-agnostic key supplied directly (e.g. via `--api-key`).
    pub api_key: Option<SecretString>,
    pub live_mode_api_key: Option<SecretString>,
    pub live_mode_publishable_key: Option<SecretString>,
    pub test_mode_api_key: Option<SecretString>,
    pub test_mode_publishable_key: Option<SecretString>,
}

impl Profile {
    /// Creates an empty in-memory profile named `profile_name`.
    pub fn new(profile_name: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.into(),
            device_name: None,
            display_name: None,
            account_id: None,
            api_key: None,
            live_mode_api_key: None,
            live_mode_publishable_key: None,
            test_mode_api_key: None,
            test_mode_publishable_key: None,
        }
    }

    /// Returns `field` namespaced under this profile
    /// (`"<profile_name>.<field>"`).
    pub fn config_field(&self, field: &str) -> String {
        format!("{}.{}", self.profile_name, field)
    }

    /// Registers `alias` so that reads of it resolve to `canonical`,
    /// both namespaced under this profile. Safe to call repeatedly.
    pub fn register_alias(&self, store: &mut ConfigStore, alias: &str, canonical: &str) {
        store.register_alias(&self.config_field(alias), &self.config_field(canonical));
    }

    // =========================================================================
    // Read path
    // =========================================================================

    /// Returns the configured device name.
    ///
    /// Precedence: `STRIPE_DEVICE_NAME` > in-memory > persisted.
    pub fn get_device_name(&self, store: &ConfigStore) -> Result<String, ProfileError> {
        if let Some(name) = env_var_or_none(DEVICE_NAME_ENV) {
            return Ok(name);
        }

        if let Some(name) = non_empty(self.device_name.as_deref()) {
            return Ok(name.to_string());
        }

        store
            .get(&self.config_field(DEVICE_NAME_FIELD))
            .and_then(non_empty_opt)
            .map(str::to_string)
            .ok_or(ProfileError::DeviceNameNotConfigured)
    }

    /// Returns the account id for this profile.
    ///
    /// Precedence: in-memory > persisted.
    pub fn get_account_id(&self, store: &ConfigStore) -> Result<String, ProfileError> {
        if let Some(id) = non_empty(self.account_id.as_deref()) {
            return Ok(id.to_string());
        }

        store
            .get(&self.config_field(ACCOUNT_ID_FIELD))
            .and_then(non_empty_opt)
            .map(str::to_string)
            .ok_or(ProfileError::AccountIdNotConfigured)
    }

    /// Returns the effective API key for `mode`.
    ///
    /// Precedence: `STRIPE_API_KEY` > in-memory > persisted (test mode)
    /// or secure backend (live mode). Test-mode reads self-heal old
    /// configs by aliasing the canonical field to whichever legacy field
    /// (`api_key`, then `secret_key`) still holds the value. Every
    /// candidate is format-validated before being returned.
    pub fn get_api_key(
        &self,
        store: &mut ConfigStore,
        secrets: &dyn SecretStore,
        mode: KeyMode,
    ) -> Result<SecretString, ProfileError> {
        if let Some(key) = env_var_or_none(API_KEY_ENV) {
            validate_api_key(&key)?;
            return Ok(SecretString::new(key.into()));
        }

        if let Some(key) = &self.api_key {
            validate_api_key(key.expose_secret())?;
            return Ok(key.clone());
        }

        match mode {
            KeyMode::Test => {
                self.heal_legacy_alias(store, TEST_MODE_API_KEY_FIELD, &[
                    API_KEY_FIELD,
                    SECRET_KEY_FIELD,
                ]);
                if let Some(key) = store.get(&self.config_field(TEST_MODE_API_KEY_FIELD)) {
                    validate_api_key(key)?;
                    return Ok(SecretString::new(key.to_string().into()));
                }
            }
            KeyMode::Live => {
                if let Some(key) =
                    secrets.retrieve(&self.profile_name, LIVE_MODE_API_KEY_FIELD)?
                {
                    validate_api_key(key.expose_secret())?;
                    return Ok(key);
                }
            }
        }

        Err(ProfileError::ApiKeyNotConfigured)
    }

    /// Returns the test-mode publishable key, or an empty string when
    /// none is configured. Publishable keys are non-sensitive and
    /// optional, so this never errors.
    pub fn get_publishable_key(&self, store: &mut ConfigStore) -> String {
        self.heal_legacy_alias(store, TEST_MODE_PUBLISHABLE_KEY_FIELD, &[
            PUBLISHABLE_KEY_FIELD,
        ]);
        store
            .get(&self.config_field(TEST_MODE_PUBLISHABLE_KEY_FIELD))
            .unwrap_or_default()
            .to_string()
    }

    /// Returns the account display name, empty if unset.
    pub fn get_display_name(&self, store: &ConfigStore) -> String {
        store
            .get(&self.config_field(DISPLAY_NAME_FIELD))
            .unwrap_or_default()
            .to_string()
    }

    /// Returns the Terminal POS device id, empty if unset.
    pub fn get_terminal_pos_device_id(&self, store: &ConfigStore) -> String {
        store
            .get(&self.config_field(TERMINAL_POS_DEVICE_ID_FIELD))
            .unwrap_or_default()
            .to_string()
    }

    /// Returns the color setting for this profile.
    ///
    /// Precedence: cross-profile `color` override > per-profile value >
    /// `"auto"`. Any value outside `{auto, on, off}` is rejected.
    pub fn get_color(&self, store: &ConfigStore) -> Result<String, ProfileError> {
        if let Some(color) = store.get(COLOR_KEY).and_then(non_empty_opt) {
            return normalize_color(color);
        }

        normalize_color(store.get(&self.config_field(COLOR_KEY)).unwrap_or_default())
    }

    /// Aliases `canonical` to the first of `legacy` fields that holds a
    /// value, but only while the canonical field itself resolves to
    /// nothing. Old config files upgrade silently on first read.
    fn heal_legacy_alias(&self, store: &mut ConfigStore, canonical: &str, legacy: &[&str]) {
        let canonical_key = self.config_field(canonical);
        if store.get(&canonical_key).is_some() {
            return;
        }
        for field in legacy {
            let legacy_key = self.config_field(field);
            if store.contains(&legacy_key) {
                store.register_alias(&canonical_key, &legacy_key);
                tracing::debug!(
                    canonical = %canonical_key,
                    legacy = %legacy_key,
                    "aliased legacy config field"
                );
                return;
            }
        }
    }

    // =========================================================================
    // Write path
    // =========================================================================

    /// Commits every non-empty in-memory field to the backends and
    /// persists the plaintext config file.
    pub fn create_profile(
        &self,
        store: &mut ConfigStore,
        secrets: &dyn SecretStore,
    ) -> Result<(), ProfileError> {
        self.write_profile(store, secrets)
    }

    fn write_profile(
        &self,
        store: &mut ConfigStore,
        secrets: &dyn SecretStore,
    ) -> Result<(), ProfileError> {
        if let Some(device_name) = non_empty(self.device_name.as_deref()) {
            store.set(self.config_field(DEVICE_NAME_FIELD), device_name);
        }

        if let Some(raw) = secret_non_empty(self.live_mode_api_key.as_ref()) {
            let expires_at = key_expires_at();

            // Redacted copy in the plaintext config, raw key in the
            // secure backend, expiry alongside both.
            store.set(
                self.config_field(LIVE_MODE_API_KEY_FIELD),
                redact_api_key(raw),
            );
            store.set(
                self.config_field(LIVE_MODE_EXPIRES_AT_FIELD),
                expires_at.clone(),
            );
            secrets.store(
                &self.profile_name,
                LIVE_MODE_API_KEY_FIELD,
                &SecretString::new(raw.to_string().into()),
                "Live mode API key",
            )?;
            secrets.store(
                &self.profile_name,
                LIVE_MODE_EXPIRES_AT_FIELD,
                &SecretString::new(expires_at.into()),
                "Live mode API key expiry",
            )?;
        }

        if let Some(raw) = secret_non_empty(self.live_mode_publishable_key.as_ref()) {
            store.set(
                self.config_field(LIVE_MODE_PUBLISHABLE_KEY_FIELD),
                redact_api_key(raw),
            );
            secrets.store(
                &self.profile_name,
                LIVE_MODE_PUBLISHABLE_KEY_FIELD,
                &SecretString::new(raw.to_string().into()),
                "Live mode publishable key",
            )?;
        }

        let wrote_test_api_key = secret_non_empty(self.test_mode_api_key.as_ref());
        if let Some(raw) = wrote_test_api_key {
            store.set(self.config_field(TEST_MODE_API_KEY_FIELD), raw);
            store.set(
                self.config_field(TEST_MODE_EXPIRES_AT_FIELD),
                key_expires_at(),
            );
        }

        let wrote_test_publishable_key = secret_non_empty(self.test_mode_publishable_key.as_ref());
        if let Some(raw) = wrote_test_publishable_key {
            store.set(self.config_field(TEST_MODE_PUBLISHABLE_KEY_FIELD), raw);
        }

        if let Some(display_name) = non_empty(self.display_name.as_deref()) {
            store.set(self.config_field(DISPLAY_NAME_FIELD), display_name);
        }

        if let Some(account_id) = non_empty(self.account_id.as_deref()) {
            store.set(self.config_field(ACCOUNT_ID_FIELD), account_id);
        }

        store.merge_from_disk()?;

        // Only after the merge: drop fields the canonical writes above
        // superseded. Failures here must not block the write.
        if wrote_test_api_key.is_some() {
            for field in [SECRET_KEY_FIELD, API_KEY_FIELD] {
                if let CleanupOutcome::Failed = self.remove_legacy_field(store, field) {
                    tracing::warn!(field, "failed to remove superseded legacy field");
                }
            }
        }
        if wrote_test_publishable_key.is_some()
            && let CleanupOutcome::Failed = self.remove_legacy_field(store, PUBLISHABLE_KEY_FIELD)
        {
            tracing::warn!(field = PUBLISHABLE_KEY_FIELD, "failed to remove superseded legacy field");
        }

        store.write()?;
        Ok(())
    }

    /// Best-effort removal of one namespaced legacy field.
    fn remove_legacy_field(&self, store: &mut ConfigStore, field: &str) -> CleanupOutcome {
        let key = self.config_field(field);
        if !store.contains(&key) {
            return CleanupOutcome::NotPresent;
        }
        match store.delete(&key) {
            Ok(()) => CleanupOutcome::Removed,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "legacy field removal failed");
                CleanupOutcome::Failed
            }
        }
    }

    /// Sets one namespaced field and persists the config file.
    pub fn write_config_field(
        &self,
        store: &mut ConfigStore,
        field: &str,
        value: &str,
    ) -> Result<(), ProfileError> {
        store.set(self.config_field(field), value);
        store.write()?;
        Ok(())
    }

    /// Removes one namespaced field and persists the config file.
    ///
    /// Fails when the field does not exist. The secure backend is left
    /// untouched: deleting the plaintext (redacted) copy of a live-mode
    /// field does not revoke the keyring entry.
    pub fn delete_config_field(
        &self,
        store: &mut ConfigStore,
        field: &str,
    ) -> Result<(), ProfileError> {
        store.delete(&self.config_field(field))?;
        store.write()?;
        Ok(())
    }
}

/// Expiry date for a key written now: today (UTC) plus the validity
/// window, formatted as `YYYY-MM-DD`.
fn key_expires_at() -> String {
    (chrono::Utc::now() + chrono::Duration::days(KEY_VALID_IN_DAYS))
        .format(EXPIRES_AT_FORMAT)
        .to_string()
}

fn normalize_color(value: &str) -> Result<String, ProfileError> {
    match value {
        "" | COLOR_AUTO => Ok(COLOR_AUTO.to_string()),
        COLOR_ON => Ok(COLOR_ON.to_string()),
        COLOR_OFF => Ok(COLOR_OFF.to_string()),
        other => Err(ProfileError::UnsupportedColor(other.to_string())),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn non_empty_opt(value: &str) -> Option<&str> {
    non_empty(Some(value))
}

fn secret_non_empty(value: Option<&SecretString>) -> Option<&str> {
    non_empty(value.map(ExposeSecret::expose_secret))
}
