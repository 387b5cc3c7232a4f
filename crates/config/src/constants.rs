//! Centralized constants for the Stripe CLI workspace.
//!
//! This module contains values shared across crates to avoid magic
//! string/number duplication.

// =============================================================================
// Credential Expiry
// =============================================================================

/// Number of days a freshly written API key is considered valid.
pub const KEY_VALID_IN_DAYS: i64 = 90;

/// Date format for the `*_key_expires_at` fields (e.g. `2026-11-25`).
pub const EXPIRES_AT_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Keyring
// =============================================================================

/// Service name used for all OS keyring entries.
pub const KEYRING_SERVICE: &str = "stripe-cli";

// =============================================================================
// Color Output
// =============================================================================

/// Auto-detect whether to colorize output (default).
pub const COLOR_AUTO: &str = "auto";

/// Always colorize output.
pub const COLOR_ON: &str = "on";

/// Never colorize output.
pub const COLOR_OFF: &str = "off";

/// Un-namespaced config key holding the cross-profile color override.
pub const COLOR_KEY: &str = "color";

// =============================================================================
// Environment Variables
// =============================================================================

/// Overrides every persisted or in-memory device name.
pub const DEVICE_NAME_ENV: &str = "STRIPE_DEVICE_NAME";

/// Overrides every persisted or in-memory API key.
pub const API_KEY_ENV: &str = "STRIPE_API_KEY";

/// Overrides the default config file location.
pub const CONFIG_PATH_ENV: &str = "STRIPE_CONFIG_PATH";
