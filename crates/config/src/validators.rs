//! API key format validation and redaction.
//!
//! Responsibilities:
//! - Structural validation of secret/restricted API keys before they are
//!   handed to callers.
//! - Redaction of key material for plaintext storage and display.
//!
//! Does NOT handle:
//! - Verifying keys against a remote service.
//!
//! Invariants:
//! - Validation runs on the read path only; the write path stores fields
//!   as given.
//! - A redacted key is never recoverable from its redacted form alone.

use crate::error::ProfileError;

/// Minimum length of a structurally valid API key.
const MIN_API_KEY_LENGTH: usize = 12;

/// Validates the format of a secret or restricted API key.
///
/// An empty key maps to [`ProfileError::ApiKeyNotConfigured`] so callers
/// can treat "present but blank" the same as "absent". Any other
/// structural problem maps to [`ProfileError::InvalidApiKey`].
pub fn validate_api_key(key: &str) -> Result<(), ProfileError> {
    if key.is_empty() {
        return Err(ProfileError::ApiKeyNotConfigured);
    }

    if key.len() < MIN_API_KEY_LENGTH {
        return Err(ProfileError::InvalidApiKey {
            message: format!(
                "API key is too short, must be at least {} characters long",
                MIN_API_KEY_LENGTH
            ),
        });
    }

    match key.split('_').next() {
        Some("sk") | Some("rk") => Ok(()),
        Some(_) | None => Err(ProfileError::InvalidApiKey {
            message: "the CLI only supports secret (sk_) or restricted (rk_) keys".to_string(),
        }),
    }
}

/// Returns a redacted representation of an API key, safe for plaintext
/// storage and display.
///
/// Keeps the first 8 and last 4 characters, starring the middle
/// (`sk_live_abcdefgh1234` becomes `sk_live_********1234`). Keys of 12
/// characters or fewer are starred entirely.
pub fn redact_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= MIN_API_KEY_LENGTH {
        return "*".repeat(chars.len());
    }

    let mut redacted = String::with_capacity(chars.len());
    redacted.extend(&chars[..8]);
    redacted.extend(std::iter::repeat('*').take(chars.len() - 12));
    redacted.extend(&chars[chars.len() - 4..]);
    redacted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_secret_and_restricted_keys() {
        assert!(validate_api_key("sk_test_abcdef123456").is_ok());
        assert!(validate_api_key("sk_live_abcdef123456").is_ok());
        assert!(validate_api_key("rk_test_abcdef123456").is_ok());
    }

    #[test]
    fn test_validate_empty_key_is_not_configured() {
        assert!(matches!(
            validate_api_key(""),
            Err(ProfileError::ApiKeyNotConfigured)
        ));
    }

    #[test]
    fn test_validate_short_key_is_invalid() {
        let err = validate_api_key("sk_test_a").unwrap_err();
        assert!(matches!(err, ProfileError::InvalidApiKey { .. }));
    }

    #[test]
    fn test_validate_unknown_prefix_is_invalid() {
        let err = validate_api_key("pk_test_abcdef123456").unwrap_err();
        assert!(matches!(err, ProfileError::InvalidApiKey { .. }));

        let err = validate_api_key("abcdefghijklmnop").unwrap_err();
        assert!(matches!(err, ProfileError::InvalidApiKey { .. }));
    }

    #[test]
    fn test_redact_keeps_prefix_and_suffix() {
        let redacted = redact_api_key("sk_live_abcdefgh1234");
        assert_eq!(redacted, "sk_live_********1234");
        assert_eq!(redacted.len(), "sk_live_abcdefgh1234".len());
    }

    #[test]
    fn test_redact_short_key_is_fully_starred() {
        assert_eq!(redact_api_key("sk_live_1234"), "************");
        assert_eq!(redact_api_key("abc"), "***");
        assert_eq!(redact_api_key(""), "");
    }
}
