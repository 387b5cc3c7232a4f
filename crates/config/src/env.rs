//! Environment variable helpers.
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            // No trimming needed, return original to avoid allocation
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_var_or_none_filters_empty_and_whitespace_strings() {
        let key = "_STRIPE_TEST_ENV_VAR";

        let unset = env_var_or_none(key);
        assert!(unset.is_none(), "Unset env var should return None");

        temp_env::with_vars([(key, Some(""))], || {
            assert!(
                env_var_or_none(key).is_none(),
                "Empty string env var should return None"
            );
        });

        temp_env::with_vars([(key, Some("   "))], || {
            assert!(
                env_var_or_none(key).is_none(),
                "Whitespace-only env var should return None"
            );
        });

        temp_env::with_vars([(key, Some(" sk_test_value "))], || {
            assert_eq!(
                env_var_or_none(key),
                Some("sk_test_value".to_string()),
                "Non-empty env var should return Some(trimmed value)"
            );
        });
    }
}
