//! Property-based tests for field namespacing and key redaction, using
//! randomly generated inputs to catch edge cases the unit tests miss.

use proptest::prelude::*;

use stripe_config::Profile;
use stripe_config::validators::redact_api_key;

/// Strategy for generating profile names.
fn profile_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("default".to_string()),
        Just("acct-test".to_string()),
        "[a-z][a-z0-9_-]{0,24}".prop_map(String::from),
    ]
}

/// Strategy for generating field names.
fn field_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,32}".prop_map(String::from)
}

/// Strategy for generating plausible API keys.
fn api_key_strategy() -> impl Strategy<Value = String> {
    ("(sk|rk)_(test|live)_", "[a-zA-Z0-9]{13,40}").prop_map(|(prefix, body)| prefix + &body)
}

proptest! {
    #[test]
    fn prop_config_field_is_name_dot_field(
        name in profile_name_strategy(),
        field in field_name_strategy(),
    ) {
        let profile = Profile::new(name.clone());
        prop_assert_eq!(profile.config_field(&field), format!("{}.{}", name, field));
    }

    #[test]
    fn prop_redaction_preserves_length_and_edges(key in api_key_strategy()) {
        let redacted = redact_api_key(&key);
        prop_assert_eq!(redacted.len(), key.len());
        prop_assert_eq!(&redacted[..8], &key[..8]);
        prop_assert_eq!(&redacted[key.len() - 4..], &key[key.len() - 4..]);
        prop_assert!(redacted[8..key.len() - 4].chars().all(|c| c == '*'));
    }

    #[test]
    fn prop_redaction_hides_the_key_middle(key in api_key_strategy()) {
        let redacted = redact_api_key(&key);
        let middle = &key[8..key.len() - 4];
        // The starred region never reproduces the raw middle.
        prop_assert!(middle.is_empty() || !redacted.contains(middle));
    }
}
