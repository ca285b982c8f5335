//! API key format check

/// Key prefixes issued by the service
const KEY_PREFIXES: [&str; 2] = ["pk_live_", "pk_test_"];

/// Minimum length of the part after the prefix
const MIN_SECRET_LEN: usize = 20;

/// Check an API key's format without contacting the service.
///
/// A key is `pk_live_` or `pk_test_` followed by at least 20 ASCII
/// alphanumerics.
///
/// # Examples
///
/// ```
/// use parserator_domain::validate_api_key;
///
/// assert!(validate_api_key("pk_live_abcdefghij0123456789"));
/// assert!(!validate_api_key("invalid"));
/// ```
pub fn validate_api_key(key: &str) -> bool {
    KEY_PREFIXES.iter().any(|prefix| {
        key.strip_prefix(prefix).is_some_and(|secret| {
            secret.len() >= MIN_SECRET_LEN && secret.chars().all(|c| c.is_ascii_alphanumeric())
        })
    })
}
