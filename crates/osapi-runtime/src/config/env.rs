//! Environment variable helpers
//!
//! Only used by `OsConfig::from_env`; nothing else in the layer reads the
//! environment.

use std::str::FromStr;

/// Get environment variable parsed as type T, or return default
///
/// ```ignore
/// let level: u8 = env_get("OSAPI_LOG_LEVEL", 3);
/// ```
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get environment variable as boolean
///
/// Accepts: "1", "true", "yes", "on" (case-insensitive) as true.
/// Any other set value is false; unset returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// Get environment variable as string, or return default
#[inline]
pub fn env_get_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default() {
        let val: u8 = env_get("__OSAPI_TEST_UNSET_VAR__", 3);
        assert_eq!(val, 3);
        assert!(env_get_bool("__OSAPI_TEST_UNSET_VAR__", true));
        assert_eq!(env_get_str("__OSAPI_TEST_UNSET_VAR__", "etc"), "etc");
    }

    #[test]
    fn test_env_get_with_set_var() {
        std::env::set_var("__OSAPI_TEST_NUM__", "4");
        let val: u8 = env_get("__OSAPI_TEST_NUM__", 0);
        assert_eq!(val, 4);

        std::env::set_var("__OSAPI_TEST_NUM__", "not_a_number");
        let val: u8 = env_get("__OSAPI_TEST_NUM__", 9);
        assert_eq!(val, 9);
        std::env::remove_var("__OSAPI_TEST_NUM__");
    }

    #[test]
    fn test_env_get_bool_variants() {
        for (raw, expect) in [("1", true), ("TRUE", true), ("on", true), ("0", false), ("garbage", false)] {
            std::env::set_var("__OSAPI_TEST_BOOL__", raw);
            assert_eq!(env_get_bool("__OSAPI_TEST_BOOL__", !expect), expect, "{}", raw);
        }
        std::env::remove_var("__OSAPI_TEST_BOOL__");
    }
}
