//! Environment configuration helpers
//!
//! Thin wrappers over `std::env` that report which variable was wrong.
//! Loading `.env` files is left to the binary (`dotenvy`).

use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

/// Read a required variable
pub fn require_env(name: &str) -> Result<String, ConfigError> {
    lookup(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

/// Read a variable, falling back to `default` when unset or blank
pub fn env_or(name: &str, default: &str) -> String {
    lookup(name).unwrap_or_else(|| default.to_string())
}

/// Parse a variable, falling back to `default` when unset or blank
pub fn parse_env_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

/// Parse a raw value on behalf of variable `name`
///
/// Booleans also accept `1/0`, `yes/no` and `on/off` via [`parse_bool`].
pub fn parse_value<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        name: name.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a boolean flag leniently
pub fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name: name.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

/// Read a boolean flag, falling back to `default` when unset or blank
pub fn bool_env_or(name: &str, default: bool) -> Result<bool, ConfigError> {
    match lookup(name) {
        Some(raw) => parse_bool(name, &raw),
        None => Ok(default),
    }
}

fn lookup(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
