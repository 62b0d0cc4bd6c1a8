//! Environment variable loading.
//!
//! Required lookups return an error instead of aborting: the host decides at
//! startup whether a missing value is fatal. An empty value counts as unset.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("environment variable '{0}' is not set or empty")]
    Missing(String),
}

/// Look up a variable the process cannot run without.
pub fn required_env(name: &str) -> Result<String, EnvError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(EnvError::Missing(name.to_string())),
    }
}

/// Look up a variable with a fallback, logging when the fallback is used.
pub fn optional_env(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            tracing::warn!(
                variable = name,
                default = default,
                "environment variable not found or empty, using default"
            );
            default.to_string()
        }
    }
}
