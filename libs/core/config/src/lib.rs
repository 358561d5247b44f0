//! Environment-sourced configuration shared by the vector crates.
//!
//! Every config struct is built once at startup through [`FromEnv`] and then
//! passed by value into the component that needs it. Nothing here is global.

pub mod embedding;
pub mod mongodb;
pub mod s3vectors;
pub mod tracing;

use std::env;
use std::str::FromStr;
use thiserror::Error;

pub use embedding::EmbeddingConfig;
pub use mongodb::MongoVectorConfig;
pub use s3vectors::S3VectorsConfig;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment, drives log formatting
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load and parse environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Helper to load and parse environment variable or return error
///
/// Blank values count as missing.
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

/// Parse an optional environment variable, falling back to `default` when unset
pub fn env_parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Masks a secret for `Debug` output, keeping only the last four characters.
pub(crate) fn redact(secret: &str) -> String {
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            assert_eq!(Environment::from_env(), Environment::Production);
        });

        temp_env::with_var("APP_ENV", Some("Production"), || {
            assert_eq!(Environment::from_env(), Environment::Production);
        });
    }

    #[test]
    fn test_environment_unknown_defaults_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_or_default_without_value() {
        temp_env::with_var_unset("VECTOR_MISSING_VAR", || {
            let result = env_or_default("VECTOR_MISSING_VAR", "default_value");
            assert_eq!(result, "default_value");
        });
    }

    #[test]
    fn test_env_required_success() {
        temp_env::with_var("VECTOR_REQUIRED_VAR", Some("required_value"), || {
            let result = env_required("VECTOR_REQUIRED_VAR");
            assert_eq!(result.unwrap(), "required_value");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("VECTOR_MISSING_REQUIRED", || {
            let err = env_required("VECTOR_MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("VECTOR_MISSING_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_required_blank_is_missing() {
        temp_env::with_var("VECTOR_BLANK_VAR", Some("   "), || {
            assert!(matches!(
                env_required("VECTOR_BLANK_VAR"),
                Err(ConfigError::MissingEnvVar(_))
            ));
        });
    }

    #[test]
    fn test_env_parse_or() {
        temp_env::with_var("VECTOR_NUMBER", Some("42"), || {
            assert_eq!(env_parse_or("VECTOR_NUMBER", 7u32).unwrap(), 42);
        });
        temp_env::with_var_unset("VECTOR_NUMBER", || {
            assert_eq!(env_parse_or("VECTOR_NUMBER", 7u32).unwrap(), 7);
        });
        temp_env::with_var("VECTOR_NUMBER", Some("many"), || {
            let err = env_parse_or("VECTOR_NUMBER", 7u32).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { .. }));
            assert!(err.to_string().contains("VECTOR_NUMBER"));
        });
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("abc"), "****");
        assert_eq!(redact("sk-1234567890"), "****7890");
    }
}
