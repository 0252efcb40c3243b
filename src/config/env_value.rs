// ABOUTME: Configuration values that may come from environment variables.
// ABOUTME: Handles literal values and references to environment variables with defaults.

use super::error::ConfigError;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn resolve(&self) -> Result<String, ConfigError> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { var, default } => match std::env::var(var) {
                Ok(val) => Ok(val),
                Err(_) => default
                    .clone()
                    .ok_or_else(|| ConfigError::MissingEnvVar(var.clone())),
            },
        }
    }
}

/// Resolve an optional value; a missing field stays missing.
pub fn resolve_optional(value: Option<&EnvValue>) -> Result<Option<String>, ConfigError> {
    value.map(EnvValue::resolve).transpose()
}
