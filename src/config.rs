//! Engine configuration

use serde::Deserialize;
use thiserror::Error;

/// Prefix of the environment variables read by [`EngineConfig::from_env`]
pub const ENV_PREFIX: &str = "CASEFLOW_EL_";

/// Configuration loading errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The JSON document is malformed or has fields of the wrong type
    #[error("Invalid configuration: {message}")]
    InvalidJson {
        /// Parser message
        message: String,
    },

    /// An environment variable holds an unusable value
    #[error("Invalid value '{value}' for {variable}")]
    InvalidVariable {
        /// Variable name
        variable: String,
        /// Offending value
        value: String,
    },
}

/// Configuration for an [`ExpressionManager`](crate::ExpressionManager)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether parsed templates are cached by source text
    pub enable_expression_cache: bool,

    /// Maximum number of cached templates; the cache is cleared when full
    pub max_cache_size: usize,

    /// Whether shorthand function syntax is rewritten before parsing
    pub enable_enhancers: bool,

    /// Identifier of the root variable scope, injected by enhancers
    pub scope_variable: String,

    /// Identifier that reads the evaluation's principal
    pub principal_variable: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_expression_cache: true,
            max_cache_size: 1000,
            enable_enhancers: true,
            scope_variable: "planItemInstance".to_string(),
            principal_variable: "authenticatedUserId".to_string(),
        }
    }
}

impl EngineConfig {
    /// Configuration without an expression cache
    pub fn uncached() -> Self {
        Self {
            enable_expression_cache: false,
            max_cache_size: 0,
            ..Self::default()
        }
    }

    /// Enable or disable the expression cache
    pub fn with_expression_cache(mut self, enabled: bool) -> Self {
        self.enable_expression_cache = enabled;
        self
    }

    /// Set the cache capacity
    pub fn with_max_cache_size(mut self, size: usize) -> Self {
        self.max_cache_size = size;
        self
    }

    /// Enable or disable shorthand rewriting
    pub fn with_enhancers(mut self, enabled: bool) -> Self {
        self.enable_enhancers = enabled;
        self
    }

    /// Set the scope identifier
    pub fn with_scope_variable(mut self, name: impl Into<String>) -> Self {
        self.scope_variable = name.into();
        self
    }

    /// Set the principal identifier
    pub fn with_principal_variable(mut self, name: impl Into<String>) -> Self {
        self.principal_variable = name.into();
        self
    }

    /// Read a JSON document; absent fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidJson {
            message: e.to_string(),
        })
    }

    /// Defaults overridden by `CASEFLOW_EL_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok())
    }

    /// Apply overrides looked up by unprefixed upper-case field name
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup("ENABLE_EXPRESSION_CACHE") {
            self.enable_expression_cache = parse_flag("ENABLE_EXPRESSION_CACHE", &value)?;
        }
        if let Some(value) = lookup("MAX_CACHE_SIZE") {
            self.max_cache_size =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidVariable {
                        variable: format!("{ENV_PREFIX}MAX_CACHE_SIZE"),
                        value: value.clone(),
                    })?;
        }
        if let Some(value) = lookup("ENABLE_ENHANCERS") {
            self.enable_enhancers = parse_flag("ENABLE_ENHANCERS", &value)?;
        }
        if let Some(value) = lookup("SCOPE_VARIABLE") {
            self.scope_variable = value;
        }
        if let Some(value) = lookup("PRINCIPAL_VARIABLE") {
            self.principal_variable = value;
        }
        Ok(self)
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidVariable {
            variable: format!("{ENV_PREFIX}{name}"),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.enable_expression_cache);
        assert_eq!(config.max_cache_size, 1000);
        assert!(config.enable_enhancers);
        assert_eq!(config.scope_variable, "planItemInstance");
        assert_eq!(config.principal_variable, "authenticatedUserId");
    }

    #[test]
    fn test_from_json_keeps_missing_fields() {
        let config =
            EngineConfig::from_json_str(r#"{"max_cache_size": 10, "scope_variable": "execution"}"#)
                .unwrap();
        assert_eq!(
            config,
            EngineConfig::default()
                .with_max_cache_size(10)
                .with_scope_variable("execution")
        );
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"max_cache_size": "many"}"#),
            Err(ConfigError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::default()
            .with_overrides(|name| match name {
                "ENABLE_ENHANCERS" => Some("off".to_string()),
                "MAX_CACHE_SIZE" => Some(" 5 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert!(!config.enable_enhancers);
        assert_eq!(config.max_cache_size, 5);

        let err = EngineConfig::default()
            .with_overrides(|name| (name == "ENABLE_EXPRESSION_CACHE").then(|| "maybe".to_string()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value 'maybe' for CASEFLOW_EL_ENABLE_EXPRESSION_CACHE"
        );
    }
}
