//! Compiler settings passed by reference through every translation step.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings for compiling path criteria into graph queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Name of the projected root variable (without `?`)
    #[serde(default = "default_result_variable")]
    pub result_variable: String,

    /// Prefix for fresh variables (`v0`, `v1`, ...)
    #[serde(default = "default_variable_prefix")]
    pub variable_prefix: String,

    /// Unrolling of recursive selectors
    #[serde(default)]
    pub recursion: RecursionConfig,

    /// Emit `SELECT DISTINCT`
    #[serde(default = "default_true")]
    pub distinct: bool,

    /// Namespace prefixes merged over the built-in table
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
}

fn default_result_variable() -> String {
    "x".to_string()
}

fn default_variable_prefix() -> String {
    "v".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            result_variable: default_result_variable(),
            variable_prefix: default_variable_prefix(),
            recursion: RecursionConfig::default(),
            distinct: true,
            prefixes: BTreeMap::new(),
        }
    }
}

/// How recursive selectors without an upper bound are unrolled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursionConfig {
    /// Deepest unrolling used when a selector has no upper bound.
    ///
    /// Paths deeper than this are not matched; a warning is logged whenever
    /// the bound is applied.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Fail instead of truncating unbounded recursion
    #[serde(default)]
    pub strict: bool,

    /// Largest depth any recursive selector may unroll to, bounded or not.
    ///
    /// Unrolling `{m,n}` emits one branch per depth, so pattern size grows
    /// with the square of `n`.
    #[serde(default = "default_max_explicit_depth")]
    pub max_explicit_depth: usize,
}

fn default_max_depth() -> usize {
    5
}

fn default_max_explicit_depth() -> usize {
    64
}

impl Default for RecursionConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            strict: false,
            max_explicit_depth: default_max_explicit_depth(),
        }
    }
}

impl QueryConfig {
    /// Builder-style prefix registration
    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), namespace.into());
        self
    }

    /// Builder-style recursion bound
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.recursion.max_depth = max_depth;
        self
    }

    /// Check that the settings can produce well-formed queries
    pub fn validate(&self) -> ConfigResult<()> {
        validate_variable_name("result_variable", &self.result_variable)?;
        validate_variable_name("variable_prefix", &self.variable_prefix)?;

        // Fresh variables are `<prefix><n>`; the root must never collide with one
        if let Some(rest) = self.result_variable.strip_prefix(&self.variable_prefix) {
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::Invalid(format!(
                    "result_variable '{}' collides with fresh variables prefixed '{}'",
                    self.result_variable, self.variable_prefix
                )));
            }
        }

        if self.recursion.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "recursion.max_depth must be at least 1".to_string(),
            ));
        }
        if self.recursion.max_explicit_depth < self.recursion.max_depth {
            return Err(ConfigError::Invalid(format!(
                "recursion.max_explicit_depth ({}) must not be below recursion.max_depth ({})",
                self.recursion.max_explicit_depth, self.recursion.max_depth
            )));
        }

        for (prefix, namespace) in &self.prefixes {
            if namespace.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "prefix '{}' has an empty namespace",
                    prefix
                )));
            }
            if prefix.contains(':') || prefix.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "prefix '{}' must not contain ':' or whitespace",
                    prefix
                )));
            }
        }

        Ok(())
    }
}

fn validate_variable_name(field: &str, name: &str) -> ConfigResult<()> {
    if name.is_empty() {
        return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::Invalid(format!(
            "{} '{}' may only contain ASCII letters, digits and '_'",
            field, name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = QueryConfig::default();
        assert_eq!(config.result_variable, "x");
        assert_eq!(config.variable_prefix, "v");
        assert_eq!(config.recursion.max_depth, 5);
        assert!(!config.recursion.strict);
        assert!(config.distinct);
        assert!(config.prefixes.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_default() {
        let config: QueryConfig = toml::from_str("").unwrap();
        assert_eq!(config, QueryConfig::default());
    }

    #[test]
    fn test_deserialize_partial_recursion() {
        let toml = r#"
            result_variable = "entity"

            [recursion]
            strict = true
        "#;
        let config: QueryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.result_variable, "entity");
        assert_eq!(config.recursion.max_depth, 5);
        assert!(config.recursion.strict);
    }

    #[test]
    fn test_deserialize_prefixes() {
        let toml = r#"
            [prefixes]
            ex = "http://www.example.com/schema#"
        "#;
        let config: QueryConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.prefixes.get("ex").map(String::as_str),
            Some("http://www.example.com/schema#")
        );
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = QueryConfig::default()
            .with_prefix("ex", "http://ex/")
            .with_max_depth(3);
        let serialized = toml::to_string(&config).unwrap();
        let back: QueryConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(back, config);
    }

    #[test_case("x", "v", true ; "defaults")]
    #[test_case("v", "v", true ; "bare prefix is not fresh")]
    #[test_case("v1", "v", false ; "collides with fresh")]
    #[test_case("vx", "v", true ; "prefix but not digits")]
    #[test_case("", "v", false ; "empty result")]
    #[test_case("x", "", false ; "empty prefix")]
    #[test_case("a-b", "v", false ; "dash")]
    #[test_case("x", "var_", true ; "underscore prefix")]
    fn test_validate_variables(result: &str, prefix: &str, ok: bool) {
        let config = QueryConfig {
            result_variable: result.to_string(),
            variable_prefix: prefix.to_string(),
            ..QueryConfig::default()
        };
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test]
    fn test_validate_max_depth() {
        let config = QueryConfig::default().with_max_depth(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_explicit_depth_ceiling() {
        assert_eq!(QueryConfig::default().recursion.max_explicit_depth, 64);

        let mut config = QueryConfig::default().with_max_depth(10);
        config.recursion.max_explicit_depth = 9;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_prefixes() {
        let config = QueryConfig::default().with_prefix("ex", " ");
        assert!(config.validate().is_err());

        let config = QueryConfig::default().with_prefix("e:x", "http://ex/");
        assert!(config.validate().is_err());
    }
}
