//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::{ConfigError, EntitlementsMode, LogFormat, PipelineConfig};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code, or a preset)
/// 2. Configuration files (TOML or JSON), merged key by key
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use ariadne_config::ConfigLoader;
///
/// # fn main() -> Result<(), ariadne_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("pipeline.toml")?
///     .with_env_prefix("ARIADNE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: PipelineConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    ///
    /// This is called automatically by `new()`, but can be chained for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = PipelineConfig::default();
        self
    }

    /// Start with development preset configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use ariadne_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = PipelineConfig::development();
        self
    }

    /// Start with production preset configuration.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = PipelineConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats, chosen by extension.
    /// Keys present in the file override the current values; absent keys keep
    /// them.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let overlay = Self::parse_file(&content, path)?;
        self.merge_config(overlay)?;

        Ok(self)
    }

    /// Load configuration from an optional file.
    ///
    /// If the file exists, loads it. If not, silently continues.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// `format` is `"toml"` or `"json"`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use ariadne_config::{ConfigLoader, EntitlementsMode};
    ///
    /// let toml = r#"
    ///     [entitlements]
    ///     mode = "fixed"
    ///     roles = ["admin", "user"]
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.entitlements.mode, EntitlementsMode::Fixed);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let overlay = match format.to_lowercase().as_str() {
            "toml" => toml_to_json(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };

        self.merge_config(overlay)?;
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `ARIADNE__AUTH__CONDITION=optional` or
    /// `ARIADNE__ENTITLEMENTS__CACHE__TTL_SECS=30`. List values are
    /// comma-separated.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory or its parents, if any.
    ///
    /// Variables already set in the environment win over the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::dotenv_error(".env", e.to_string())),
        }
    }

    /// Load a specific `.env`-style file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or cannot be parsed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        dotenvy::from_path(path).map_err(|e| ConfigError::dotenv_error(path, e.to_string()))?;
        Ok(self)
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Environment variable parsing fails
    /// - Configuration validation fails
    pub fn load(mut self) -> Result<PipelineConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without validation.
    #[must_use]
    pub fn load_unvalidated(self) -> PipelineConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<Value, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => toml_to_json(content),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    // Overlay the parsed document on the current configuration; strict field
    // checking happens when the merged document is deserialized.
    fn merge_config(&mut self, overlay: Value) -> Result<(), ConfigError> {
        let mut base = serde_json::to_value(&self.config)?;
        merge_values(&mut base, overlay);
        self.config = serde_json::from_value(base)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let env_vars: BTreeMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(key_without_prefix) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__"))
        else {
            // Shares the prefix but not the separator (e.g. ARIADNE_HOME)
            return Ok(());
        };

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            // Auth section
            ["AUTH", "CONDITION"] => {
                config.auth.condition = match value.to_lowercase().as_str() {
                    "required" => ariadne_auth::AuthCondition::Required,
                    "optional" => ariadne_auth::AuthCondition::Optional,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'required' or 'optional'",
                        ))
                    }
                };
            }

            // Entitlements section
            ["ENTITLEMENTS", "MODE"] => {
                config.entitlements.mode = match value.to_lowercase().as_str() {
                    "deny_all" => EntitlementsMode::DenyAll,
                    "fixed" => EntitlementsMode::Fixed,
                    "read_only" => EntitlementsMode::ReadOnly,
                    "external" => EntitlementsMode::External,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'deny_all', 'fixed', 'read_only', or 'external'",
                        ))
                    }
                };
            }
            ["ENTITLEMENTS", "ROLES"] => config.entitlements.roles = parse_list(value),
            ["ENTITLEMENTS", "ROLE_GROUPS"] => config.entitlements.role_groups = parse_list(value),
            ["ENTITLEMENTS", "AUTHORITIES"] => config.entitlements.authorities = parse_list(value),
            ["ENTITLEMENTS", "CACHE", "ENABLED"] => {
                config.entitlements.cache.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["ENTITLEMENTS", "CACHE", "TTL_SECS"] => {
                config.entitlements.cache.ttl_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["ENTITLEMENTS", "CACHE", "MAX_ENTRIES"] => {
                config.entitlements.cache.max_entries = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["ENTITLEMENTS", "CACHE", "CACHE_DENIES"] => {
                config.entitlements.cache.cache_denies = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Telemetry section
            ["TELEMETRY", "SERVICE_NAME"] => {
                config.telemetry.service_name = value.to_string();
            }
            ["TELEMETRY", "SERVICE_VERSION"] => {
                config.telemetry.service_version = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["TELEMETRY", "ENVIRONMENT"] => {
                config.telemetry.environment = value.to_string();
            }
            ["TELEMETRY", "METRICS", "ENABLED"] => {
                config.telemetry.metrics.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                config.telemetry.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                config.telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                config.telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["TELEMETRY", "LOGGING", "SPAN_EVENTS"] => {
                config.telemetry.logging.span_events = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                config.telemetry.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Unknown key - ignore
            _ => {}
        }

        Ok(())
    }
}

fn toml_to_json(content: &str) -> Result<Value, ConfigError> {
    let document: toml::Value = toml::from_str(content)?;
    Ok(serde_json::to_value(document)?)
}

/// Recursively overlays `overlay` on `base`. Tables merge; anything else
/// replaces.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a comma-separated list, dropping blanks.
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariadne_auth::AuthCondition;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.entitlements.mode, EntitlementsMode::External);
        assert!(config.entitlements.cache.enabled);
    }

    #[test]
    fn test_loader_with_string_toml() {
        let toml = r#"
            [auth]
            condition = "optional"

            [entitlements]
            mode = "fixed"
            roles = ["admin", "user"]
            role_groups = ["adminGroup"]
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.auth.condition(), AuthCondition::Optional);
        assert_eq!(config.entitlements.roles, ["admin", "user"]);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"telemetry": {"service_name": "item-search"}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.telemetry.service_name, "item-search");
    }

    #[test]
    fn test_layers_keep_unset_values() {
        let config = ConfigLoader::new()
            .with_development()
            .with_string(r#"{"telemetry": {"environment": "staging"}}"#, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.telemetry.environment, "staging");
        // Untouched by the overlay, still from the development preset
        assert_eq!(config.telemetry.logging.level, "debug");
        assert_eq!(config.entitlements.mode, EntitlementsMode::Fixed);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = ConfigLoader::new().with_string("[auth]\ncondtion = \"optional\"", "toml");
        assert!(matches!(result, Err(ConfigError::JsonError(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let result = ConfigLoader::new().with_string("a: b", "yaml");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/pipeline.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/pipeline.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_merge_values() {
        let mut base = serde_json::json!({"a": {"b": 1, "c": [1, 2]}, "d": true});
        merge_values(&mut base, serde_json::json!({"a": {"c": [3]}, "e": "x"}));
        assert_eq!(
            base,
            serde_json::json!({"a": {"b": 1, "c": [3]}, "d": true, "e": "x"})
        );
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("admin, user,,"), ["admin", "user"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_apply_env_var_auth_and_entitlements() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__AUTH__CONDITION", "optional", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__ENTITLEMENTS__MODE", "read_only", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__ENTITLEMENTS__ROLES", "viewer,auditor", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__ENTITLEMENTS__CACHE__TTL_SECS", "30", "TEST")
            .unwrap();

        assert_eq!(loader.config.auth.condition(), AuthCondition::Optional);
        assert_eq!(loader.config.entitlements.mode, EntitlementsMode::ReadOnly);
        assert_eq!(loader.config.entitlements.roles, ["viewer", "auditor"]);
        assert_eq!(loader.config.entitlements.cache.ttl_secs, 30);
    }

    #[test]
    fn test_apply_env_var_telemetry() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__TELEMETRY__SERVICE_NAME", "my-service", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "pretty", "TEST")
            .unwrap();
        assert_eq!(loader.config.telemetry.service_name, "my-service");
        assert_eq!(loader.config.telemetry.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__AUTH__CONDITION", "sometimes", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__ENTITLEMENTS__CACHE__MAX_ENTRIES", "lots", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__TELEMETRY__METRICS__ENABLED", "perhaps", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_ignores_unrelated_keys() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TESTING", "x", "TEST").unwrap();
        loader.apply_env_var("TEST__NOPE", "x", "TEST").unwrap();
        assert_eq!(loader.config, PipelineConfig::default());
    }
}
