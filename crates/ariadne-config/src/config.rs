//! Main configuration types.
//!
//! This module provides the top-level [`PipelineConfig`] struct and its builder.

use ariadne_auth::AuthCondition;
use serde::{Deserialize, Serialize};

use crate::{
    AuthBindingConfig, ConfigError, EntitlementsCacheConfig, EntitlementsConfig, EntitlementsMode,
    LogFormat, TelemetryConfigSection,
};

/// Complete pipeline configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use ariadne_auth::AuthCondition;
/// use ariadne_config::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.auth.condition(), AuthCondition::Required);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Authentication binding.
    #[serde(default)]
    pub auth: AuthBindingConfig,

    /// Entitlement resolution.
    #[serde(default)]
    pub entitlements: EntitlementsConfig,

    /// Telemetry (metrics, logging).
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl PipelineConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The service name is empty
    /// - The log filter directive does not parse
    /// - Metrics are enabled with empty or unordered duration buckets
    /// - `read_only` entitlements list role groups
    /// - The entitlement cache is enabled outside `external` mode, or with a
    ///   zero TTL or capacity
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telemetry.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.service_name",
                "must not be empty",
            ));
        }

        if self.telemetry.logging.enabled {
            ariadne_telemetry::logging::create_env_filter(&self.telemetry.logging.level)
                .map_err(|e| ConfigError::invalid_value("telemetry.logging.level", e.to_string()))?;
        }

        let buckets = &self.telemetry.metrics.duration_buckets;
        if self.telemetry.metrics.enabled {
            if buckets.is_empty() {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.duration_buckets",
                    "must not be empty",
                ));
            }
            if buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.duration_buckets",
                    "must be strictly increasing",
                ));
            }
        }

        let entitlements = &self.entitlements;
        if entitlements.mode == EntitlementsMode::ReadOnly && !entitlements.role_groups.is_empty() {
            return Err(ConfigError::invalid_value(
                "entitlements.role_groups",
                "read_only entitlements carry no role groups",
            ));
        }

        let cache = &entitlements.cache;
        if cache.enabled {
            if entitlements.mode != EntitlementsMode::External {
                return Err(ConfigError::validation_error(
                    "entitlements.cache can only be enabled when entitlements.mode is 'external'",
                ));
            }
            if cache.ttl_secs == 0 {
                return Err(ConfigError::invalid_value(
                    "entitlements.cache.ttl_secs",
                    "must be positive",
                ));
            }
            if cache.max_entries == 0 {
                return Err(ConfigError::invalid_value(
                    "entitlements.cache.max_entries",
                    "must be positive",
                ));
            }
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty `debug` logs with source locations
    /// - Optional authentication
    /// - Everyone gets the `user` role
    ///
    /// # Example
    ///
    /// ```
    /// use ariadne_config::PipelineConfig;
    ///
    /// let config = PipelineConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.span_events = true;
        config.telemetry.logging.include_location = true;
        config.telemetry.environment = "development".to_string();

        config.auth.condition = AuthCondition::Optional;
        config.entitlements.mode = EntitlementsMode::Fixed;
        config.entitlements.roles = vec!["user".to_string()];

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON `info` logs
    /// - Required authentication
    /// - External entitlements behind a one-minute cache
    ///
    /// # Example
    ///
    /// ```
    /// use ariadne_config::{LogFormat, PipelineConfig};
    ///
    /// let config = PipelineConfig::production();
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.environment = "production".to_string();

        config.auth.condition = AuthCondition::Required;
        config.entitlements.mode = EntitlementsMode::External;
        config.entitlements.cache = EntitlementsCacheConfig {
            enabled: true,
            ttl_secs: 60,
            max_entries: 50_000,
            cache_denies: false,
        };

        config
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    auth: Option<AuthBindingConfig>,
    entitlements: Option<EntitlementsConfig>,
    telemetry: Option<TelemetryConfigSection>,
}

impl PipelineConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the auth binding configuration.
    #[must_use]
    pub fn auth(mut self, auth: AuthBindingConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the entitlements configuration.
    #[must_use]
    pub fn entitlements(mut self, entitlements: EntitlementsConfig) -> Self {
        self.entitlements = Some(entitlements);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> PipelineConfig {
        PipelineConfig {
            auth: self.auth.unwrap_or_default(),
            entitlements: self.entitlements.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<PipelineConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.entitlements.mode, EntitlementsMode::DenyAll);
        assert_eq!(config.telemetry.service_name, "ariadne-service");
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(PipelineConfig::development().validate().is_ok());
        assert!(PipelineConfig::production().validate().is_ok());
        assert_eq!(
            PipelineConfig::development().auth.condition(),
            AuthCondition::Optional
        );
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::builder()
            .auth(AuthBindingConfig {
                condition: AuthCondition::Optional,
            })
            .build();
        assert_eq!(config.auth.condition(), AuthCondition::Optional);
        assert_eq!(config.entitlements, EntitlementsConfig::default());
    }

    #[test]
    fn test_validate_empty_service_name() {
        let mut config = PipelineConfig::default();
        config.telemetry.service_name = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "telemetry.service_name"
        ));
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = PipelineConfig::default();
        config.telemetry.logging.level = "ariadne=notalevel".to_string();
        assert!(config.validate().is_err());

        config.telemetry.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_buckets() {
        let mut config = PipelineConfig::default();
        config.telemetry.metrics.duration_buckets = vec![0.1, 0.05];
        assert!(config.validate().is_err());

        config.telemetry.metrics.duration_buckets = Vec::new();
        assert!(config.validate().is_err());

        config.telemetry.metrics.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_cache_outside_external_mode() {
        let mut config = PipelineConfig::default();
        config.entitlements.cache.enabled = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_read_only_groups() {
        let config = PipelineConfig::builder()
            .entitlements(EntitlementsConfig {
                mode: EntitlementsMode::ReadOnly,
                role_groups: vec!["ops".to_string()],
                ..EntitlementsConfig::default()
            })
            .build_validated();
        assert!(config.is_err());
    }
}
