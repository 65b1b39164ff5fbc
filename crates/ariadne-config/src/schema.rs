//! Configuration sections.

use ariadne_auth::{
    AuthCondition, CacheConfig, CachedResolver, EntitlementsResolvers, SharedResolver,
};
use ariadne_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::ConfigError;

fn default_true() -> bool {
    true
}

// ============================================================================
// Auth binding
// ============================================================================

/// Authentication binding configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct AuthBindingConfig {
    /// Whether flows insist on an authenticated caller.
    #[serde(default)]
    pub condition: AuthCondition,
}

impl AuthBindingConfig {
    /// The configured [`AuthCondition`].
    #[must_use]
    pub const fn condition(&self) -> AuthCondition {
        self.condition
    }
}

// ============================================================================
// Entitlements
// ============================================================================

/// Which entitlements resolver to build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementsMode {
    /// Deny everyone.
    #[default]
    DenyAll,
    /// Grant the configured roles, groups and authorities to everyone.
    Fixed,
    /// Grant the configured roles and authorities to everyone, no groups.
    ReadOnly,
    /// Delegate to a resolver supplied by the host.
    External,
}

/// Entitlement cache settings (external mode only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EntitlementsCacheConfig {
    /// Enable caching.
    #[serde(default)]
    pub enabled: bool,

    /// Time-to-live of a cached answer, in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum number of cached principals.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Cache denials too.
    #[serde(default)]
    pub cache_denies: bool,
}

impl Default for EntitlementsCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
            cache_denies: false,
        }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_max_entries() -> usize {
    10_000
}

impl EntitlementsCacheConfig {
    /// The [`CacheConfig`] these settings describe.
    #[must_use]
    pub fn to_cache_config(&self) -> CacheConfig {
        if !self.enabled {
            return CacheConfig::disabled();
        }
        CacheConfig {
            max_entries: self.max_entries,
            ttl: Duration::from_secs(self.ttl_secs),
            cache_denies: self.cache_denies,
        }
    }
}

/// Entitlements configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct EntitlementsConfig {
    /// Resolver to build.
    #[serde(default)]
    pub mode: EntitlementsMode,

    /// Roles for `fixed` and `read_only`.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Role groups for `fixed`.
    #[serde(default)]
    pub role_groups: Vec<String>,

    /// Authorities for `fixed` and `read_only`.
    #[serde(default)]
    pub authorities: Vec<String>,

    /// Cache in front of the external resolver.
    #[serde(default)]
    pub cache: EntitlementsCacheConfig,
}

impl EntitlementsConfig {
    /// Builds the configured resolver.
    ///
    /// `external` is the host's lookup; it is required in `external` mode and
    /// ignored otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` in `external` mode without an
    /// external resolver.
    pub fn build_resolver(
        &self,
        external: Option<SharedResolver>,
    ) -> Result<SharedResolver, ConfigError> {
        let resolver: SharedResolver = match self.mode {
            EntitlementsMode::DenyAll => Arc::new(EntitlementsResolvers::deny_all()),
            EntitlementsMode::Fixed => Arc::new(EntitlementsResolvers::fixed(
                self.roles.clone(),
                self.role_groups.clone(),
                self.authorities.clone(),
            )),
            EntitlementsMode::ReadOnly => Arc::new(EntitlementsResolvers::read_only(
                self.roles.clone(),
                self.authorities.clone(),
            )),
            EntitlementsMode::External => {
                let source = external
                    .ok_or_else(|| ConfigError::missing_field("entitlements external resolver"))?;
                if self.cache.enabled {
                    Arc::new(CachedResolver::new(source, self.cache.to_cache_config()))
                } else {
                    Arc::new(EntitlementsResolvers::read_from(source))
                }
            }
        };
        Ok(resolver)
    }
}

// ============================================================================
// Telemetry
// ============================================================================

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Enable metrics collection.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Flow duration histogram buckets, in seconds.
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_buckets: default_duration_buckets(),
        }
    }
}

fn default_duration_buckets() -> Vec<f64> {
    MetricsConfig::default().duration_buckets
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. `info`, `ariadne_flow=debug,info`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Log span open and close events.
    #[serde(default)]
    pub span_events: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            span_events: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Service name used in logs and as the `service` metric label.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Service version.
    #[serde(default)]
    pub service_version: Option<String>,

    /// Deployment environment.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TelemetryConfigSection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: None,
            environment: default_environment(),
            metrics: MetricsSection::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_service_name() -> String {
    "ariadne-service".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

impl TelemetryConfigSection {
    /// Converts this section into the telemetry crate's configuration.
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        let logging = LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            json_format: self.logging.format == LogFormat::Json,
            span_events: self.logging.span_events,
            file_line_info: self.logging.include_location,
            ..LogConfig::default()
        };
        let metrics = MetricsConfig {
            enabled: self.metrics.enabled,
            duration_buckets: self.metrics.duration_buckets.clone(),
            ..MetricsConfig::default()
        };

        let mut builder = TelemetryConfig::builder()
            .service_name(&self.service_name)
            .environment(&self.environment)
            .metrics(metrics)
            .logging(logging);
        if let Some(version) = &self.service_version {
            builder = builder.service_version(version);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariadne_auth::{codes, Entitlements, EntitlementsResolver};

    fn external() -> SharedResolver {
        Arc::new(EntitlementsResolvers::fixed(["ext"], Vec::<String>::new(), Vec::<String>::new()))
    }

    #[test]
    fn test_default_mode_denies() {
        let resolver = EntitlementsConfig::default()
            .build_resolver(None)
            .expect("deny_all needs nothing");
        let violations = resolver.resolve("anyone").expect_invalid("denied");
        assert_eq!(violations.first().name(), codes::ENTITLEMENTS_DENY);
    }

    #[test]
    fn test_fixed_mode() {
        let config = EntitlementsConfig {
            mode: EntitlementsMode::Fixed,
            roles: vec!["admin".into()],
            role_groups: vec!["ops".into()],
            authorities: vec!["WRITE".into()],
            ..EntitlementsConfig::default()
        };
        let granted = config
            .build_resolver(None)
            .expect("fixed needs nothing")
            .resolve("anyone")
            .expect_valid("granted");
        assert_eq!(granted, Entitlements::new(["admin"], ["ops"], ["WRITE"]));
    }

    #[test]
    fn test_read_only_mode_drops_groups() {
        let config = EntitlementsConfig {
            mode: EntitlementsMode::ReadOnly,
            roles: vec!["viewer".into()],
            ..EntitlementsConfig::default()
        };
        let granted = config
            .build_resolver(None)
            .expect("read-only needs nothing")
            .resolve("anyone")
            .expect_valid("granted");
        assert!(granted.role_groups.is_empty());
        assert!(granted.contains_role("viewer"));
    }

    #[test]
    fn test_external_mode_requires_resolver() {
        let config = EntitlementsConfig {
            mode: EntitlementsMode::External,
            ..EntitlementsConfig::default()
        };
        assert!(matches!(
            config.build_resolver(None),
            Err(ConfigError::MissingField { .. })
        ));

        let granted = config
            .build_resolver(Some(external()))
            .expect("external supplied")
            .resolve("anyone")
            .expect_valid("granted");
        assert!(granted.contains_role("ext"));
    }

    #[test]
    fn test_external_mode_with_cache() {
        let config = EntitlementsConfig {
            mode: EntitlementsMode::External,
            cache: EntitlementsCacheConfig {
                enabled: true,
                ..EntitlementsCacheConfig::default()
            },
            ..EntitlementsConfig::default()
        };
        let resolver = config.build_resolver(Some(external())).expect("external supplied");
        assert!(resolver.resolve("a").is_valid());
        assert!(resolver.resolve("a").is_valid());
    }

    #[test]
    fn test_cache_config_conversion() {
        assert_eq!(
            EntitlementsCacheConfig::default().to_cache_config(),
            CacheConfig::disabled()
        );
        let enabled = EntitlementsCacheConfig {
            enabled: true,
            ttl_secs: 60,
            max_entries: 5,
            cache_denies: true,
        };
        assert_eq!(
            enabled.to_cache_config(),
            CacheConfig {
                max_entries: 5,
                ttl: Duration::from_secs(60),
                cache_denies: true,
            }
        );
    }

    #[test]
    fn test_to_telemetry_config() {
        let section = TelemetryConfigSection {
            service_name: "item-search".to_string(),
            service_version: Some("2.1.0".to_string()),
            logging: LoggingConfig {
                format: LogFormat::Pretty,
                include_location: true,
                ..LoggingConfig::default()
            },
            ..TelemetryConfigSection::default()
        };
        let telemetry = section.to_telemetry_config();

        assert_eq!(telemetry.service_name, "item-search");
        assert_eq!(telemetry.service_version, "2.1.0");
        assert_eq!(telemetry.metrics.service_name, "item-search");
        assert_eq!(telemetry.logging.service_name, "item-search");
        assert!(!telemetry.logging.json_format);
        assert!(telemetry.logging.file_line_info);
    }

    #[test]
    fn test_auth_condition_from_toml() {
        let config: AuthBindingConfig =
            toml::from_str(r#"condition = "optional""#).expect("valid section");
        assert_eq!(config.condition(), AuthCondition::Optional);
        assert!(toml::from_str::<AuthBindingConfig>(r#"conditon = "optional""#).is_err());
    }
}
