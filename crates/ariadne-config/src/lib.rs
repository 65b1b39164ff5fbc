//! Typed configuration for Ariadne pipelines.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides and `.env` files
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`PipelineConfig`] holds three sections:
//!
//! - [`AuthBindingConfig`] - whether flows require an authenticated caller
//! - [`EntitlementsConfig`] - which entitlements resolver to build
//! - [`TelemetryConfigSection`] - logging and metrics
//!
//! Each section bridges to the runtime type it configures:
//! [`AuthBindingConfig::condition`], [`EntitlementsConfig::build_resolver`]
//! and [`TelemetryConfigSection::to_telemetry_config`].
//!
//! # Configuration File Format
//!
//! ```toml
//! [auth]
//! condition = "required"
//!
//! [entitlements]
//! mode = "external"
//!
//! [entitlements.cache]
//! enabled = true
//! ttl_secs = 60
//! max_entries = 50000
//! cache_denies = false
//!
//! [telemetry]
//! service_name = "item-search"
//! environment = "production"
//!
//! [telemetry.metrics]
//! enabled = true
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`:
//!
//! - `ARIADNE__AUTH__CONDITION=optional`
//! - `ARIADNE__ENTITLEMENTS__ROLES=admin,user`
//! - `ARIADNE__TELEMETRY__LOGGING__LEVEL=debug`

#![doc(html_root_url = "https://docs.rs/ariadne-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    AuthBindingConfig, EntitlementsCacheConfig, EntitlementsConfig, EntitlementsMode, LogFormat,
    LoggingConfig, MetricsSection, TelemetryConfigSection,
};
