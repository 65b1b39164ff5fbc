//! Observability for Ariadne flows.
//!
//! - **Logging**: `tracing-subscriber` with JSON or pretty output
//! - **Metrics**: Prometheus-format metrics via the `metrics` crate
//!
//! Flows and resolvers record into the `metrics` facade unconditionally; until
//! [`init_telemetry`] (or [`init_metrics`]) installs a recorder those calls do
//! nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! use ariadne_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("item-search")
//!     .environment("production")
//!     .build();
//!
//! let telemetry = init_telemetry(&config)?;
//! if let Some(text) = telemetry.render_metrics() {
//!     println!("{text}");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use crate::config::{TelemetryConfig, TelemetryConfigBuilder};
pub use crate::error::TelemetryError;
pub use crate::logging::{init_logging, LogConfig};
pub use crate::metrics::{init_metrics, MetricsConfig, MetricsRegistry};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Handles returned by [`init_telemetry`].
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    metrics: Option<MetricsRegistry>,
}

impl Telemetry {
    /// Returns the metrics registry, if metrics are enabled.
    #[must_use]
    pub const fn metrics(&self) -> Option<&MetricsRegistry> {
        self.metrics.as_ref()
    }

    /// Renders metrics in Prometheus format, if metrics are enabled.
    #[must_use]
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(MetricsRegistry::render)
    }
}

/// Initializes logging, then metrics.
///
/// Both install process-wide state and fail if called twice.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<Telemetry> {
    init_logging(&config.logging)?;
    let metrics = init_metrics(&config.metrics)?;

    tracing::info!(
        service.name = %config.service_name,
        service.version = %config.service_version,
        environment = %config.environment,
        metrics = metrics.is_some(),
        "telemetry initialized"
    );

    Ok(Telemetry { metrics })
}
