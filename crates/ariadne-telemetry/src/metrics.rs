//! Prometheus metrics for Ariadne flows.
//!
//! Recording goes through the `metrics` facade, so every function here is a
//! cheap no-op until a recorder is installed. [`init_metrics`] installs a
//! Prometheus recorder without an HTTP listener; the hosting service decides
//! how to expose [`MetricsRegistry::render`].
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `ariadne_flow_evaluations_total` | Counter | `flow`, `outcome` | Completed flow evaluations |
//! | `ariadne_flow_duration_seconds` | Histogram | `flow` | Flow evaluation latency |
//! | `ariadne_step_failures_total` | Counter | `flow`, `step`, `class` | Steps that returned `Invalid` |
//! | `ariadne_entitlements_resolutions_total` | Counter | `outcome` | Entitlement lookups |
//! | `ariadne_entitlements_cache_total` | Counter | `result` | Entitlement cache hits, misses, evictions |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Flow evaluation counter.
pub const FLOW_EVALUATIONS_TOTAL: &str = "ariadne_flow_evaluations_total";
/// Flow duration histogram.
pub const FLOW_DURATION_SECONDS: &str = "ariadne_flow_duration_seconds";
/// Step failure counter.
pub const STEP_FAILURES_TOTAL: &str = "ariadne_step_failures_total";
/// Entitlement resolution counter.
pub const ENTITLEMENTS_RESOLUTIONS_TOTAL: &str = "ariadne_entitlements_resolutions_total";
/// Entitlement cache counter.
pub const ENTITLEMENTS_CACHE_TOTAL: &str = "ariadne_entitlements_cache_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Value of the `service` label added to every metric.
    pub service_name: String,

    /// Histogram buckets for flow duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "ariadne".to_string(),
            // 100us .. 1s; flows are in-process and usually fast
            duration_buckets: vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ],
        }
    }
}

/// Handle for rendering collected metrics.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Wraps a Prometheus handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Returns the registry installed by [`init_metrics`], if any.
    #[must_use]
    pub fn global() -> Option<Self> {
        METRICS_HANDLE.get().cloned().map(Self::new)
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Builds a Prometheus builder configured from `config`.
///
/// Exposed so tests and embedders can build a local recorder instead of
/// installing a global one.
pub fn prometheus_builder(config: &MetricsConfig) -> TelemetryResult<PrometheusBuilder> {
    if config.duration_buckets.is_empty() {
        return Err(TelemetryError::InvalidConfig(
            "duration_buckets must not be empty".to_string(),
        ));
    }
    PrometheusBuilder::new()
        .add_global_label("service", config.service_name.clone())
        .set_buckets_for_metric(
            Matcher::Full(FLOW_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::InvalidConfig(e.to_string()))
}

/// Installs the global Prometheus recorder.
///
/// Returns `Ok(None)` when metrics are disabled.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }

    let handle = prometheus_builder(config)?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle.clone());
    register_metric_descriptions();

    Ok(Some(MetricsRegistry::new(handle)))
}

/// Renders metrics in Prometheus format, or `None` if not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers descriptions for all standard metrics.
pub fn register_metric_descriptions() {
    describe_counter!(
        FLOW_EVALUATIONS_TOTAL,
        "Total number of flow evaluations by outcome"
    );
    describe_histogram!(
        FLOW_DURATION_SECONDS,
        Unit::Seconds,
        "Flow evaluation duration in seconds"
    );
    describe_counter!(
        STEP_FAILURES_TOTAL,
        "Total number of steps that returned violations"
    );
    describe_counter!(
        ENTITLEMENTS_RESOLUTIONS_TOTAL,
        "Total entitlement resolutions by outcome"
    );
    describe_counter!(
        ENTITLEMENTS_CACHE_TOTAL,
        "Entitlement cache lookups by result"
    );
}

fn outcome_label(valid: bool) -> &'static str {
    if valid {
        "valid"
    } else {
        "invalid"
    }
}

/// Records a completed flow evaluation.
pub fn record_flow_evaluation(flow: &str, valid: bool, duration: Duration) {
    counter!(
        FLOW_EVALUATIONS_TOTAL,
        "flow" => flow.to_string(),
        "outcome" => outcome_label(valid)
    )
    .increment(1);

    histogram!(FLOW_DURATION_SECONDS, "flow" => flow.to_string()).record(duration.as_secs_f64());
}

/// Records a step that returned violations.
///
/// `class` is the failure class label (e.g. `authentication`).
pub fn record_step_failure(flow: &str, step: &str, class: &str) {
    counter!(
        STEP_FAILURES_TOTAL,
        "flow" => flow.to_string(),
        "step" => step.to_string(),
        "class" => class.to_string()
    )
    .increment(1);
}

/// Records an entitlement resolution.
pub fn record_entitlements_resolution(granted: bool) {
    counter!(
        ENTITLEMENTS_RESOLUTIONS_TOTAL,
        "outcome" => if granted { "granted" } else { "denied" }
    )
    .increment(1);
}

/// Entitlement cache events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    /// Served from the cache.
    Hit,
    /// Fetched from the source.
    Miss,
    /// An entry was dropped to make room.
    Eviction,
}

impl CacheEvent {
    /// Returns the metric label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Eviction => "eviction",
        }
    }
}

/// Records an entitlement cache event.
pub fn record_entitlements_cache(event: CacheEvent) {
    counter!(ENTITLEMENTS_CACHE_TOTAL, "result" => event.as_str()).increment(1);
}
