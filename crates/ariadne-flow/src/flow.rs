//! Named, fail-fast sequences of steps.
//!
//! A [`Flow`] is built once and evaluated many times. Steps run strictly in
//! the order they were added; the first `Invalid` ends the evaluation and is
//! returned untouched. A flow holds no per-evaluation state, so the same value
//! can be shared across threads and evaluated concurrently.
//!
//! ## Failure boundary
//!
//! A step that panics does not unwind out of [`Flow::run`]. The panic is
//! caught and reported as a `flow.step.panicked` violation naming the step.
//!
//! ## Observability
//!
//! Every evaluation runs inside a `flow` span carrying the flow name and the
//! request id. Step failures and the final outcome are logged at `debug` and
//! recorded in the `ariadne_step_failures_total`,
//! `ariadne_flow_evaluations_total` and `ariadne_flow_duration_seconds`
//! metrics.

use crate::boundary;
use crate::step::{BehaviorStep, BoxedStep, FnStep, StepResult};
use ariadne_core::{FailureClass, InboundEnvelope, StepContext, Validation, Violations};
use ariadne_telemetry::metrics as pipeline_metrics;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Violation code reported when a step panics.
pub const STEP_PANICKED: &str = "flow.step.panicked";

/// An immutable, ordered composition of steps.
///
/// # Example
///
/// ```
/// use ariadne_core::{AttrKey, StepContext, Validation, Violations};
/// use ariadne_flow::Flow;
///
/// const DOUBLED: AttrKey<u32> = AttrKey::of("demo.doubled");
///
/// let flow = Flow::builder("double-positive")
///     .step_fn("positive", |ctx: StepContext<u32>| {
///         Validation::valid(ctx).filter(
///             |c| *c.payload() > 0,
///             || Violations::violate("body.value.invalid", "value must be positive"),
///         )
///     })
///     .step_fn("double", |ctx: StepContext<u32>| {
///         let doubled = ctx.payload() * 2;
///         Validation::valid(ctx.with_attribute(&DOUBLED, doubled))
///     })
///     .build();
///
/// let ok = flow.run_payload(21).expect_valid("positive input");
/// assert_eq!(ok.find_attribute(&DOUBLED), Some(&42));
///
/// let err = flow.run_payload(0).expect_invalid("zero is rejected");
/// assert_eq!(err.first().name(), "body.value.invalid");
/// ```
pub struct Flow<T> {
    name: Arc<str>,
    steps: Arc<[BoxedStep<T>]>,
}

impl<T> Flow<T> {
    /// Creates a builder for a flow called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> FlowBuilder<T> {
        FlowBuilder::new(name)
    }

    /// Returns the flow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the step names in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the flow has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Evaluates the flow against `ctx`.
    ///
    /// An empty flow returns `ctx` unchanged.
    pub fn run(&self, ctx: StepContext<T>) -> StepResult<T> {
        let span = tracing::debug_span!(
            "flow",
            flow = %self.name,
            request_id = tracing::field::Empty,
        );
        if let Some(request_id) = ctx.request_id() {
            span.record("request_id", tracing::field::display(request_id));
        }
        let _entered = span.enter();

        let start = Instant::now();
        let result = self
            .steps
            .iter()
            .fold(Validation::valid(ctx), |acc, step| {
                acc.flat_map(|ctx| self.execute_step(step.as_ref(), ctx))
            });
        let elapsed = start.elapsed();

        let outcome = if result.is_valid() { "valid" } else { "invalid" };
        ariadne_telemetry::log_flow_complete!(self.name, outcome, elapsed.as_secs_f64() * 1000.0);
        pipeline_metrics::record_flow_evaluation(&self.name, result.is_valid(), elapsed);

        result
    }

    /// Seeds a context from `envelope` and evaluates the flow.
    pub fn run_envelope(&self, envelope: InboundEnvelope<T>) -> StepResult<T> {
        self.run(StepContext::from_envelope(envelope))
    }

    /// Seeds a context from a bare payload and evaluates the flow.
    pub fn run_payload(&self, payload: T) -> StepResult<T> {
        self.run(StepContext::new(payload))
    }

    fn execute_step(&self, step: &dyn BehaviorStep<T>, ctx: StepContext<T>) -> StepResult<T> {
        let result = match boundary::guard_panic(|| step.execute(ctx)) {
            Ok(result) => result,
            Err(fault) => {
                tracing::error!(flow = %self.name, step = step.name(), fault = %fault, "step panicked");
                Validation::invalid(Violations::violate(
                    STEP_PANICKED,
                    format!("Step '{}' failed: {fault}", step.name()),
                ))
            }
        };

        if let Some(violations) = result.get_invalid() {
            ariadne_telemetry::log_step_failure!(self.name, step.name(), violations);
            pipeline_metrics::record_step_failure(
                &self.name,
                step.name(),
                FailureClass::of(violations).as_str(),
            );
        }
        result
    }
}

impl<T> Clone for Flow<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            steps: Arc::clone(&self.steps),
        }
    }
}

impl<T> fmt::Debug for Flow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .finish()
    }
}

/// A flow is itself a step, so flows can be nested.
impl<T> BehaviorStep<T> for Flow<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: StepContext<T>) -> StepResult<T> {
        self.run(ctx)
    }
}

/// Builder for constructing a [`Flow`].
pub struct FlowBuilder<T> {
    name: String,
    steps: Vec<BoxedStep<T>>,
}

impl<T> FlowBuilder<T> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn step<S>(mut self, step: S) -> Self
    where
        S: BehaviorStep<T> + 'static,
    {
        self.steps.push(Arc::new(step));
        self
    }

    /// Appends an already shared step.
    #[must_use]
    pub fn step_arc(mut self, step: BoxedStep<T>) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends a named closure step.
    #[must_use]
    pub fn step_fn<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(StepContext<T>) -> StepResult<T> + Send + Sync + 'static,
    {
        self.step(FnStep::new(name, func))
    }

    /// Appends every step of another flow, flattened.
    #[must_use]
    pub fn steps_of(mut self, flow: &Flow<T>) -> Self {
        self.steps.extend(flow.steps.iter().cloned());
        self
    }

    /// Builds the flow.
    #[must_use]
    pub fn build(self) -> Flow<T> {
        tracing::trace!(flow = %self.name, steps = self.steps.len(), "flow built");
        Flow {
            name: Arc::from(self.name),
            steps: Arc::from(self.steps),
        }
    }
}
