//! Steps that observe how a flow runs them.

use ariadne_core::{StepContext, Validation, Violations};
use ariadne_flow::{BehaviorStep, StepResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A step that counts its invocations and then passes or fails.
///
/// Clones share the counter, so a clone can be handed to a flow while the
/// test keeps the original to read [`calls`](ProbeStep::calls).
#[derive(Debug, Clone)]
pub struct ProbeStep {
    name: String,
    failure: Option<Violations>,
    calls: Arc<AtomicUsize>,
}

impl ProbeStep {
    /// A probe that passes the context through unchanged.
    pub fn passing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A probe that fails with `violations`.
    pub fn failing(name: impl Into<String>, violations: Violations) -> Self {
        Self {
            failure: Some(violations),
            ..Self::passing(name)
        }
    }

    /// Number of times this probe (or a clone) has run.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns `true` if the probe never ran.
    pub fn never_called(&self) -> bool {
        self.calls() == 0
    }
}

impl<T> BehaviorStep<T> for ProbeStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: StepContext<T>) -> StepResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(violations) => Validation::invalid(violations.clone()),
            None => Validation::valid(ctx),
        }
    }
}

/// Records the order in which steps run.
///
/// ```
/// use ariadne_flow::Flow;
/// use ariadne_test::OrderRecorder;
///
/// let recorder = OrderRecorder::new();
/// let flow = Flow::builder("ordered")
///     .step(recorder.step("first"))
///     .step(recorder.step("second"))
///     .build();
///
/// flow.run_payload(()).expect_valid("recording steps pass");
/// assert_eq!(recorder.order(), ["first", "second"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrderRecorder {
    seen: Arc<Mutex<Vec<String>>>,
}

impl OrderRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A passing step that records `name` when it runs.
    pub fn step(&self, name: impl Into<String>) -> RecordingStep {
        RecordingStep {
            name: name.into(),
            seen: Arc::clone(&self.seen),
        }
    }

    /// Names recorded so far, in execution order.
    pub fn order(&self) -> Vec<String> {
        self.seen.lock().clone()
    }

    /// Forgets everything recorded.
    pub fn reset(&self) {
        self.seen.lock().clear();
    }
}

/// A step created by [`OrderRecorder::step`].
#[derive(Debug, Clone)]
pub struct RecordingStep {
    name: String,
    seen: Arc<Mutex<Vec<String>>>,
}

impl<T> BehaviorStep<T> for RecordingStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: StepContext<T>) -> StepResult<T> {
        self.seen.lock().push(self.name.clone());
        Validation::valid(ctx)
    }
}
