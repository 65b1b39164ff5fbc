//! The behavior step trait and its combinators.
//!
//! A [`BehaviorStep`] turns one [`StepContext`] into either a new context or a
//! set of [`Violations`]. Steps never mutate shared state; whatever they learn
//! they add to the context they return.
//!
//! # Example
//!
//! ```
//! use ariadne_core::{AttrKey, StepContext, Validation, Violations};
//! use ariadne_flow::{step_fn, BehaviorStep, BehaviorStepExt};
//!
//! const LENGTH: AttrKey<usize> = AttrKey::of("keyword.length");
//!
//! let non_empty = step_fn("non-empty", |ctx: StepContext<String>| {
//!     Validation::valid(ctx).filter(
//!         |c| !c.payload().is_empty(),
//!         || Violations::violate("body.keyword.missing", "keyword is required"),
//!     )
//! });
//! let measure = step_fn("measure", |ctx: StepContext<String>| {
//!     let len = ctx.payload().len();
//!     Validation::valid(ctx.with_attribute(&LENGTH, len))
//! });
//!
//! let both = non_empty.then(measure);
//! let ctx = both.execute(StepContext::new("abc".to_string())).expect_valid("keyword present");
//! assert_eq!(ctx.find_attribute(&LENGTH), Some(&3));
//! ```

use ariadne_core::{StepContext, Validation, Violations};
use std::sync::Arc;

/// Result of executing a step.
pub type StepResult<T> = Validation<Violations, StepContext<T>>;

/// One unit of a flow.
///
/// # Invariants
///
/// - A step returns `Invalid` with at least one violation or `Valid` with a context
/// - A step does not retain or mutate state shared with other evaluations
pub trait BehaviorStep<T>: Send + Sync {
    /// Returns the step name, used in logs and metrics.
    fn name(&self) -> &str;

    /// Executes the step.
    fn execute(&self, ctx: StepContext<T>) -> StepResult<T>;
}

/// A type-erased step that can be stored in a flow.
pub type BoxedStep<T> = Arc<dyn BehaviorStep<T>>;

impl<T, S> BehaviorStep<T> for Arc<S>
where
    S: BehaviorStep<T> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute(&self, ctx: StepContext<T>) -> StepResult<T> {
        (**self).execute(ctx)
    }
}

impl<T, S> BehaviorStep<T> for Box<S>
where
    S: BehaviorStep<T> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute(&self, ctx: StepContext<T>) -> StepResult<T> {
        (**self).execute(ctx)
    }
}

/// A step backed by a closure.
///
/// Created with [`step_fn`].
pub struct FnStep<F> {
    name: String,
    func: F,
}

impl<F> FnStep<F> {
    /// Creates a named closure step.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<T, F> BehaviorStep<T> for FnStep<F>
where
    F: Fn(StepContext<T>) -> StepResult<T> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: StepContext<T>) -> StepResult<T> {
        (self.func)(ctx)
    }
}

impl<F> std::fmt::Debug for FnStep<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStep").field("name", &self.name).finish()
    }
}

/// Creates a named step from a closure.
pub fn step_fn<T, F>(name: impl Into<String>, func: F) -> FnStep<F>
where
    F: Fn(StepContext<T>) -> StepResult<T> + Send + Sync,
{
    FnStep::new(name, func)
}

/// Two steps run in sequence, the second only if the first succeeds.
pub struct Then<A, B> {
    name: String,
    first: A,
    second: B,
}

impl<T, A, B> BehaviorStep<T> for Then<A, B>
where
    A: BehaviorStep<T>,
    B: BehaviorStep<T>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: StepContext<T>) -> StepResult<T> {
        self.first
            .execute(ctx)
            .flat_map(|next| self.second.execute(next))
    }
}

/// A step with a replaced name.
pub struct Named<S> {
    name: String,
    inner: S,
}

impl<T, S> BehaviorStep<T> for Named<S>
where
    S: BehaviorStep<T>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: StepContext<T>) -> StepResult<T> {
        self.inner.execute(ctx)
    }
}

/// Combinators available on every step.
pub trait BehaviorStepExt<T>: BehaviorStep<T> + Sized {
    /// Runs `next` after this step, short-circuiting on failure.
    fn then<B>(self, next: B) -> Then<Self, B>
    where
        B: BehaviorStep<T>,
    {
        let name = format!("{} -> {}", self.name(), next.name());
        Then {
            name,
            first: self,
            second: next,
        }
    }

    /// Renames this step.
    fn named(self, name: impl Into<String>) -> Named<Self> {
        Named {
            name: name.into(),
            inner: self,
        }
    }

    /// Boxes this step for storage in a flow.
    fn boxed(self) -> BoxedStep<T>
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<T, S> BehaviorStepExt<T> for S where S: BehaviorStep<T> {}
