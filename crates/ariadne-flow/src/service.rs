//! Adapters that lift caller-supplied logic into steps.
//!
//! A service step has two halves: an *extractor* that derives the request
//! the operation needs from the payload and earlier attributes, and an
//! *operation* that computes a result. The result is stored under an
//! [`AttrKey`] for later steps or the presentation layer.
//!
//! Both halves run inside the failure boundary of [`crate::boundary`]:
//!
//! | Failure | Violation name | Message |
//! |---|---|---|
//! | extractor error or panic | `service.request.extract.failed` | `Service request extraction failed: <Kind>[: <msg>]` |
//! | operation error or panic | `service.step.failed` | `Service operation failed: <Kind>[: <msg>]` |
//!
//! `<Kind>` is the unqualified type name of the error, or `panic`.
//!
//! # Example
//!
//! ```
//! use ariadne_core::{AttrKey, StepContext};
//! use ariadne_flow::{service_step, BehaviorStep};
//!
//! const PAGE_COUNT: AttrKey<u32> = AttrKey::of("paging.count");
//!
//! let step = service_step(
//!     |total: &u32, _attrs: &ariadne_core::AttrView<'_>| Ok::<_, std::fmt::Error>(*total),
//!     |total: u32| Ok::<_, std::fmt::Error>(total.div_ceil(10)),
//!     PAGE_COUNT,
//! );
//!
//! let ctx = step.execute(StepContext::new(35)).expect_valid("no failures");
//! assert_eq!(ctx.find_attribute(&PAGE_COUNT), Some(&4));
//! ```

use crate::boundary::{self, Fault};
use crate::step::{step_fn, BehaviorStep, StepResult};
use ariadne_core::{AttrKey, AttrView, StepContext, Validation, Violations};
use std::fmt::Display;

/// Violation code for a failed extractor.
pub const EXTRACT_FAILED: &str = "service.request.extract.failed";

/// Violation code for a failed operation.
pub const OPERATION_FAILED: &str = "service.step.failed";

/// Violation code used by [`require`] when the caller supplies none.
pub const PRECONDITION_FAILED: &str = "precondition.failed";

fn extract_violation(step: &str, fault: &Fault) -> Violations {
    tracing::warn!(step, fault = %fault, "service request extraction failed");
    Violations::violate(
        EXTRACT_FAILED,
        format!("Service request extraction failed: {fault}"),
    )
}

fn operation_violation(step: &str, fault: &Fault) -> Violations {
    tracing::warn!(step, fault = %fault, "service operation failed");
    Violations::violate(OPERATION_FAILED, format!("Service operation failed: {fault}"))
}

fn default_name<R>(key: &AttrKey<R>) -> String {
    format!("service:{}", key.name())
}

/// Lifts an extractor and a fallible operation into a step.
///
/// On success the operation's result is stored under `key`.
pub fn service_step<T, C, R, X, XE, O, OE>(
    extractor: X,
    operation: O,
    key: AttrKey<R>,
) -> impl BehaviorStep<T>
where
    X: Fn(&T, &AttrView<'_>) -> Result<C, XE> + Send + Sync,
    XE: Display,
    O: Fn(C) -> Result<R, OE> + Send + Sync,
    OE: Display,
    R: Send + Sync + 'static,
{
    let name = default_name(&key);
    step_fn(name.clone(), move |ctx: StepContext<T>| {
        let request = match boundary::guard(|| extractor(ctx.payload(), &ctx.attr_view())) {
            Ok(request) => request,
            Err(fault) => return Validation::invalid(extract_violation(&name, &fault)),
        };
        match boundary::guard(|| operation(request)) {
            Ok(result) => Validation::valid(ctx.with_attribute(&key, result)),
            Err(fault) => Validation::invalid(operation_violation(&name, &fault)),
        }
    })
}

/// Like [`service_step`], but the operation validates its own input.
///
/// An `Invalid` from the operation is returned untouched; only its panics are
/// converted.
pub fn service_validation_step<T, C, R, X, XE, O>(
    extractor: X,
    operation: O,
    key: AttrKey<R>,
) -> impl BehaviorStep<T>
where
    X: Fn(&T, &AttrView<'_>) -> Result<C, XE> + Send + Sync,
    XE: Display,
    O: Fn(C) -> Validation<Violations, R> + Send + Sync,
    R: Send + Sync + 'static,
{
    let name = default_name(&key);
    step_fn(name.clone(), move |ctx: StepContext<T>| {
        let request = match boundary::guard(|| extractor(ctx.payload(), &ctx.attr_view())) {
            Ok(request) => request,
            Err(fault) => return Validation::invalid(extract_violation(&name, &fault)),
        };
        match boundary::guard_panic(|| operation(request)) {
            Ok(validated) => validated.map(|result| ctx.with_attribute(&key, result)),
            Err(fault) => Validation::invalid(operation_violation(&name, &fault)),
        }
    })
}

/// A validating operation over the payload alone.
pub fn payload_service_step<T, R, O>(operation: O, key: AttrKey<R>) -> impl BehaviorStep<T>
where
    O: Fn(&T) -> Validation<Violations, R> + Send + Sync,
    R: Send + Sync + 'static,
{
    let name = default_name(&key);
    step_fn(name.clone(), move |ctx: StepContext<T>| {
        match boundary::guard_panic(|| operation(ctx.payload())) {
            Ok(validated) => validated.map(|result| ctx.with_attribute(&key, result)),
            Err(fault) => Validation::invalid(operation_violation(&name, &fault)),
        }
    })
}

/// A precondition step.
///
/// When `predicate` rejects the context, `violations` builds the failure from
/// that same context, so messages can mention what was found. A panic in
/// either callback becomes a [`PRECONDITION_FAILED`] violation.
pub fn require<T, P, V>(predicate: P, violations: V) -> impl BehaviorStep<T>
where
    P: Fn(&StepContext<T>) -> bool + Send + Sync,
    V: Fn(&StepContext<T>) -> Violations + Send + Sync,
{
    step_fn("require", move |ctx: StepContext<T>| {
        let outcome = boundary::guard_panic(|| {
            if predicate(&ctx) {
                None
            } else {
                Some(violations(&ctx))
            }
        });
        match outcome {
            Ok(None) => Validation::valid(ctx),
            Ok(Some(violations)) => Validation::invalid(violations),
            Err(fault) => Validation::invalid(Violations::violate(
                PRECONDITION_FAILED,
                format!("Precondition check failed: {fault}"),
            )),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariadne_core::Violation;

    #[derive(Debug)]
    struct NotFound(String);

    impl Display for NotFound {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "no item {}", self.0)
        }
    }

    const PREFIX: AttrKey<String> = AttrKey::of("test.prefix");
    const ANSWER: AttrKey<usize> = AttrKey::of("test.answer");

    fn ctx(payload: &str) -> StepContext<String> {
        StepContext::new(payload.to_string()).with_attribute(&PREFIX, "item-".to_string())
    }

    #[test]
    fn test_service_step_uses_payload_and_attributes() {
        let step = service_step(
            |payload: &String, attrs: &AttrView<'_>| {
                attrs
                    .require(&PREFIX)
                    .map(|prefix| format!("{prefix}{payload}"))
            },
            |id: String| Ok::<_, NotFound>(id.len()),
            ANSWER,
        );
        assert_eq!(step.name(), "service:test.answer");

        let out = step.execute(ctx("abc")).expect_valid("extract and operate");
        assert_eq!(out.find_attribute(&ANSWER), Some(&8));
    }

    #[test]
    fn test_extractor_error_becomes_violation() {
        let step = service_step(
            |_: &String, _: &AttrView<'_>| Err::<String, _>(NotFound("7".into())),
            |_: String| -> Result<usize, NotFound> { unreachable!("operation must not run") },
            ANSWER,
        );
        let violations = step.execute(ctx("x")).expect_invalid("extractor fails");
        assert_eq!(
            violations.first(),
            &Violation::new(EXTRACT_FAILED, "Service request extraction failed: NotFound: no item 7")
        );
    }

    #[test]
    fn test_operation_error_becomes_violation() {
        let step = service_step(
            |payload: &String, _: &AttrView<'_>| Ok::<_, NotFound>(payload.clone()),
            |id: String| Err::<usize, _>(NotFound(id)),
            ANSWER,
        );
        let violations = step.execute(ctx("42")).expect_invalid("operation fails");
        assert_eq!(violations.first().name(), OPERATION_FAILED);
        assert_eq!(
            violations.first().message(),
            "Service operation failed: NotFound: no item 42"
        );
    }

    #[test]
    fn test_operation_panic_becomes_violation() {
        let step = service_step(
            |payload: &String, _: &AttrView<'_>| Ok::<_, NotFound>(payload.clone()),
            |_: String| -> Result<usize, NotFound> { panic!("index out of range") },
            ANSWER,
        );
        let violations = step.execute(ctx("x")).expect_invalid("panic is contained");
        assert_eq!(
            violations.first().message(),
            "Service operation failed: panic: index out of range"
        );
    }

    #[test]
    fn test_validation_step_propagates_invalid_untouched() {
        let step = service_validation_step(
            |payload: &String, _: &AttrView<'_>| Ok::<_, NotFound>(payload.clone()),
            |keyword: String| {
                Validation::valid(keyword).filter(
                    |k| k.len() >= 2,
                    || Violations::violate("body.keyword.short", "keyword too short"),
                ).map(|k| k.len())
            },
            ANSWER,
        );

        let violations = step.execute(ctx("a")).expect_invalid("too short");
        assert_eq!(violations, Violations::violate("body.keyword.short", "keyword too short"));

        let ok = step.execute(ctx("abcd")).expect_valid("long enough");
        assert_eq!(ok.find_attribute(&ANSWER), Some(&4));
    }

    #[test]
    fn test_payload_service_step() {
        let step = payload_service_step(|payload: &String| Validation::valid(payload.len()), ANSWER);
        let out = step.execute(ctx("hello")).expect_valid("always valid");
        assert_eq!(out.find_attribute(&ANSWER), Some(&5));
    }

    #[test]
    fn test_require_builds_violations_from_current_context() {
        let step = require(
            |c: &StepContext<String>| c.has_attribute(&ANSWER),
            |c: &StepContext<String>| {
                Violations::violate(
                    "body.answer.missing",
                    format!("answer was required for '{}' but missing", c.payload()),
                )
            },
        );

        let violations = step.execute(ctx("q1")).expect_invalid("no answer yet");
        assert_eq!(
            violations.first().message(),
            "answer was required for 'q1' but missing"
        );

        let ready = ctx("q1").with_attribute(&ANSWER, 1);
        assert!(step.execute(ready).is_valid());
    }

    #[test]
    fn test_require_contains_panics() {
        let step = require(
            |_: &StepContext<String>| -> bool { panic!("predicate bug") },
            |_: &StepContext<String>| Violations::violate("unused", "unused"),
        );
        let violations = step.execute(ctx("x")).expect_invalid("panic is contained");
        assert_eq!(violations.first().name(), PRECONDITION_FAILED);
    }
}
