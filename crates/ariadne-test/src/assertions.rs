//! Assertions over flow and step results.
//!
//! All helpers panic with a message naming what was expected and what was
//! found, and report the caller's location.

use ariadne_core::{FailureClass, StepContext, Validation, Violations};

/// Asserts that `result` is `Valid` and returns the context.
///
/// # Panics
///
/// Panics if `result` is `Invalid`, listing its violations.
#[track_caller]
pub fn assert_valid<T>(result: Validation<Violations, StepContext<T>>) -> StepContext<T> {
    match result {
        Validation::Valid(ctx) => ctx,
        Validation::Invalid(violations) => panic!(
            "Expected Valid, got Invalid: {}",
            violations.collect_messages()
        ),
    }
}

/// Asserts that `result` is `Invalid` and contains a violation named `name`.
///
/// Returns the violations for further checks.
///
/// # Panics
///
/// Panics if `result` is `Valid` or no violation has that name.
#[track_caller]
pub fn assert_invalid_with<T>(result: Validation<Violations, T>, name: &str) -> Violations {
    match result {
        Validation::Valid(_) => panic!("Expected Invalid with '{}', got Valid", name),
        Validation::Invalid(violations) => {
            assert!(
                violations.contains_name(name),
                "Expected violation '{}', got: {:?}",
                name,
                violations.names()
            );
            violations
        }
    }
}

/// Asserts that `result` is `Invalid` with exactly one violation named `name`.
///
/// # Panics
///
/// Panics otherwise.
#[track_caller]
pub fn assert_single_violation<T>(result: Validation<Violations, T>, name: &str) -> Violations {
    let violations = assert_invalid_with(result, name);
    assert_eq!(
        violations.len(),
        1,
        "Expected a single violation '{}', got: {:?}",
        name,
        violations.names()
    );
    violations
}

/// Asserts that `result` is `Invalid` and classifies as `class`.
///
/// # Panics
///
/// Panics if `result` is `Valid` or classifies differently.
#[track_caller]
pub fn assert_failure_class<T>(result: Validation<Violations, T>, class: FailureClass) -> Violations {
    match result {
        Validation::Valid(_) => panic!("Expected Invalid ({}), got Valid", class.as_str()),
        Validation::Invalid(violations) => {
            let actual = FailureClass::of(&violations);
            assert_eq!(
                actual,
                class,
                "Expected failure class '{}', got '{}' for {:?}",
                class.as_str(),
                actual.as_str(),
                violations.names()
            );
            violations
        }
    }
}
