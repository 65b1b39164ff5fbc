//! The success-or-failure container threaded through every step.
//!
//! [`Validation`] is deliberately close to [`Result`], but keeps the
//! vocabulary of the pipeline (`Valid` / `Invalid`) and adds the two
//! operations the pipeline is built from: [`filter`](Validation::filter) for
//! preconditions and [`fold`](Validation::fold) for eliminating both branches
//! at the presentation edge.
//!
//! `flat_map` is the only sequencing mechanism. It satisfies the monad laws:
//!
//! - left identity: `Validation::valid(v).flat_map(f) == f(v)`
//! - right identity: `m.flat_map(Validation::valid) == m`
//! - short-circuit: `Validation::invalid(e).flat_map(f) == Validation::invalid(e)`
//!   and `f` is never called.

use crate::violation::Violations;

/// A success value `Valid(T)` or a failure `Invalid(E)`.
///
/// # Example
///
/// ```
/// use ariadne_core::{Validation, Violations};
///
/// let page: Validation<Violations, u32> = Validation::valid(3);
/// let checked = page.filter(
///     |p| *p > 0,
///     || Violations::violate("query.page.invalid", "page must be positive"),
/// );
///
/// let rendered = checked.fold(|v| v.collect_messages(), |p| format!("page {p}"));
/// assert_eq!(rendered, "page 3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[must_use = "a Validation may be Invalid and must be handled"]
pub enum Validation<E, T> {
    /// The computation succeeded.
    Valid(T),
    /// The computation failed.
    Invalid(E),
}

impl<E, T> Validation<E, T> {
    /// Wraps a success value.
    pub const fn valid(value: T) -> Self {
        Self::Valid(value)
    }

    /// Wraps a failure value.
    pub const fn invalid(error: E) -> Self {
        Self::Invalid(error)
    }

    /// Returns `true` for `Valid`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns `true` for `Invalid`.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Transforms the success value; failures pass through unchanged.
    pub fn map<U, F>(self, f: F) -> Validation<E, U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Valid(value) => Validation::Valid(f(value)),
            Self::Invalid(error) => Validation::Invalid(error),
        }
    }

    /// Transforms the failure value; successes pass through unchanged.
    pub fn map_invalid<E2, F>(self, f: F) -> Validation<E2, T>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Valid(value) => Validation::Valid(value),
            Self::Invalid(error) => Validation::Invalid(f(error)),
        }
    }

    /// Sequences a dependent computation, short-circuiting on failure.
    pub fn flat_map<U, F>(self, f: F) -> Validation<E, U>
    where
        F: FnOnce(T) -> Validation<E, U>,
    {
        match self {
            Self::Valid(value) => f(value),
            Self::Invalid(error) => Validation::Invalid(error),
        }
    }

    /// Alias of [`flat_map`](Self::flat_map) matching [`Result::and_then`].
    pub fn and_then<U, F>(self, f: F) -> Validation<E, U>
    where
        F: FnOnce(T) -> Validation<E, U>,
    {
        self.flat_map(f)
    }

    /// Demotes a success to `Invalid(failure())` when `predicate` rejects it.
    ///
    /// `failure` is only invoked when the predicate fails.
    pub fn filter<P, F>(self, predicate: P, failure: F) -> Self
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce() -> E,
    {
        match self {
            Self::Valid(value) if predicate(&value) => Self::Valid(value),
            Self::Valid(_) => Self::Invalid(failure()),
            Self::Invalid(error) => Self::Invalid(error),
        }
    }

    /// Eliminates both branches into a common type.
    pub fn fold<R, FI, FV>(self, on_invalid: FI, on_valid: FV) -> R
    where
        FI: FnOnce(E) -> R,
        FV: FnOnce(T) -> R,
    {
        match self {
            Self::Valid(value) => on_valid(value),
            Self::Invalid(error) => on_invalid(error),
        }
    }

    /// Borrows the success value, if any.
    #[must_use]
    pub const fn get(&self) -> Option<&T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }

    /// Borrows the failure value, if any.
    #[must_use]
    pub const fn get_invalid(&self) -> Option<&E> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(error) => Some(error),
        }
    }

    /// Converts to a borrowed `Validation<&E, &T>`.
    pub const fn as_ref(&self) -> Validation<&E, &T> {
        match self {
            Self::Valid(value) => Validation::Valid(value),
            Self::Invalid(error) => Validation::Invalid(error),
        }
    }

    /// Converts into the standard library's [`Result`].
    pub fn into_result(self) -> Result<T, E> {
        self.into()
    }

    /// Returns the success value.
    ///
    /// Trusted accessor for tests and code paths that have already checked
    /// the branch; request handling must use [`fold`](Self::fold) instead.
    ///
    /// # Panics
    ///
    /// Panics with `msg` if the value is `Invalid`.
    #[track_caller]
    pub fn expect_valid(self, msg: &str) -> T
    where
        E: std::fmt::Debug,
    {
        match self {
            Self::Valid(value) => value,
            Self::Invalid(error) => panic!("{msg}: {error:?}"),
        }
    }

    /// Returns the failure value.
    ///
    /// Trusted accessor for tests; see [`expect_valid`](Self::expect_valid).
    ///
    /// # Panics
    ///
    /// Panics with `msg` if the value is `Valid`.
    #[track_caller]
    pub fn expect_invalid(self, msg: &str) -> E
    where
        T: std::fmt::Debug,
    {
        match self {
            Self::Valid(value) => panic!("{msg}: {value:?}"),
            Self::Invalid(error) => error,
        }
    }
}

impl<T> Validation<Violations, T> {
    /// Pairs two independent results, accumulating violations from both.
    ///
    /// This is the within-step accumulation primitive: a step that checks
    /// several fields can report every failure at once. Composition across
    /// steps remains fail-fast through [`flat_map`](Self::flat_map).
    ///
    /// # Example
    ///
    /// ```
    /// use ariadne_core::{Validation, Violations};
    ///
    /// let page: Validation<Violations, u32> =
    ///     Validation::invalid(Violations::violate("body.paging.page", "page must be positive"));
    /// let size: Validation<Violations, u32> =
    ///     Validation::invalid(Violations::violate("body.paging.size", "size too large"));
    ///
    /// let both = page.and(size).expect_invalid("both checks fail");
    /// assert_eq!(both.len(), 2);
    /// ```
    pub fn and<U>(self, other: Validation<Violations, U>) -> Validation<Violations, (T, U)> {
        match (self, other) {
            (Self::Valid(a), Validation::Valid(b)) => Validation::Valid((a, b)),
            (Self::Invalid(e), Validation::Valid(_)) | (Self::Valid(_), Validation::Invalid(e)) => {
                Validation::Invalid(e)
            }
            (Self::Invalid(mut e1), Validation::Invalid(e2)) => {
                e1.extend(e2);
                Validation::Invalid(e1)
            }
        }
    }
}

impl<E, T> From<Result<T, E>> for Validation<E, T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Valid(value),
            Err(error) => Self::Invalid(error),
        }
    }
}

impl<E, T> From<Validation<E, T>> for Result<T, E> {
    fn from(validation: Validation<E, T>) -> Self {
        match validation {
            Validation::Valid(value) => Ok(value),
            Validation::Invalid(error) => Err(error),
        }
    }
}
