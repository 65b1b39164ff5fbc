//! Failure boundary around caller-supplied callbacks.
//!
//! Extractors and operations come from outside the pipeline. Their errors
//! and panics are captured here as a [`Fault`] so a flow evaluation can only
//! ever end in `Valid` or `Invalid`.
//!
//! Panics are only catchable when the binary is built with `panic = "unwind"`
//! (the default). Under `panic = "abort"` a panicking callback still aborts
//! the process.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Kind reported for a caught panic.
pub const PANIC_KIND: &str = "panic";

/// A captured callback failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    kind: String,
    message: Option<String>,
}

impl Fault {
    /// Creates a fault from a returned error value.
    pub fn from_error<E: fmt::Display>(error: &E) -> Self {
        let message = error.to_string();
        Self {
            kind: short_type_name::<E>().to_string(),
            message: (!message.is_empty()).then_some(message),
        }
    }

    /// Creates a fault from a panic payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .filter(|m| !m.is_empty());
        Self {
            kind: PANIC_KIND.to_string(),
            message,
        }
    }

    /// Returns the failure kind: the error's type name, or `panic`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the failure message, if non-empty.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns `true` if the fault was a panic.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        self.kind == PANIC_KIND
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.kind),
            None => f.write_str(&self.kind),
        }
    }
}

/// Runs a fallible callback, capturing both its error and any panic.
pub fn guard<R, E, F>(f: F) -> Result<R, Fault>
where
    E: fmt::Display,
    F: FnOnce() -> Result<R, E>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(Fault::from_error(&error)),
        Err(payload) => Err(Fault::from_panic(payload.as_ref())),
    }
}

/// Runs an infallible callback, capturing any panic.
pub fn guard_panic<R, F>(f: F) -> Result<R, Fault>
where
    F: FnOnce() -> R,
{
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| Fault::from_panic(payload.as_ref()))
}

/// Returns the unqualified name of `T`, without generic arguments.
///
/// `std::io::error::Error` becomes `Error`; `my::Wrapper<u8>` becomes `Wrapper`.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct LookupError(&'static str);

    impl fmt::Display for LookupError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<String>(), "String");
        assert_eq!(short_type_name::<std::io::Error>(), "Error");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
        assert_eq!(short_type_name::<u32>(), "u32");
    }

    #[test]
    fn test_guard_passes_success() {
        let result = guard(|| Ok::<_, LookupError>(5));
        assert_eq!(result, Ok(5));
    }

    #[test]
    fn test_guard_captures_error() {
        let fault = guard(|| Err::<(), _>(LookupError("no such item"))).unwrap_err();
        assert_eq!(fault.kind(), "LookupError");
        assert_eq!(fault.message(), Some("no such item"));
        assert_eq!(fault.to_string(), "LookupError: no such item");
        assert!(!fault.is_panic());
    }

    #[test]
    fn test_guard_omits_empty_message() {
        let fault = guard(|| Err::<(), _>(LookupError(""))).unwrap_err();
        assert_eq!(fault.to_string(), "LookupError");
    }

    #[test]
    fn test_guard_captures_str_panic() {
        let fault = guard(|| -> Result<(), LookupError> { panic!("boom") }).unwrap_err();
        assert!(fault.is_panic());
        assert_eq!(fault.to_string(), "panic: boom");
    }

    #[test]
    fn test_guard_panic_captures_formatted_panic() {
        let id = 7;
        let fault = guard_panic(|| -> u8 { panic!("item {id} vanished") }).unwrap_err();
        assert_eq!(fault.message(), Some("item 7 vanished"));
    }
}
