//! A thread-scoped "current authentication".
//!
//! Hosts that verify the caller in a layer in front of the flow can publish
//! the result with [`scope`] and hand [`current_authentication`] to
//! [`bind_auth_context`](crate::bind_auth_context) as the supplier. Scopes
//! nest; the previous authentication is restored when a scope ends, even if
//! it unwinds.
//!
//! ```
//! use ariadne_auth::holder::{self, current_authentication};
//! use ariadne_auth::{Authentication, AuthenticationSupplier};
//!
//! assert!(current_authentication().authentication().is_invalid());
//!
//! let auth = Authentication::authenticated("alice", ["ROLE_user"]);
//! let name = holder::scope(auth, || {
//!     current_authentication()
//!         .authentication()
//!         .fold(|_| String::new(), |a| a.name().to_string())
//! });
//! assert_eq!(name, "alice");
//! ```

use crate::authentication::{Authentication, AuthenticationSupplier};
use crate::codes;
use ariadne_core::{Validation, Violations};
use std::cell::RefCell;

thread_local! {
    static CURRENT: RefCell<Option<Authentication>> = const { RefCell::new(None) };
}

struct Restore(Option<Authentication>);

impl Drop for Restore {
    fn drop(&mut self) {
        let previous = self.0.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

/// Runs `f` with `auth` as the current authentication of this thread.
pub fn scope<R>(auth: Authentication, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT.with(|current| current.borrow_mut().replace(auth));
    let _restore = Restore(previous);
    f()
}

/// Returns a copy of the current authentication, if any.
pub fn current() -> Option<Authentication> {
    CURRENT.with(|current| current.borrow().clone())
}

/// A supplier reading this thread's current authentication.
///
/// Yields `auth.missing` outside a [`scope`] and `auth.anonymous` for an
/// anonymous authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopedSupplier;

impl AuthenticationSupplier for ScopedSupplier {
    fn authentication(&self) -> Validation<Violations, Authentication> {
        current()
            .map_or_else(|| Validation::invalid(codes::missing()), Validation::valid)
            .flat_map(Authentication::require_authenticated)
    }
}

/// Returns the [`ScopedSupplier`].
#[must_use]
pub const fn current_authentication() -> ScopedSupplier {
    ScopedSupplier
}
