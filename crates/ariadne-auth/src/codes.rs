//! Violation codes raised by the auth binding steps.
//!
//! The names are part of the external contract: presentation layers classify
//! failures by their prefixes (`auth.` is an authentication failure,
//! `auth-binding.entitlements.` an authorization failure).

use ariadne_core::Violations;

/// No authentication object is available.
pub const AUTH_MISSING: &str = "auth.missing";

/// The caller is anonymous.
pub const AUTH_ANONYMOUS: &str = "auth.anonymous";

/// The authentication supplier panicked.
pub const SUPPLIER_FAILED: &str = "auth.supplier.failed";

/// Deriving the auth context from the authentication panicked.
pub const CONTEXT_EXTRACT_FAILED: &str = "auth.ctx.extract.failed";

/// Entitlements were required but no auth context was bound.
pub const UNAUTHORIZED: &str = "auth-binding.unauthorized";

/// The entitlements resolver denied the principal.
pub const ENTITLEMENTS_DENY: &str = "auth-binding.entitlements.deny";

/// The entitlements resolver panicked.
pub const ENTITLEMENTS_FAILED: &str = "auth-binding.entitlements.failed";

/// `auth.missing`.
#[must_use]
pub fn missing() -> Violations {
    Violations::violate(AUTH_MISSING, "Authentication information is unavailable")
}

/// `auth.anonymous`.
#[must_use]
pub fn anonymous() -> Violations {
    Violations::violate(AUTH_ANONYMOUS, "Current user is anonymous")
}

/// `auth-binding.unauthorized`.
#[must_use]
pub fn unauthorized() -> Violations {
    Violations::violate(UNAUTHORIZED, "No auth context bound for entitlement resolution")
}

/// `auth-binding.entitlements.deny`.
#[must_use]
pub fn entitlements_denied() -> Violations {
    Violations::violate(ENTITLEMENTS_DENY, "FORBIDDEN")
}

/// Returns `true` when the violations only say that nobody is signed in.
///
/// Optional binding treats these as "no authentication" rather than a failure.
#[must_use]
pub fn is_absent(violations: &Violations) -> bool {
    violations
        .iter()
        .all(|v| v.name() == AUTH_MISSING || v.name() == AUTH_ANONYMOUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_absent() {
        assert!(is_absent(&missing()));
        assert!(is_absent(&anonymous()));
        assert!(!is_absent(&unauthorized()));

        let mut mixed = missing();
        mixed.extend(Violations::violate("auth.token.expired", "expired"));
        assert!(!is_absent(&mixed));
    }
}
