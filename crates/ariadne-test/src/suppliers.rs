//! Ready-made [`AuthenticationSupplier`]s.

use ariadne_auth::{codes, Authentication, AuthenticationSupplier, UserDetails};
use ariadne_core::{Validation, Violations};

/// Always supplies `auth`.
pub fn fixed(auth: Authentication) -> impl AuthenticationSupplier + Clone {
    move || Validation::<Violations, Authentication>::valid(auth.clone())
}

/// Supplies an authenticated user account with the given authorities.
pub fn user<I, S>(username: &str, authorities: I) -> impl AuthenticationSupplier + Clone
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fixed(Authentication::user(UserDetails::new(username), authorities))
}

/// Supplies an anonymous authentication.
pub fn anonymous() -> impl AuthenticationSupplier + Clone {
    fixed(Authentication::anonymous())
}

/// Reports that no authentication is available (`auth.missing`).
pub fn missing() -> impl AuthenticationSupplier + Clone {
    || Validation::<Violations, Authentication>::invalid(codes::missing())
}

/// Always fails with `violations`.
pub fn failing(violations: Violations) -> impl AuthenticationSupplier + Clone {
    move || Validation::<Violations, Authentication>::invalid(violations.clone())
}
