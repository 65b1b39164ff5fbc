//! The authentication object supplied by the hosting environment.
//!
//! Ariadne never authenticates anyone. Whatever verified the caller (a JWT
//! filter, a session store, mTLS) turns its result into an
//! [`Authentication`] and exposes it through an [`AuthenticationSupplier`].

use crate::codes;
use ariadne_core::{Validation, Violations};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Account details of an interactive user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    /// Login name; used as the principal id.
    pub username: String,
    /// Whether the account is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl UserDetails {
    /// Creates enabled user details.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            enabled: true,
        }
    }
}

/// What the authentication object says about who the caller is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Principal {
    /// A user account.
    User(UserDetails),
    /// Any other principal (a token subject, a service id); only its
    /// authentication name is known.
    Opaque,
}

/// A verified (or anonymous) caller.
///
/// # Example
///
/// ```
/// use ariadne_auth::Authentication;
///
/// let auth = Authentication::authenticated("testUser", ["ROLE_user", "SCOPE_reports"]);
/// assert!(!auth.is_anonymous());
/// assert_eq!(auth.name(), "testUser");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    name: String,
    principal: Principal,
    authorities: Vec<String>,
    anonymous: bool,
}

impl Authentication {
    /// Creates an authentication for a named principal.
    #[must_use]
    pub fn authenticated<I, S>(name: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            principal: Principal::Opaque,
            authorities: authorities.into_iter().map(Into::into).collect(),
            anonymous: false,
        }
    }

    /// Creates an authentication for a user account.
    #[must_use]
    pub fn user<I, S>(details: UserDetails, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: details.username.clone(),
            principal: Principal::User(details),
            authorities: authorities.into_iter().map(Into::into).collect(),
            anonymous: false,
        }
    }

    /// Creates an anonymous authentication.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            name: "anonymousUser".to_string(),
            principal: Principal::Opaque,
            authorities: vec!["ROLE_ANONYMOUS".to_string()],
            anonymous: true,
        }
    }

    /// Returns the authentication name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the principal.
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns the raw granted authorities.
    #[must_use]
    pub fn granted_authorities(&self) -> &[String] {
        &self.authorities
    }

    /// Returns `true` for an anonymous caller.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Accepts only non-anonymous authentications.
    ///
    /// Anonymous callers become an `auth.anonymous` violation.
    pub fn require_authenticated(self) -> Validation<Violations, Self> {
        Validation::valid(self).filter(|a| !a.is_anonymous(), codes::anonymous)
    }
}

/// Produces the current authentication.
///
/// Implemented for every `Fn() -> Validation<Violations, Authentication>`.
/// Returning `Invalid` with [`codes::AUTH_MISSING`] means "no authentication
/// available"; the binding step treats that specially under optional binding.
pub trait AuthenticationSupplier: Send + Sync {
    /// Returns the current authentication.
    fn authentication(&self) -> Validation<Violations, Authentication>;
}

impl<F> AuthenticationSupplier for F
where
    F: Fn() -> Validation<Violations, Authentication> + Send + Sync,
{
    fn authentication(&self) -> Validation<Violations, Authentication> {
        self()
    }
}

impl<S: AuthenticationSupplier + ?Sized> AuthenticationSupplier for Arc<S> {
    fn authentication(&self) -> Validation<Violations, Authentication> {
        (**self).authentication()
    }
}

/// A shared supplier.
pub type SharedSupplier = Arc<dyn AuthenticationSupplier>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_uses_username_as_name() {
        let auth = Authentication::user(UserDetails::new("alice"), ["ROLE_admin"]);
        assert_eq!(auth.name(), "alice");
        assert!(matches!(auth.principal(), Principal::User(u) if u.username == "alice"));
        assert_eq!(auth.granted_authorities(), ["ROLE_admin".to_string()]);
    }

    #[test]
    fn test_anonymous() {
        let auth = Authentication::anonymous();
        assert!(auth.is_anonymous());
        let violations = auth
            .require_authenticated()
            .expect_invalid("anonymous is rejected");
        assert_eq!(violations.first().name(), codes::AUTH_ANONYMOUS);
    }

    #[test]
    fn test_closure_supplier() {
        let supplier = || Validation::valid(Authentication::authenticated("svc", ["SCOPE_read"]));
        let auth = supplier.authentication().expect_valid("closure supplies");
        assert_eq!(auth.name(), "svc");
    }

    #[test]
    fn test_serde_round_trip_shape() {
        let auth = Authentication::user(UserDetails::new("bob"), ["ROLE_user"]);
        let json = serde_json::to_value(&auth).expect("serializes");
        assert_eq!(json["principal"]["type"], "user");
        assert_eq!(json["principal"]["username"], "bob");
        assert_eq!(json["anonymous"], false);
    }
}
