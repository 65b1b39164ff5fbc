//! The per-request identity derived from an authentication.

use crate::authentication::Authentication;
use crate::extract;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identity and authorization facts for the current request.
///
/// Derived, not authoritative: it is recomputed from the authentication on
/// every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    /// The principal id.
    pub principal_id: String,
    /// All granted authorities.
    pub authorities: BTreeSet<String>,
    /// Roles (`ROLE_` authorities, prefix stripped).
    pub roles: BTreeSet<String>,
    /// Role groups (`SCOPE_` authorities, prefix stripped).
    pub role_groups: BTreeSet<String>,
}

impl AuthContext {
    /// Derives the context from an authentication.
    #[must_use]
    pub fn from_authentication(auth: &Authentication) -> Self {
        let authorities = extract::authorities(auth);
        let roles = extract::roles_from_authorities(&authorities);
        let role_groups = extract::scopes_from_authorities(&authorities);
        Self {
            principal_id: extract::principal_id(auth),
            authorities,
            roles,
            role_groups,
        }
    }

    /// Returns `true` if the principal has the (unprefixed) role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Whether a flow insists on an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthCondition {
    /// Missing or anonymous callers fail the flow.
    #[default]
    Required,
    /// Missing or anonymous callers pass through unbound.
    Optional,
}

impl AuthCondition {
    /// [`AuthCondition::Required`].
    #[must_use]
    pub const fn required() -> Self {
        Self::Required
    }

    /// [`AuthCondition::Optional`].
    #[must_use]
    pub const fn optional() -> Self {
        Self::Optional
    }

    /// Returns `true` for [`AuthCondition::Required`].
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Required)
    }
}

impl fmt::Display for AuthCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Required => "required",
            Self::Optional => "optional",
        })
    }
}
