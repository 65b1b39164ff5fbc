//! Entitlements and the resolver seam.

use ariadne_core::{Validation, Violations};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// What a principal is granted, independent of how it authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entitlements {
    /// Granted roles.
    pub roles: BTreeSet<String>,
    /// Granted role groups.
    pub role_groups: BTreeSet<String>,
    /// Granted authorities.
    pub authorities: BTreeSet<String>,
}

impl Entitlements {
    /// Builds entitlements from three string collections.
    #[must_use]
    pub fn new<R, G, A>(roles: R, role_groups: G, authorities: A) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            role_groups: role_groups.into_iter().map(Into::into).collect(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if the role is granted.
    #[must_use]
    pub fn contains_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns `true` if the authority is granted.
    #[must_use]
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    /// Returns `true` if the principal belongs to the role group.
    #[must_use]
    pub fn in_group(&self, group: &str) -> bool {
        self.role_groups.contains(group)
    }
}

/// Maps a principal id to its entitlements, or denies it.
///
/// Resolvers are shared across concurrently running flows and must be safe
/// to call from any thread. Implemented for closures of the matching shape
/// and for `Arc<R>`.
///
/// # Example
///
/// ```
/// use ariadne_auth::{Entitlements, EntitlementsResolver};
/// use ariadne_core::Validation;
///
/// let resolver = |pid: &str| Validation::valid(Entitlements::new([pid], ["staff"], ["READ"]));
/// let granted = resolver.resolve("alice").expect_valid("closure grants");
/// assert!(granted.contains_role("alice"));
/// ```
pub trait EntitlementsResolver: Send + Sync {
    /// Resolves the entitlements of `principal_id`.
    fn resolve(&self, principal_id: &str) -> Validation<Violations, Entitlements>;
}

impl<F> EntitlementsResolver for F
where
    F: Fn(&str) -> Validation<Violations, Entitlements> + Send + Sync,
{
    fn resolve(&self, principal_id: &str) -> Validation<Violations, Entitlements> {
        self(principal_id)
    }
}

impl<R: EntitlementsResolver + ?Sized> EntitlementsResolver for Arc<R> {
    fn resolve(&self, principal_id: &str) -> Validation<Violations, Entitlements> {
        (**self).resolve(principal_id)
    }
}

/// A shared, type-erased resolver.
pub type SharedResolver = Arc<dyn EntitlementsResolver>;
