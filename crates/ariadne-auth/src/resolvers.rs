//! Reference [`EntitlementsResolver`] implementations.

use crate::cache::{CacheConfig, CachedResolver};
use crate::codes;
use crate::entitlements::{Entitlements, EntitlementsResolver};
use ariadne_core::{Validation, Violations};

/// Constructors for the reference resolvers.
///
/// ```
/// use ariadne_auth::{EntitlementsResolver, EntitlementsResolvers};
///
/// let denied = EntitlementsResolvers::deny_all().resolve("anyone");
/// assert!(denied.is_invalid());
///
/// let fixed = EntitlementsResolvers::fixed(["user"], ["staff"], ["READ"]);
/// assert!(fixed.resolve("anyone").expect_valid("fixed grants").in_group("staff"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EntitlementsResolvers;

impl EntitlementsResolvers {
    /// Denies every principal with `auth-binding.entitlements.deny`.
    #[must_use]
    pub fn deny_all() -> impl EntitlementsResolver + Clone {
        |_: &str| Validation::<Violations, Entitlements>::invalid(codes::entitlements_denied())
    }

    /// Grants the same roles and authorities to everyone, with no groups.
    #[must_use]
    pub fn read_only<R, A>(roles: R, authorities: A) -> impl EntitlementsResolver + Clone
    where
        R: IntoIterator,
        R::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self::grant(Entitlements::new(roles, std::iter::empty::<String>(), authorities))
    }

    /// Grants the same entitlements to everyone.
    #[must_use]
    pub fn fixed<R, G, A>(roles: R, role_groups: G, authorities: A) -> impl EntitlementsResolver + Clone
    where
        R: IntoIterator,
        R::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self::grant(Entitlements::new(roles, role_groups, authorities))
    }

    /// Grants exactly `entitlements` to everyone.
    #[must_use]
    pub fn grant(entitlements: Entitlements) -> impl EntitlementsResolver + Clone {
        move |_: &str| Validation::<Violations, Entitlements>::valid(entitlements.clone())
    }

    /// Delegates to an external lookup (a directory, a database, a service).
    ///
    /// The source's answer, including its denials, is returned unchanged.
    #[must_use]
    pub fn read_from<S: EntitlementsResolver>(source: S) -> S {
        source
    }

    /// Puts a [`CachedResolver`] in front of an external lookup.
    #[must_use]
    pub fn cached<S: EntitlementsResolver>(source: S, config: CacheConfig) -> CachedResolver<S> {
        CachedResolver::new(source, config)
    }
}
