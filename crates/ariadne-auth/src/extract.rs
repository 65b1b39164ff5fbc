//! Pure functions deriving identity facts from an [`Authentication`].

use crate::authentication::{Authentication, Principal};
use std::collections::BTreeSet;

/// Prefix marking an authority as a role.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Prefix marking an authority as an OAuth scope.
pub const SCOPE_PREFIX: &str = "SCOPE_";

/// The principal id: the username for user accounts, otherwise the
/// authentication name.
#[must_use]
pub fn principal_id(auth: &Authentication) -> String {
    match auth.principal() {
        Principal::User(details) => details.username.clone(),
        Principal::Opaque => auth.name().to_string(),
    }
}

/// All granted authorities, deduplicated.
#[must_use]
pub fn authorities(auth: &Authentication) -> BTreeSet<String> {
    auth.granted_authorities().iter().cloned().collect()
}

fn stripped<'a>(
    authorities: impl IntoIterator<Item = &'a String>,
    prefix: &str,
) -> BTreeSet<String> {
    authorities
        .into_iter()
        .filter_map(|a| a.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
        .collect()
}

/// `ROLE_`-prefixed authorities with the prefix removed.
#[must_use]
pub fn roles_from_authorities<'a>(
    authorities: impl IntoIterator<Item = &'a String>,
) -> BTreeSet<String> {
    stripped(authorities, ROLE_PREFIX)
}

/// `SCOPE_`-prefixed authorities with the prefix removed.
#[must_use]
pub fn scopes_from_authorities<'a>(
    authorities: impl IntoIterator<Item = &'a String>,
) -> BTreeSet<String> {
    stripped(authorities, SCOPE_PREFIX)
}
