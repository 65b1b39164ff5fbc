//! Structured failure records.
//!
//! A [`Violation`] names one reason a request could not proceed. Its `name` is
//! a dotted, hierarchical code (`auth.missing`, `path.invalid`) that callers
//! classify by prefix, so names are part of the external contract and must stay
//! stable. [`Violations`] is the non-empty aggregate carried by every failing
//! step.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single named failure reason.
///
/// # Example
///
/// ```
/// use ariadne_core::Violation;
///
/// let v = Violation::new("body.keyword.missing", "keyword is required");
/// assert!(v.has_prefix("body."));
/// assert_eq!(v.to_string(), "body.keyword.missing: keyword is required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted, hierarchical violation code.
    pub name: String,
    /// Human-readable diagnostic message.
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns the violation code.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the code starts with `prefix`.
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.name.starts_with(prefix)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// An ordered, non-empty collection of [`Violation`]s.
///
/// A failing step always produces at least one violation; the type has no
/// empty constructor. A single step may report several independent local
/// checks at once, but violations from different steps are never merged: the
/// first failing step's `Violations` is the result of the whole flow.
///
/// # Example
///
/// ```
/// use ariadne_core::{Violation, Violations};
///
/// let mut violations = Violations::violate("query.page.invalid", "page must be positive");
/// violations.push(Violation::new("query.size.invalid", "size must be at most 100"));
///
/// assert_eq!(violations.len(), 2);
/// assert!(violations.names_any_match(|name| name.starts_with("query.")));
/// assert_eq!(
///     violations.collect_messages(),
///     "page must be positive; size must be at most 100"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Violation>", into = "Vec<Violation>")]
pub struct Violations {
    items: Vec<Violation>,
}

impl Violations {
    /// Separator used by [`collect_messages`](Self::collect_messages).
    pub const MESSAGE_SEPARATOR: &'static str = "; ";

    /// Creates a collection holding a single violation.
    #[must_use]
    pub fn violate(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::single(Violation::new(name, message))
    }

    /// Creates a collection from one violation.
    #[must_use]
    pub fn single(violation: Violation) -> Self {
        Self {
            items: vec![violation],
        }
    }

    /// Creates a collection from a first violation and any further ones.
    #[must_use]
    pub fn of(first: Violation, rest: impl IntoIterator<Item = Violation>) -> Self {
        let mut items = vec![first];
        items.extend(rest);
        Self { items }
    }

    /// Builds a collection from a vector, returning `None` when it is empty.
    #[must_use]
    pub fn try_from_vec(items: Vec<Violation>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self { items })
        }
    }

    /// Appends a violation.
    pub fn push(&mut self, violation: Violation) {
        self.items.push(violation);
    }

    /// Appends every violation of `other`, keeping order.
    ///
    /// Intended for accumulating independent checks inside one step.
    pub fn extend(&mut self, other: Violations) {
        self.items.extend(other.items);
    }

    /// Returns the first violation.
    #[must_use]
    pub fn first(&self) -> &Violation {
        // non-empty by construction
        &self.items[0]
    }

    /// Returns the number of violations (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`; present for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the violations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.items.iter()
    }

    /// Returns the violation codes in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(Violation::name).collect()
    }

    /// Returns `true` if any violation code satisfies `predicate`.
    pub fn names_any_match<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&str) -> bool,
    {
        self.items.iter().any(|v| predicate(&v.name))
    }

    /// Returns `true` if any violation code starts with `prefix`.
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.names_any_match(|name| name.starts_with(prefix))
    }

    /// Returns `true` if a violation with exactly this code is present.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.names_any_match(|n| n == name)
    }

    /// Joins all messages for display.
    #[must_use]
    pub fn collect_messages(&self) -> String {
        self.items
            .iter()
            .map(Violation::message)
            .collect::<Vec<_>>()
            .join(Self::MESSAGE_SEPARATOR)
    }

    /// Consumes the collection and returns the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Violation> {
        self.items
    }
}

impl From<Violation> for Violations {
    fn from(violation: Violation) -> Self {
        Self::single(violation)
    }
}

impl TryFrom<Vec<Violation>> for Violations {
    type Error = EmptyViolations;

    fn try_from(items: Vec<Violation>) -> Result<Self, Self::Error> {
        Self::try_from_vec(items).ok_or(EmptyViolations)
    }
}

impl From<Violations> for Vec<Violation> {
    fn from(violations: Violations) -> Self {
        violations.items
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(Self::MESSAGE_SEPARATOR)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Returned when building [`Violations`] from an empty list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("violations must contain at least one entry")]
pub struct EmptyViolations;
