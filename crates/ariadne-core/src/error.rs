//! Error types for programming errors in the attribute store.
//!
//! Request-level failures never use these types; they travel as
//! [`Violations`](crate::Violations) inside a [`Validation`](crate::Validation).
//! An [`AttrError`] means two parts of the program disagree about what an
//! attribute name holds.

use thiserror::Error;

/// Result type alias using [`AttrError`].
pub type AttrResult<T> = Result<T, AttrError>;

/// Errors raised when reading attributes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttrError {
    /// The stored value's type does not match the key's type.
    ///
    /// Happens when two keys share a name but disagree on the value type.
    #[error("attribute '{name}' holds {found}, but the key expects {expected}")]
    TypeMismatch {
        /// Attribute name.
        name: &'static str,
        /// Type the key was declared with.
        expected: &'static str,
        /// Type of the value actually stored.
        found: &'static str,
    },

    /// A required attribute was absent.
    #[error("attribute '{name}' is not present")]
    Missing {
        /// Attribute name.
        name: &'static str,
    },
}

impl AttrError {
    /// Creates a type mismatch error.
    #[must_use]
    pub const fn type_mismatch(
        name: &'static str,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            name,
            expected,
            found,
        }
    }

    /// Creates a missing attribute error.
    #[must_use]
    pub const fn missing(name: &'static str) -> Self {
        Self::Missing { name }
    }

    /// Returns the attribute name involved.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TypeMismatch { name, .. } | Self::Missing { name } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_display() {
        let err = AttrError::type_mismatch("item-search.result", "u32", "alloc::string::String");
        assert_eq!(
            err.to_string(),
            "attribute 'item-search.result' holds alloc::string::String, but the key expects u32"
        );
        assert_eq!(err.name(), "item-search.result");
    }

    #[test]
    fn test_missing_display() {
        let err = AttrError::missing("auth.context");
        assert_eq!(err.to_string(), "attribute 'auth.context' is not present");
    }
}
