//! Typed attribute keys and the type-erased attribute store.
//!
//! An [`AttrKey<T>`] is a process-wide constant that names one slot in a
//! [`StepContext`](crate::StepContext) and fixes the type stored there:
//!
//! ```
//! use ariadne_core::AttrKey;
//!
//! pub const SEARCH_RESULT: AttrKey<Vec<String>> = AttrKey::of("item-search.result");
//! assert_eq!(SEARCH_RESULT.name(), "item-search.result");
//! ```
//!
//! The store is keyed by name and holds values as `Arc<dyn Any + Send + Sync>`.
//! Reads downcast through the key; if two keys share a name but not a type the
//! read reports [`AttrError::TypeMismatch`] instead of returning the wrong
//! value. Key names are not checked for uniqueness when declared, so every
//! crate should prefix its names (`auth.`, `item-search.`) to keep them apart.

use crate::error::AttrError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// A named, type-tagged handle to one attribute.
///
/// Keys compare equal when both their names and their value types match.
pub struct AttrKey<T> {
    name: &'static str,
    // fn() -> T keeps the key Send + Sync and covariant regardless of T
    _marker: PhantomData<fn() -> T>,
}

impl<T> AttrKey<T> {
    /// Declares a key. Usable in `const` items.
    #[must_use]
    pub const fn of(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Returns the key name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: 'static> AttrKey<T> {
    /// Returns the `TypeId` of the value type.
    #[must_use]
    pub fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    /// Returns the value type's name, for diagnostics.
    #[must_use]
    pub fn value_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl<T> Clone for AttrKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AttrKey<T> {}

impl<T> fmt::Debug for AttrKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttrKey")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> fmt::Display for AttrKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl<T: 'static, U: 'static> PartialEq<AttrKey<U>> for AttrKey<T> {
    fn eq(&self, other: &AttrKey<U>) -> bool {
        self.name == other.name && TypeId::of::<T>() == TypeId::of::<U>()
    }
}

impl<T: 'static> Eq for AttrKey<T> {}

impl<T: 'static> Hash for AttrKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        TypeId::of::<T>().hash(state);
    }
}

#[derive(Clone)]
struct Slot {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// The type-erased backing store of a [`StepContext`](crate::StepContext).
///
/// `Attributes` is a plain value: cloning it copies the map of shared
/// pointers, never the stored values themselves.
#[derive(Clone, Default)]
pub struct Attributes {
    slots: HashMap<&'static str, Slot>,
}

impl Attributes {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this store with `key` set to `value`.
    #[must_use]
    pub fn with<T>(&self, key: &AttrKey<T>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        let mut next = self.clone();
        next.slots.insert(
            key.name,
            Slot {
                value: Arc::new(value),
                type_name: std::any::type_name::<T>(),
            },
        );
        next
    }

    /// Reads the value stored under `key`, checking its type.
    pub fn try_get<T: 'static>(&self, key: &AttrKey<T>) -> Result<Option<&T>, AttrError> {
        let Some(slot) = self.slots.get(key.name) else {
            return Ok(None);
        };
        slot.value.downcast_ref::<T>().map(Some).ok_or_else(|| {
            AttrError::type_mismatch(key.name, key.value_type_name(), slot.type_name)
        })
    }

    /// Reads the value stored under `key`.
    ///
    /// A type mismatch is logged at `error` level and reported as absent.
    pub fn get<T: 'static>(&self, key: &AttrKey<T>) -> Option<&T> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(attribute = key.name, error = %err, "attribute type mismatch");
                None
            }
        }
    }

    /// Returns the shared pointer to the value stored under `key`.
    pub fn get_arc<T>(&self, key: &AttrKey<T>) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let slot = self.slots.get(key.name)?;
        Arc::clone(&slot.value).downcast::<T>().ok()
    }

    /// Returns `true` if a value of the key's type is stored under its name.
    #[must_use]
    pub fn contains<T: 'static>(&self, key: &AttrKey<T>) -> bool {
        self.slots
            .get(key.name)
            .is_some_and(|slot| slot.value.is::<T>())
    }

    /// Returns the stored attribute names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.slots.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of stored attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.names() {
            if let Some(slot) = self.slots.get(name) {
                map.entry(&name, &slot.type_name);
            }
        }
        map.finish()
    }
}

/// Read-only access to the attributes of a context.
///
/// Extractors receive an `AttrView` rather than the context itself, so they
/// can consult earlier results but cannot add or replace any.
#[derive(Clone, Copy)]
pub struct AttrView<'a> {
    attributes: &'a Attributes,
}

impl<'a> AttrView<'a> {
    /// Creates a view over `attributes`.
    #[must_use]
    pub const fn new(attributes: &'a Attributes) -> Self {
        Self { attributes }
    }

    /// Reads the value stored under `key`.
    #[must_use]
    pub fn get<T: 'static>(&self, key: &AttrKey<T>) -> Option<&'a T> {
        self.attributes.get(key)
    }

    /// Reads the value stored under `key`, surfacing type mismatches.
    pub fn try_get<T: 'static>(&self, key: &AttrKey<T>) -> Result<Option<&'a T>, AttrError> {
        self.attributes.try_get(key)
    }

    /// Reads a value that must be present.
    pub fn require<T: 'static>(&self, key: &AttrKey<T>) -> Result<&'a T, AttrError> {
        self.try_get(key)?
            .ok_or_else(|| AttrError::missing(key.name()))
    }

    /// Returns `true` if the attribute is present with the key's type.
    #[must_use]
    pub fn contains<T: 'static>(&self, key: &AttrKey<T>) -> bool {
        self.attributes.contains(key)
    }
}

impl fmt::Debug for AttrView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttrView").field(self.attributes).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const COUNT: AttrKey<u32> = AttrKey::of("test.count");
    const COUNT_AS_TEXT: AttrKey<String> = AttrKey::of("test.count");
    const LABEL: AttrKey<String> = AttrKey::of("test.label");

    #[test]
    fn test_key_equality_needs_name_and_type() {
        assert_eq!(COUNT, AttrKey::<u32>::of("test.count"));
        assert_ne!(COUNT, COUNT_AS_TEXT);
        assert_ne!(COUNT_AS_TEXT, LABEL);
    }

    #[test]
    fn test_keys_hash_consistently() {
        let mut set = HashSet::new();
        set.insert(COUNT);
        set.insert(AttrKey::<u32>::of("test.count"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let empty = Attributes::new();
        let one = empty.with(&COUNT, 7);
        assert!(empty.is_empty());
        assert_eq!(one.get(&COUNT), Some(&7));
    }

    #[test]
    fn test_overwrite_same_key() {
        let attrs = Attributes::new().with(&COUNT, 1).with(&COUNT, 2);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get(&COUNT), Some(&2));
    }

    #[test]
    fn test_type_mismatch_detected_on_read() {
        let attrs = Attributes::new().with(&COUNT, 3);
        let err = attrs.try_get(&COUNT_AS_TEXT).unwrap_err();
        assert!(matches!(err, AttrError::TypeMismatch { name: "test.count", .. }));
        assert_eq!(attrs.get(&COUNT_AS_TEXT), None);
        assert!(!attrs.contains(&COUNT_AS_TEXT));
    }

    #[test]
    fn test_view_require() {
        let attrs = Attributes::new().with(&LABEL, "x".to_string());
        let view = AttrView::new(&attrs);
        assert_eq!(view.require(&LABEL).map(String::as_str), Ok("x"));
        assert_eq!(view.require(&COUNT), Err(AttrError::missing("test.count")));
    }

    #[test]
    fn test_names_sorted() {
        let attrs = Attributes::new()
            .with(&LABEL, String::new())
            .with(&COUNT, 0);
        assert_eq!(attrs.names(), vec!["test.count", "test.label"]);
    }

    #[test]
    fn test_get_arc_shares_value() {
        let attrs = Attributes::new().with(&LABEL, "shared".to_string());
        let a = attrs.get_arc(&LABEL).expect("present");
        let b = attrs.clone().get_arc(&LABEL).expect("present");
        assert!(Arc::ptr_eq(&a, &b));
    }
}
