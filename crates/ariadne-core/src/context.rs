//! The immutable context threaded through a flow.
//!
//! A [`StepContext`] is created once per inbound unit of work and passed by
//! value from step to step. Adding an attribute never changes the context it
//! was called on; it returns a new one. Steps may therefore keep an earlier
//! context around (for example to build a diagnostic) without it drifting.

use crate::attr::{AttrKey, AttrView, Attributes};
use crate::envelope::{InboundEnvelope, InboundMeta, RequestId};
use crate::error::AttrError;
use std::fmt;
use std::sync::Arc;

/// Keys seeded by [`StepContext::from_envelope`].
pub mod keys {
    use crate::attr::AttrKey;
    use crate::envelope::{InboundMeta, RequestId};

    /// Metadata of the inbound envelope.
    pub const INBOUND_META: AttrKey<InboundMeta> = AttrKey::of("inbound.meta");

    /// Request id of the inbound envelope.
    pub const REQUEST_ID: AttrKey<RequestId> = AttrKey::of("inbound.request-id");
}

/// Payload plus typed attributes for one flow evaluation.
///
/// Cloning is cheap: the payload and every attribute value are shared.
///
/// # Example
///
/// ```
/// use ariadne_core::{AttrKey, StepContext};
///
/// const TOTAL: AttrKey<usize> = AttrKey::of("search.total");
///
/// let ctx = StepContext::new("abc".to_string());
/// let next = ctx.with_attribute(&TOTAL, 3);
///
/// assert_eq!(next.find_attribute(&TOTAL), Some(&3));
/// assert_eq!(ctx.find_attribute(&TOTAL), None);
/// assert_eq!(next.payload(), "abc");
/// ```
pub struct StepContext<T> {
    payload: Arc<T>,
    attributes: Attributes,
}

impl<T> StepContext<T> {
    /// Creates a context with no attributes.
    #[must_use]
    pub fn new(payload: T) -> Self {
        Self {
            payload: Arc::new(payload),
            attributes: Attributes::new(),
        }
    }

    /// Creates a context from an envelope.
    ///
    /// The envelope metadata and request id are stored under
    /// [`keys::INBOUND_META`] and [`keys::REQUEST_ID`].
    #[must_use]
    pub fn from_envelope(envelope: InboundEnvelope<T>) -> Self {
        let (payload, meta) = envelope.into_parts();
        let request_id = meta.request_id();
        let attributes = Attributes::new()
            .with(&keys::REQUEST_ID, request_id)
            .with(&keys::INBOUND_META, meta);
        Self {
            payload: Arc::new(payload),
            attributes,
        }
    }

    /// Returns the payload.
    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Returns a shared handle to the payload.
    #[must_use]
    pub fn payload_arc(&self) -> Arc<T> {
        Arc::clone(&self.payload)
    }

    /// Returns a new context with `key` set to `value`.
    ///
    /// An existing value under the same name is replaced in the new context
    /// only.
    #[must_use]
    pub fn with_attribute<V>(&self, key: &AttrKey<V>, value: V) -> Self
    where
        V: Send + Sync + 'static,
    {
        Self {
            payload: Arc::clone(&self.payload),
            attributes: self.attributes.with(key, value),
        }
    }

    /// Reads an attribute.
    ///
    /// A value stored under the same name with a different type is a
    /// programming error; it is logged and reported as absent. Use
    /// [`try_find_attribute`](Self::try_find_attribute) to observe it.
    #[must_use]
    pub fn find_attribute<V: 'static>(&self, key: &AttrKey<V>) -> Option<&V> {
        self.attributes.get(key)
    }

    /// Reads an attribute, surfacing type mismatches.
    pub fn try_find_attribute<V: 'static>(&self, key: &AttrKey<V>) -> Result<Option<&V>, AttrError> {
        self.attributes.try_get(key)
    }

    /// Returns the shared pointer to an attribute value.
    #[must_use]
    pub fn attribute_arc<V>(&self, key: &AttrKey<V>) -> Option<Arc<V>>
    where
        V: Send + Sync + 'static,
    {
        self.attributes.get_arc(key)
    }

    /// Returns `true` if the attribute is present.
    #[must_use]
    pub fn has_attribute<V: 'static>(&self, key: &AttrKey<V>) -> bool {
        self.attributes.contains(key)
    }

    /// Returns a read-only view of the attributes.
    #[must_use]
    pub const fn attr_view(&self) -> AttrView<'_> {
        AttrView::new(&self.attributes)
    }

    /// Returns the attribute names, sorted.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<&'static str> {
        self.attributes.names()
    }

    /// Returns the request id seeded from the envelope, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<RequestId> {
        self.find_attribute(&keys::REQUEST_ID).copied()
    }

    /// Returns the envelope metadata, if any.
    #[must_use]
    pub fn inbound_meta(&self) -> Option<&InboundMeta> {
        self.find_attribute(&keys::INBOUND_META)
    }
}

impl<T> Clone for StepContext<T> {
    fn clone(&self) -> Self {
        Self {
            payload: Arc::clone(&self.payload),
            attributes: self.attributes.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StepContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepContext")
            .field("payload", &self.payload)
            .field("attributes", &self.attributes)
            .finish()
    }
}
