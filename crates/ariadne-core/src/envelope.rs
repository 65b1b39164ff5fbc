//! Inbound envelope types.
//!
//! An [`InboundEnvelope`] is what a transport adapter hands to a flow: the
//! decoded payload plus read-only request metadata. The core never parses
//! transport formats itself; [`InboundEnvelope::from_http`] only copies
//! header values out of an `http::Request` that a server has already built.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known metadata names.
pub mod headers {
    /// W3C trace context header.
    pub const TRACEPARENT: &str = "traceparent";
    /// Explicit trace id header.
    pub const TRACE_ID: &str = "x-trace-id";
    /// Request id header.
    pub const REQUEST_ID: &str = "x-request-id";
    /// Client address chain added by proxies.
    pub const FORWARDED_FOR: &str = "x-forwarded-for";
    /// Client user agent.
    pub const USER_AGENT: &str = "user-agent";
    /// Pseudo-header carrying the request method.
    pub const METHOD: &str = ":method";
    /// Pseudo-header carrying the request path.
    pub const PATH: &str = ":path";
}

/// A unique identifier for each inbound unit of work, using UUID v7.
///
/// UUID v7 is time-ordered, so ids sort by arrival and work well as log
/// correlation keys.
///
/// # Example
///
/// ```
/// use ariadne_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new request id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a request id from a header value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Read-only request metadata.
///
/// Names are matched case-insensitively and keep their insertion order. The
/// request id is taken from `X-Request-Id` when it holds a valid UUID and
/// generated otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMeta {
    request_id: RequestId,
    entries: IndexMap<String, String>,
}

impl InboundMeta {
    /// Creates empty metadata with a fresh request id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            entries: IndexMap::new(),
        }
    }

    /// Builds metadata from name/value pairs.
    ///
    /// Later duplicates of a name replace earlier ones.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries: IndexMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
            .collect();
        let request_id = entries
            .get(headers::REQUEST_ID)
            .and_then(|v| RequestId::parse(v))
            .unwrap_or_default();
        Self {
            request_id,
            entries,
        }
    }

    /// Returns a copy with an explicit request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the request id.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Looks up a value by name, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(v) = self.entries.get(name) {
            return Some(v.as_str());
        }
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns `true` if a value is present for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over the entries in insertion order, names lowercased.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the trace id.
    ///
    /// Prefers `X-Trace-Id` and falls back to the trace-id field of a
    /// `traceparent` header (`version-traceid-parentid-flags`).
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.get(headers::TRACE_ID)
            .filter(|v| !v.is_empty())
            .or_else(|| {
                self.get(headers::TRACEPARENT)
                    .and_then(|tp| tp.split('-').nth(1))
                    .filter(|id| id.len() == 32)
            })
    }

    /// Returns the originating client address, the first hop of `X-Forwarded-For`.
    #[must_use]
    pub fn forwarded_for(&self) -> Option<&str> {
        self.get(headers::FORWARDED_FOR)
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Returns the user agent.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.get(headers::USER_AGENT)
    }

    /// Returns the request method recorded by the transport adapter.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.get(headers::METHOD)
    }

    /// Returns the request path recorded by the transport adapter.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.get(headers::PATH)
    }
}

impl Default for InboundMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// The payload and metadata of one inbound unit of work.
///
/// # Example
///
/// ```
/// use ariadne_core::{InboundEnvelope, InboundMeta};
///
/// let meta = InboundMeta::from_pairs([("User-Agent", "curl/8.5")]);
/// let envelope = InboundEnvelope::new("payload", meta);
/// assert_eq!(envelope.meta().user_agent(), Some("curl/8.5"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEnvelope<T> {
    payload: T,
    meta: InboundMeta,
}

impl<T> InboundEnvelope<T> {
    /// Creates an envelope.
    #[must_use]
    pub const fn new(payload: T, meta: InboundMeta) -> Self {
        Self { payload, meta }
    }

    /// Creates an envelope with empty metadata.
    #[must_use]
    pub fn from_payload(payload: T) -> Self {
        Self::new(payload, InboundMeta::new())
    }

    /// Copies the headers, method and path of an `http` request.
    ///
    /// Header values that are not visible ASCII are skipped.
    #[must_use]
    pub fn from_http(request: http::Request<T>) -> Self {
        let (parts, payload) = request.into_parts();
        let method = parts.method.as_str().to_string();
        let path = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), ToString::to_string);

        let pairs = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .chain([
                (headers::METHOD.to_string(), method),
                (headers::PATH.to_string(), path),
            ]);

        Self::new(payload, InboundMeta::from_pairs(pairs))
    }

    /// Returns the payload.
    #[must_use]
    pub const fn payload(&self) -> &T {
        &self.payload
    }

    /// Returns the metadata.
    #[must_use]
    pub const fn meta(&self) -> &InboundMeta {
        &self.meta
    }

    /// Splits the envelope into payload and metadata.
    #[must_use]
    pub fn into_parts(self) -> (T, InboundMeta) {
        (self.payload, self.meta)
    }
}
