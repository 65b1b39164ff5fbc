//! Entitlement caching.
//!
//! Caches resolver answers per principal id so that an external lookup is not
//! repeated for every request.

use crate::entitlements::{Entitlements, EntitlementsResolver};
use ariadne_core::{Validation, Violations};
use ariadne_telemetry::metrics::{record_entitlements_cache, CacheEvent};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Configuration for the entitlements cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_entries: usize,
    /// Time-to-live for cached answers.
    pub ttl: Duration,
    /// Whether to cache denials.
    pub cache_denies: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(300), // 5 minutes
            cache_denies: false,
        }
    }
}

impl CacheConfig {
    /// Create a production cache configuration.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            max_entries: 50_000,
            ttl: Duration::from_secs(60), // 1 minute
            cache_denies: false,
        }
    }

    /// Create a development cache configuration.
    #[must_use]
    pub const fn development() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(30),
            cache_denies: true,
        }
    }

    /// Disable caching.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            max_entries: 0,
            ttl: Duration::ZERO,
            cache_denies: false,
        }
    }

    /// Returns `true` if nothing will ever be cached.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.max_entries == 0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    answer: Validation<Violations, Entitlements>,
    created_at: Instant,
}

impl CacheEntry {
    fn new(answer: Validation<Violations, Entitlements>) -> Self {
        Self {
            answer,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache.
    pub size: usize,
    /// Number of evictions (expired or over capacity).
    pub evictions: u64,
}

/// A resolver that remembers the answers of another resolver.
///
/// Grants are cached for [`CacheConfig::ttl`]; denials only when
/// [`CacheConfig::cache_denies`] is set. When full, expired entries are
/// dropped first, then the oldest ones.
///
/// ```
/// use ariadne_auth::{CacheConfig, EntitlementsResolver, EntitlementsResolvers};
///
/// let cached = EntitlementsResolvers::cached(
///     EntitlementsResolvers::fixed(["user"], Vec::<String>::new(), Vec::<String>::new()),
///     CacheConfig::default(),
/// );
/// let _ = cached.resolve("alice");
/// let _ = cached.resolve("alice");
/// assert_eq!(cached.stats().hits, 1);
/// ```
#[derive(Debug)]
pub struct CachedResolver<S> {
    source: S,
    config: CacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<S: EntitlementsResolver> CachedResolver<S> {
    /// Wraps `source`.
    pub fn new(source: S, config: CacheConfig) -> Self {
        Self {
            source,
            config,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn lookup(&self, principal_id: &str) -> Option<Validation<Violations, Entitlements>> {
        if self.config.is_disabled() {
            return None;
        }
        let entries = self.entries.read();
        entries
            .get(principal_id)
            .filter(|entry| !entry.is_expired(self.config.ttl))
            .map(|entry| entry.answer.clone())
    }

    fn should_cache(&self, answer: &Validation<Violations, Entitlements>) -> bool {
        !self.config.is_disabled() && (answer.is_valid() || self.config.cache_denies)
    }

    fn insert(&self, principal_id: &str, answer: Validation<Violations, Entitlements>) {
        let mut entries = self.entries.write();

        // Evict expired entries if we're at capacity
        if entries.len() >= self.config.max_entries && !entries.contains_key(principal_id) {
            self.evict_expired(&mut entries);
        }

        // If still at capacity, evict oldest entries
        while entries.len() >= self.config.max_entries && !entries.contains_key(principal_id) {
            let Some(oldest) = Self::find_oldest(&entries) else {
                break;
            };
            entries.remove(&oldest);
            self.record_evictions(1);
        }

        entries.insert(principal_id.to_string(), CacheEntry::new(answer));
    }

    /// Drops one principal's cached answer.
    pub fn invalidate(&self, principal_id: &str) {
        self.entries.write().remove(principal_id);
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.entries.read().len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn evict_expired(&self, entries: &mut HashMap<String, CacheEntry>) {
        let ttl = self.config.ttl;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(ttl));
        self.record_evictions((before - entries.len()) as u64);
    }

    fn record_evictions(&self, count: u64) {
        if count > 0 {
            self.evictions.fetch_add(count, Ordering::Relaxed);
            for _ in 0..count {
                record_entitlements_cache(CacheEvent::Eviction);
            }
        }
    }

    fn find_oldest(entries: &HashMap<String, CacheEntry>) -> Option<String> {
        entries
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(key, _)| key.clone())
    }
}

impl<S: EntitlementsResolver> EntitlementsResolver for CachedResolver<S> {
    fn resolve(&self, principal_id: &str) -> Validation<Violations, Entitlements> {
        if let Some(answer) = self.lookup(principal_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            record_entitlements_cache(CacheEvent::Hit);
            return answer;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        record_entitlements_cache(CacheEvent::Miss);

        let answer = self.source.resolve(principal_id);
        if self.should_cache(&answer) {
            self.insert(principal_id, answer.clone());
        }
        answer
    }
}
