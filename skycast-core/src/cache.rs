use async_trait::async_trait;
use dashmap::DashMap;
use std::{
    fmt,
    hash::Hash,
    time::{Duration, Instant},
};

use crate::{
    error::FetchError,
    provider::{RawWeatherPayload, WeatherFetcher},
    units::UnitSystem,
};

/// Default lifetime of a cached payload.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// A thread-safe cache with TTL (time-to-live) support
pub struct TtlCache<K, V> {
    data: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a new cache with the specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self { data: DashMap::new(), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a value if present and younger than the TTL. Expired entries are
    /// dropped on read.
    pub fn get(&self, key: &K) -> Option<V> {
        let entry = self.data.get(key)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            drop(entry);
            self.data.remove(key);
            None
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry { value, fetched_at: Instant::now() };
        self.data.insert(key, entry);
    }

    /// Remove expired entries from the cache
    pub fn cleanup(&self) {
        let ttl = self.ttl;
        self.data.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
    }

    /// Number of entries, expired ones included
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<K: Hash + Eq, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.data.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Normalize a location string for cache key
/// Converts to lowercase and trims whitespace
pub fn normalize_cache_key(location: &str) -> String {
    location.trim().to_lowercase()
}

type PayloadKey = (String, UnitSystem);

/// Fetch collaborator that memoizes complete payloads per
/// (location, unit system). A miss or an expired entry always goes to the
/// wrapped fetcher; payloads with a failed part are never stored.
#[derive(Debug)]
pub struct CachingFetcher<F> {
    inner: F,
    cache: TtlCache<PayloadKey, RawWeatherPayload>,
}

impl<F: WeatherFetcher> CachingFetcher<F> {
    pub fn new(inner: F, ttl: Duration) -> Self {
        Self { inner, cache: TtlCache::new(ttl) }
    }

    pub fn with_default_ttl(inner: F) -> Self {
        Self::new(inner, DEFAULT_TTL)
    }

    pub fn cache(&self) -> &TtlCache<PayloadKey, RawWeatherPayload> {
        &self.cache
    }
}

#[async_trait]
impl<F: WeatherFetcher> WeatherFetcher for CachingFetcher<F> {
    async fn fetch(
        &self,
        location: &str,
        units: UnitSystem,
    ) -> Result<RawWeatherPayload, FetchError> {
        let key = (normalize_cache_key(location), units);

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(location = %location, %units, "Payload cache hit");
            return Ok(cached);
        }

        tracing::debug!(
            location = %location,
            %units,
            ttl_secs = self.cache.ttl().as_secs(),
            "Payload cache miss"
        );

        let payload = self.inner.fetch(location, units).await?;
        if payload.is_complete() {
            self.cache.cleanup();
            self.cache.insert(key, payload.clone());
        }

        Ok(payload)
    }
}
