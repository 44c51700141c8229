//! Typed cache facade: serialization, key prefixing, default TTL and metrics
//! on top of the byte-level [`RedisCache`].

use crate::cache::RedisCache;
use crate::error::{Error, Result};
use crate::key::CacheKeyBuilder;
use crate::observability::{CacheMetrics, NoOpMetrics, TtlPolicy};
use crate::serialization::{PostcardSerializer, ValueSerializer};
use crate::store::ConnectionFactory;
use crate::values::ValueMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

/// Stores arbitrary serde values through a [`RedisCache`].
///
/// # Example
///
/// ```
/// use redis_cache_kit::{CacheFacade, RedisCacheBuilder, store::InMemoryStore};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> redis_cache_kit::Result<()> {
/// let cache = RedisCacheBuilder::new().build(InMemoryStore::new());
/// let users = CacheFacade::new(cache).with_prefix("user");
///
/// let alice = User { id: 1, name: "alice".to_string() };
/// users.set("1", &alice, 300).await?;
///
/// let cached: Option<User> = users.get("1").await?;
/// assert_eq!(cached, Some(alice));
/// # Ok(())
/// # }
/// ```
pub struct CacheFacade<F: ConnectionFactory, S: ValueSerializer = PostcardSerializer> {
    cache: RedisCache<F>,
    serializer: S,
    keys: CacheKeyBuilder,
    ttl_policy: TtlPolicy,
    metrics: Box<dyn CacheMetrics>,
}

impl<F: ConnectionFactory> CacheFacade<F, PostcardSerializer> {
    /// Facade with the default postcard serializer, no prefix and no default expiry.
    pub fn new(cache: RedisCache<F>) -> Self {
        Self::with_serializer(cache, PostcardSerializer::default())
    }
}

impl<F: ConnectionFactory, S: ValueSerializer> CacheFacade<F, S> {
    pub fn with_serializer(cache: RedisCache<F>, serializer: S) -> Self {
        CacheFacade {
            cache,
            serializer,
            keys: CacheKeyBuilder::new(),
            ttl_policy: TtlPolicy::default(),
            metrics: Box::new(NoOpMetrics),
        }
    }

    /// Namespace every key as `"{prefix}:{key}"`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.keys = CacheKeyBuilder::with_prefix(prefix);
        self
    }

    /// Expiry used by [`set_default`](Self::set_default) and [`add_default`](Self::add_default).
    pub fn with_ttl_policy(mut self, policy: TtlPolicy) -> Self {
        self.ttl_policy = policy;
        self
    }

    pub fn with_metrics(mut self, metrics: Box<dyn CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The byte-level cache underneath.
    pub fn cache(&self) -> &RedisCache<F> {
        &self.cache
    }

    /// Mutable access, e.g. to reconfigure the connection.
    pub fn cache_mut(&mut self) -> &mut RedisCache<F> {
        &mut self.cache
    }

    pub fn key_builder(&self) -> &CacheKeyBuilder {
        &self.keys
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl_policy
    }

    /// Fetch and decode the value under `key`; `Ok(None)` on a miss.
    ///
    /// # Errors
    /// Transport failures from the cache, and decoding errors from the serializer.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let timer = Instant::now();
        let store_key = self.keys.build(key);

        let bytes = match self.cache.get(&store_key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.metrics.record_miss(&store_key, timer.elapsed());
                return Ok(None);
            }
            Err(e) => {
                self.metrics.record_error(&store_key, &e.to_string());
                return Err(e);
            }
        };

        match self.serializer.deserialize(&bytes) {
            Ok(value) => {
                self.metrics.record_hit(&store_key, timer.elapsed());
                Ok(Some(value))
            }
            Err(e) => {
                self.metrics.record_error(&store_key, &e.to_string());
                Err(e)
            }
        }
    }

    /// Like [`get`](Self::get), but an entry that cannot be decoded is deleted
    /// and reported as a miss.
    ///
    /// # Errors
    /// Transport failures only.
    pub async fn get_or_discard<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await {
            Err(
                e @ (Error::DeserializationError(_)
                | Error::InvalidCacheEntry(_)
                | Error::VersionMismatch { .. }),
            ) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                self.cache.delete(&self.keys.build(key)).await?;
                Ok(None)
            }
            other => other,
        }
    }

    /// True when `key` currently holds a value. Costs a full `GET`.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.cache.get(&self.keys.build(key)).await?.is_some())
    }

    /// Encode and store `value`, replacing any existing entry. `ttl_seconds == 0` never expires.
    ///
    /// # Errors
    /// Serialization and transport failures.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) -> Result<bool> {
        let timer = Instant::now();
        let store_key = self.keys.build(key);
        let bytes = self.serializer.serialize(value)?;

        let stored = self
            .cache
            .set(&store_key, &bytes, ttl_seconds)
            .await
            .map_err(|e| {
                self.metrics.record_error(&store_key, &e.to_string());
                e
            })?;
        self.metrics.record_set(&store_key, stored, timer.elapsed());
        Ok(stored)
    }

    /// [`set`](Self::set) with the expiry from the TTL policy.
    pub async fn set_default<T: Serialize>(&self, key: &str, value: &T) -> Result<bool> {
        self.set(key, value, self.ttl_policy.ttl_seconds()).await
    }

    /// Encode and store `value` only if `key` is absent.
    ///
    /// # Errors
    /// Serialization and transport failures, as for [`RedisCache::add`].
    pub async fn add<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) -> Result<bool> {
        let timer = Instant::now();
        let store_key = self.keys.build(key);
        let bytes = self.serializer.serialize(value)?;

        let added = self
            .cache
            .add(&store_key, &bytes, ttl_seconds)
            .await
            .map_err(|e| {
                self.metrics.record_error(&store_key, &e.to_string());
                e
            })?;
        self.metrics.record_set(&store_key, added, timer.elapsed());
        Ok(added)
    }

    /// [`add`](Self::add) with the expiry from the TTL policy.
    pub async fn add_default<T: Serialize>(&self, key: &str, value: &T) -> Result<bool> {
        self.add(key, value, self.ttl_policy.ttl_seconds()).await
    }

    pub async fn delete(&self, key: &str) -> Result<bool> {
        self.cache.delete(&self.keys.build(key)).await
    }

    /// Fetch and decode several keys in one round trip.
    ///
    /// The result is keyed by the caller's (unprefixed) keys, in request order,
    /// with misses kept as `None`.
    ///
    /// # Errors
    /// Transport failures, and the first decoding error.
    pub async fn multi_get<T: DeserializeOwned>(&self, keys: &[&str]) -> Result<ValueMap<T>> {
        let store_keys = self.keys.build_many(keys);
        let refs: Vec<&str> = store_keys.iter().map(String::as_str).collect();
        let raw = self.cache.multi_get(&refs).await?;

        let mut values = ValueMap::with_capacity(keys.len());
        for (key, store_key) in keys.iter().zip(&store_keys) {
            let value = match raw.get(store_key) {
                Some(bytes) => Some(self.serializer.deserialize(bytes)?),
                None => None,
            };
            values.insert(*key, value);
        }
        Ok(values)
    }

    /// Flush the configured database, including keys outside this facade's prefix.
    pub async fn flush(&self) -> Result<bool> {
        self.cache.flush().await
    }
}
