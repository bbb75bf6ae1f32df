//! Key-value cache
//!
//! A small async cache abstraction with fixed TTLs. [`InMemoryCache`] is the
//! default backend; `RedisCache` is available behind the `redis` feature.
//! Besides plain get/set, backends provide two atomic primitives that callers
//! rely on for correctness: [`CacheBackend::set_if_absent`] (dedup windows)
//! and [`CacheBackend::incr`] (fixed-window counters).

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Returns whether a key was removed.
    async fn del(&self, key: &str) -> CacheResult<bool>;

    /// Store `value` only when `key` is absent (or expired).
    ///
    /// Returns `true` when this call stored the value. Must be atomic: of two
    /// concurrent calls for the same key exactly one returns `true`.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool>;

    /// Increment a counter, starting a new `ttl` window when the key is absent.
    async fn incr(&self, key: &str, ttl: Duration) -> CacheResult<u64>;

    async fn flush(&self) -> CacheResult<()>;
}

/// Cloneable handle shared through application state.
#[derive(Clone)]
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
}

impl CacheService {
    pub fn new(backend: impl CacheBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(InMemoryCache::new())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        match self.backend.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw, ttl).await
    }

    pub async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.backend.get(key).await
    }

    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        self.backend.set(key, value, ttl).await
    }

    pub async fn del(&self, key: &str) -> CacheResult<bool> {
        self.backend.del(key).await
    }

    pub async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        self.backend.set_if_absent(key, value, ttl).await
    }

    pub async fn incr(&self, key: &str, ttl: Duration) -> CacheResult<u64> {
        self.backend.incr(key, ttl).await
    }

    pub async fn flush(&self) -> CacheResult<()> {
        self.backend.flush().await
    }
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService").finish_non_exhaustive()
    }
}

// ── In-Memory Cache Backend ──

/// Entries kept when no capacity is given
pub const DEFAULT_CACHE_CAPACITY: u64 = 100_000;

/// Bounded moka cache with a TTL per entry.
///
/// Expired entries are reclaimed by moka's maintenance, not only on the next
/// read, so keys that are written once and never read again do not pile up.
#[derive(Clone)]
pub struct InMemoryCache {
    inner: Cache<String, CacheEntry>,
}

#[derive(Clone)]
struct CacheEntry {
    value: String,
    ttl: Option<Duration>,
    /// Restart the TTL when the entry is overwritten. Counters keep their window.
    renew: bool,
}

impl CacheEntry {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            ttl,
            renew: true,
        }
    }

    fn counter(count: u64, ttl: Duration) -> Self {
        Self {
            value: count.to_string(),
            ttl: Some(ttl),
            renew: false,
        }
    }
}

struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        if value.renew {
            value.ttl
        } else {
            duration_until_expiry
        }
    }
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();
        Self { inner }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

fn not_a_counter(key: &str) -> CacheError {
    CacheError::Backend(format!("value at {key} is not a counter"))
}

#[async_trait::async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.inner.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        self.inner
            .insert(key.to_string(), CacheEntry::new(value, ttl))
            .await;
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<bool> {
        Ok(self.inner.remove(key).await.is_some())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let entry = self
            .inner
            .entry_by_ref(key)
            .or_insert_with(async { CacheEntry::new(value, Some(ttl)) })
            .await;
        Ok(entry.is_fresh())
    }

    async fn incr(&self, key: &str, ttl: Duration) -> CacheResult<u64> {
        let result = self
            .inner
            .entry_by_ref(key)
            .and_try_compute_with(|current| async move {
                let next = match current {
                    Some(entry) => {
                        let count = entry
                            .value()
                            .value
                            .parse::<u64>()
                            .map_err(|_| not_a_counter(key))?;
                        count + 1
                    }
                    None => 1,
                };
                Ok::<_, CacheError>(Op::Put(CacheEntry::counter(next, ttl)))
            })
            .await?;

        match result {
            CompResult::Inserted(entry) | CompResult::ReplacedWith(entry) => {
                entry.value().value.parse().map_err(|_| not_a_counter(key))
            }
            _ => Err(CacheError::Backend(format!("counter at {key} was not stored"))),
        }
    }

    async fn flush(&self) -> CacheResult<()> {
        self.inner.invalidate_all();
        Ok(())
    }
}

// ── Redis Cache Backend ──

/// Redis-backed cache (`redis://127.0.0.1:6379`).
#[cfg(feature = "redis")]
#[derive(Clone)]
pub struct RedisCache {
    conn: redis::aio::MultiplexedConnection,
}

#[cfg(feature = "redis")]
impl RedisCache {
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(redis_err)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(redis_err)?;
        Ok(Self { conn })
    }
}

#[cfg(feature = "redis")]
fn redis_err(e: redis::RedisError) -> CacheError {
    CacheError::Backend(e.to_string())
}

#[cfg(feature = "redis")]
#[async_trait::async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(redis_err)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                .await
                .map_err(redis_err),
            None => conn.set::<_, _, ()>(key, value).await.map_err(redis_err),
        }
    }

    async fn del(&self, key: &str) -> CacheResult<bool> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await.map_err(redis_err)?;
        Ok(removed > 0)
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        // SET NX EX replies OK on store and nil otherwise
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await
            .map_err(redis_err)?;
        Ok(reply.is_some())
    }

    async fn incr(&self, key: &str, ttl: Duration) -> CacheResult<u64> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        let count: u64 = conn.incr(key, 1u64).await.map_err(redis_err)?;
        if count == 1 {
            let _: bool = conn
                .expire(key, ttl.as_secs().max(1) as i64)
                .await
                .map_err(redis_err)?;
        }
        Ok(count)
    }

    async fn flush(&self) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await
            .map_err(redis_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_roundtrip_and_delete() {
        let cache = CacheService::in_memory();
        cache
            .set_json("k", &vec![1, 2, 3], Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert_eq!(cache.get_json::<Vec<i32>>("k").await.unwrap(), Some(vec![1, 2, 3]));

        assert!(cache.del("k").await.unwrap());
        assert!(!cache.del("k").await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = InMemoryCache::new();
        cache
            .set("short", "v", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert!(cache.get("short").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get("short").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_if_absent_is_exclusive() {
        let cache = CacheService::in_memory();
        let ttl = Duration::from_secs(60);

        let attempts = (0..16).map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.set_if_absent("dedup", "1", ttl).await.unwrap() })
        });
        let mut winners = 0;
        for handle in attempts {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_set_if_absent_after_expiry() {
        let cache = InMemoryCache::new();
        assert!(cache.set_if_absent("k", "1", Duration::from_millis(10)).await.unwrap());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.set_if_absent("k", "1", Duration::from_millis(10)).await.unwrap());
    }

    #[tokio::test]
    async fn test_incr_counts_within_window() {
        let cache = InMemoryCache::new();
        let ttl = Duration::from_secs(60);
        assert_eq!(cache.incr("hits", ttl).await.unwrap(), 1);
        assert_eq!(cache.incr("hits", ttl).await.unwrap(), 2);

        cache.set("word", "abc", None).await.unwrap();
        assert!(cache.incr("word", ttl).await.is_err());
    }

    #[tokio::test]
    async fn test_counter_keeps_its_window() {
        let cache = InMemoryCache::new();
        let ttl = Duration::from_millis(100);
        assert_eq!(cache.incr("w", ttl).await.unwrap(), 1);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.incr("w", ttl).await.unwrap(), 2);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.incr("w", ttl).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_reclaimed_without_reads() {
        let cache = InMemoryCache::new();
        let ttl = Duration::from_millis(5);
        for i in 0..5000 {
            cache
                .set_if_absent(&format!("anon:{i}"), "1", ttl)
                .await
                .unwrap();
            cache.incr(&format!("throttle:{i}"), ttl).await.unwrap();
        }

        // expiry is swept on a coarse timer wheel
        tokio::time::sleep(Duration::from_millis(1200)).await;
        cache.set("fresh", "v", None).await.unwrap();
        for _ in 0..50 {
            cache.inner.run_pending_tasks().await;
            if cache.inner.entry_count() == 1 {
                break;
            }
        }
        assert_eq!(cache.inner.entry_count(), 1);
        assert_eq!(cache.get("anon:0").await.unwrap(), None);
        assert_eq!(cache.get("fresh").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_flush_clears_everything() {
        let cache = InMemoryCache::new();
        cache.set("a", "1", None).await.unwrap();
        cache.incr("b", Duration::from_secs(60)).await.unwrap();
        cache.flush().await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert_eq!(cache.incr("b", Duration::from_secs(60)).await.unwrap(), 1);
    }
}
