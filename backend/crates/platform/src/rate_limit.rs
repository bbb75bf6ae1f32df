//! Rate Limiting Infrastructure
//!
//! Fixed-window counters keyed by scope and caller, stored in the cache.

use std::time::Duration;

use crate::cache::{CacheError, CacheService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, 60)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
}

#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count this request against `key` and report whether it fits the window.
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, CacheError>;
}

/// [`RateLimitStore`] on top of the shared cache's atomic `incr`.
#[derive(Debug, Clone)]
pub struct CacheRateLimiter {
    cache: CacheService,
}

impl CacheRateLimiter {
    pub fn new(cache: CacheService) -> Self {
        Self { cache }
    }
}

impl RateLimitStore for CacheRateLimiter {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, CacheError> {
        let count = self
            .cache
            .incr(&format!("throttle:{key}"), config.window)
            .await?;
        let max = u64::from(config.max_requests);
        Ok(RateLimitResult {
            allowed: count <= max,
            remaining: max.saturating_sub(count) as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheRateLimiter, RateLimitConfig, RateLimitStore};
    use crate::cache::CacheService;

    #[tokio::test]
    async fn test_window_allows_up_to_max() {
        let limiter = CacheRateLimiter::new(CacheService::in_memory());
        let config = RateLimitConfig::per_minute(2);

        let first = limiter.check_and_increment("comments:1.2.3.4", &config).await.unwrap();
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);

        assert!(limiter.check_and_increment("comments:1.2.3.4", &config).await.unwrap().allowed);
        let third = limiter.check_and_increment("comments:1.2.3.4", &config).await.unwrap();
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);

        // Separate bucket
        assert!(limiter.check_and_increment("comments:5.6.7.8", &config).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_window_resets_after_expiry() {
        let limiter = CacheRateLimiter::new(CacheService::in_memory());
        let config = RateLimitConfig {
            max_requests: 1,
            window: std::time::Duration::from_millis(30),
        };

        assert!(limiter.check_and_increment("login:a", &config).await.unwrap().allowed);
        assert!(!limiter.check_and_increment("login:a", &config).await.unwrap().allowed);
        tokio::time::sleep(std::time::Duration::from_millis(60)).await;
        assert!(limiter.check_and_increment("login:a", &config).await.unwrap().allowed);
    }
}
