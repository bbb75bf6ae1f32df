//! Per-caller throttles on write endpoints
//!
//! Fixed windows keyed by user id for authenticated callers and by client IP
//! otherwise. A cache outage lets the request through.

use kernel::Principal;
use platform::cache::CacheService;
use platform::client::ClientInfo;
use platform::rate_limit::{CacheRateLimiter, RateLimitConfig, RateLimitStore};

use crate::error::{BlogError, BlogResult};

#[derive(Debug, Clone, Copy)]
pub struct ThrottleScope<'a> {
    pub name: &'static str,
    pub anon: &'a RateLimitConfig,
    pub user: &'a RateLimitConfig,
}

pub(crate) async fn enforce(
    cache: &CacheService,
    scope: ThrottleScope<'_>,
    principal: Option<&Principal>,
    client: &ClientInfo,
) -> BlogResult<()> {
    let (key, limit) = match principal {
        Some(p) => (format!("{}_user:{}", scope.name, p.user_id), scope.user),
        None => (
            format!("{}_anon:{}", scope.name, client.rate_limit_key()),
            scope.anon,
        ),
    };

    let limiter = CacheRateLimiter::new(cache.clone());
    match limiter.check_and_increment(&key, limit).await {
        Ok(result) if result.allowed => Ok(()),
        Ok(_) => {
            tracing::debug!(scope = scope.name, key = %key, "Throttle window exhausted");
            Err(BlogError::Throttled)
        }
        Err(e) => {
            tracing::warn!(scope = scope.name, error = %e, "Throttle check failed, allowing");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::UserId;

    #[tokio::test]
    async fn test_anonymous_and_user_windows_are_separate() {
        let cache = CacheService::in_memory();
        let anon = RateLimitConfig::per_minute(1);
        let user = RateLimitConfig::per_minute(2);
        let scope = ThrottleScope {
            name: "comments",
            anon: &anon,
            user: &user,
        };
        let client = ClientInfo::new("10.0.0.1".parse().ok(), "test");
        let principal = Principal {
            user_id: UserId::new(),
            email: "a@example.com".to_string(),
            username: None,
            is_staff: false,
        };

        assert!(enforce(&cache, scope, None, &client).await.is_ok());
        assert!(matches!(
            enforce(&cache, scope, None, &client).await,
            Err(BlogError::Throttled)
        ));

        assert!(enforce(&cache, scope, Some(&principal), &client).await.is_ok());
        assert!(enforce(&cache, scope, Some(&principal), &client).await.is_ok());
        assert!(enforce(&cache, scope, Some(&principal), &client).await.is_err());
    }
}
