//! Application Configuration

use std::time::Duration;

use platform::cookie::{CookieConfig, SameSite};
use platform::rate_limit::RateLimitConfig;

/// Blog application configuration
#[derive(Debug, Clone)]
pub struct BlogConfig {
    /// Public list page cache lifetime (2 minutes)
    pub list_cache_ttl: Duration,
    /// Post detail cache lifetime (1 hour)
    pub detail_cache_ttl: Duration,
    /// Dedup window for anonymous reactions (1 hour)
    pub anon_reaction_ttl: Duration,
    /// Cookie identifying anonymous reactors
    pub anon_cookie: CookieConfig,
    pub comment_anon_limit: RateLimitConfig,
    pub comment_user_limit: RateLimitConfig,
    pub reaction_anon_limit: RateLimitConfig,
    pub reaction_user_limit: RateLimitConfig,
    /// Absolute origin used in sitemap links, without trailing slash
    pub site_url: String,
    /// Posts shown by the analytics endpoint
    pub analytics_top_n: u32,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            list_cache_ttl: Duration::from_secs(120),
            detail_cache_ttl: Duration::from_secs(3600),
            anon_reaction_ttl: Duration::from_secs(3600),
            anon_cookie: CookieConfig {
                name: "anon_sid".to_string(),
                secure: true,
                http_only: true,
                same_site: SameSite::Lax,
                path: "/".to_string(),
                max_age_secs: Some(14 * 24 * 3600),
            },
            comment_anon_limit: RateLimitConfig::per_minute(5),
            comment_user_limit: RateLimitConfig::per_minute(20),
            reaction_anon_limit: RateLimitConfig::per_minute(30),
            reaction_user_limit: RateLimitConfig::per_minute(60),
            site_url: "http://localhost:40922".to_string(),
            analytics_top_n: 10,
        }
    }
}

impl BlogConfig {
    /// Plain-HTTP cookies for local runs
    pub fn development() -> Self {
        let mut config = Self::default();
        config.anon_cookie.secure = false;
        config
    }

    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = site_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BlogConfig::default();
        assert_eq!(config.list_cache_ttl, Duration::from_secs(120));
        assert_eq!(config.detail_cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.anon_cookie.name, "anon_sid");
        assert_eq!(config.comment_anon_limit.max_requests, 5);
        assert_eq!(config.reaction_user_limit.max_requests, 60);
    }

    #[test]
    fn test_site_url_is_trimmed() {
        let config = BlogConfig::default().with_site_url("https://example.com/");
        assert_eq!(config.site_url, "https://example.com");
    }
}
