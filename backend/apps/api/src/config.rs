//! Process configuration read from the environment.

use std::net::SocketAddr;

use auth::AuthConfig;
use axum::http::HeaderValue;
use blog::BlogConfig;
use platform::config::{
    ConfigError, env_bool, env_list, env_opt, env_or, env_parse, env_required, env_secret,
};

const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub redis_url: Option<String>,
    pub mail_webhook_url: Option<String>,
    /// Take the client address from the right-most `X-Forwarded-For` hop.
    /// Enable only behind a reverse proxy that appends to that header.
    pub trust_forwarded_for: bool,
    pub auth: AuthConfig,
    pub blog: BlogConfig,
}

impl AppConfig {
    /// Debug builds fall back to random secrets; release builds require them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let allow_random = cfg!(debug_assertions);

        let bind_addr = env_or("BIND_ADDR", "0.0.0.0:31113");
        let bind_addr = bind_addr.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR".to_string(),
            reason: format!("{bind_addr:?} is not a socket address"),
        })?;

        let mut frontend_origins = env_list("FRONTEND_ORIGINS");
        if frontend_origins.is_empty() {
            frontend_origins = platform::config::parse_list(DEFAULT_FRONTEND_ORIGINS);
        }

        let site_url = env_or("SITE_URL", "http://localhost:40922");

        let auth = AuthConfig {
            jwt_secret: env_secret("JWT_SECRET", allow_random)?,
            token_secret: env_secret("TOKEN_SECRET", allow_random)?,
            password_pepper: env_opt("PASSWORD_PEPPER").map(String::into_bytes),
            totp_issuer: env_or("TOTP_ISSUER", "Quill"),
            check_breached_passwords: env_bool("CHECK_BREACHED_PASSWORDS", !allow_random)?,
            frontend_url: site_url.trim_end_matches('/').to_string(),
            ..AuthConfig::default()
        };

        let blog = if allow_random {
            BlogConfig::development()
        } else {
            BlogConfig::default()
        }
        .with_site_url(site_url);

        Ok(Self {
            database_url: env_required("DATABASE_URL")?,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 5)?,
            bind_addr,
            frontend_origins,
            redis_url: env_opt("REDIS_URL"),
            mail_webhook_url: env_opt("MAIL_WEBHOOK_URL"),
            trust_forwarded_for: env_bool("TRUST_PROXY", false)?,
            auth,
            blog,
        })
    }

    /// Origins that parse as header values; the rest are logged and skipped.
    pub fn cors_origins(&self) -> Vec<HeaderValue> {
        parse_origins(&self.frontend_origins)
    }
}

fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_invalid() {
        let origins = vec![
            "https://blog.example.com".to_string(),
            "bad\norigin".to_string(),
        ];
        let parsed = parse_origins(&origins);
        assert_eq!(parsed, vec![HeaderValue::from_static("https://blog.example.com")]);
    }

    #[test]
    fn test_default_origins() {
        let origins = platform::config::parse_list(DEFAULT_FRONTEND_ORIGINS);
        assert_eq!(origins.len(), 2);
        assert_eq!(parse_origins(&origins).len(), 2);
    }
}
