//! Auth Middleware
//!
//! Resolves `Authorization: Bearer <jwt>` into a [`kernel::Principal`] request
//! extension. Requests without a valid token continue anonymously; routes that
//! need a caller reject through the `RequireUser`/`RequireStaff` extractors.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use crate::application::AuthenticateUseCase;
use crate::application::config::AuthConfig;
use crate::domain::repository::AuthStore;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<R: AuthStore> {
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R: AuthStore> AuthMiddlewareState<R> {
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }
}

/// Attach the principal for a valid bearer token.
///
/// Install with `axum::middleware::from_fn_with_state(state, authenticate::<R>)`.
pub async fn authenticate<R: AuthStore>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        let use_case = AuthenticateUseCase::new(state.repo.clone(), state.config.clone());
        match use_case.execute(&token).await {
            Ok(principal) => {
                tracing::trace!(user_id = %principal.user_id, "Request authenticated");
                req.extensions_mut().insert(principal);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Bearer token rejected, continuing anonymously");
            }
        }
    }

    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer  xyz "));
        assert_eq!(bearer_token(&headers).as_deref(), Some("xyz"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
