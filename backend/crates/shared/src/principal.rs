//! Authenticated caller
//!
//! The auth middleware resolves a bearer token into a [`Principal`] and stores
//! it in the request extensions. Handlers in any crate read it back through
//! the extractors below instead of reaching into global state.

use crate::id::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub username: Option<String>,
    /// Staff flag or any privileged role
    pub is_staff: bool,
}

impl Principal {
    /// Name shown next to user-generated content.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }
}

#[cfg(feature = "axum")]
mod extract {
    use axum::extract::FromRequestParts;
    use http::request::Parts;
    use std::convert::Infallible;

    use super::Principal;
    use crate::error::app_error::AppError;

    /// Optional caller; never rejects.
    #[derive(Debug, Clone)]
    pub struct CurrentUser(pub Option<Principal>);

    /// Authenticated caller; rejects anonymous requests with 401.
    #[derive(Debug, Clone)]
    pub struct RequireUser(pub Principal);

    /// Staff caller; 401 when anonymous, 403 when not staff.
    #[derive(Debug, Clone)]
    pub struct RequireStaff(pub Principal);

    impl<S> FromRequestParts<S> for CurrentUser
    where
        S: Send + Sync,
    {
        type Rejection = Infallible;

        async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
            Ok(Self(parts.extensions.get::<Principal>().cloned()))
        }
    }

    impl<S> FromRequestParts<S> for RequireUser
    where
        S: Send + Sync,
    {
        type Rejection = AppError;

        async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
            parts
                .extensions
                .get::<Principal>()
                .cloned()
                .map(Self)
                .ok_or_else(|| {
                    AppError::unauthorized("Authentication credentials were not provided.")
                })
        }
    }

    impl<S> FromRequestParts<S> for RequireStaff
    where
        S: Send + Sync,
    {
        type Rejection = AppError;

        async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
            let RequireUser(principal) = RequireUser::from_request_parts(parts, state).await?;
            if !principal.is_staff {
                return Err(AppError::forbidden(
                    "You do not have permission to perform this action.",
                ));
            }
            Ok(Self(principal))
        }
    }
}

#[cfg(feature = "axum")]
pub use extract::{CurrentUser, RequireStaff, RequireUser};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::Id;

    fn principal(username: Option<&str>, is_staff: bool) -> Principal {
        Principal {
            user_id: Id::new(),
            email: "reader@example.com".to_string(),
            username: username.map(str::to_string),
            is_staff,
        }
    }

    #[test]
    fn test_display_name_prefers_username() {
        assert_eq!(principal(Some("ada"), false).display_name(), "ada");
        assert_eq!(principal(None, false).display_name(), "reader@example.com");
    }

    #[cfg(feature = "axum")]
    #[tokio::test]
    async fn test_extractors() {
        use axum::extract::FromRequestParts;

        let (mut parts, _) = http::Request::new(()).into_parts();
        let CurrentUser(none) = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(none.is_none());
        let err = RequireUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status_code(), 401);

        parts.extensions.insert(principal(None, false));
        let err = RequireStaff::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        parts.extensions.insert(principal(None, true));
        assert!(RequireStaff::from_request_parts(&mut parts, &()).await.is_ok());
    }
}
