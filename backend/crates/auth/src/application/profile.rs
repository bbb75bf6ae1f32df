//! Profile Use Case
//!
//! Own account read/update and the public user directory.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;
use kernel::pagination::{Page, PageRequest};
use serde_json::Value;

use crate::domain::entity::{
    profile::{DEFAULT_LANGUAGE, DEFAULT_TIMEZONE, Profile},
    user::User,
};
use crate::domain::repository::{ProfileRepository, UserRepository};
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

const NAME_MAX_LENGTH: usize = 150;
const PHONE_MAX_LENGTH: usize = 32;
const BIO_MAX_LENGTH: usize = 2000;
const URL_MAX_LENGTH: usize = 500;
const LOCATION_MAX_LENGTH: usize = 120;
const TIMEZONE_MAX_LENGTH: usize = 64;
const LANGUAGE_MAX_LENGTH: usize = 16;

/// Editable account fields. `None` means "not submitted".
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    /// Empty string clears the username
    pub username: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub privacy_settings: Option<Value>,
    pub preferences: Option<Value>,
}

/// PUT resets omitted fields to their defaults; PATCH leaves them alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Replace,
    Partial,
}

pub struct ProfileUseCase<R>
where
    R: UserRepository + ProfileRepository,
{
    repo: Arc<R>,
}

impl<R> ProfileUseCase<R>
where
    R: UserRepository + ProfileRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn me(&self, user_id: UserId) -> AuthResult<(User, Profile)> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let profile = self
            .repo
            .find_profile(user_id)
            .await?
            .unwrap_or_else(|| Profile::new(user_id));
        Ok((user, profile))
    }

    pub async fn update(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
        mode: UpdateMode,
    ) -> AuthResult<(User, Profile)> {
        let (mut user, mut profile) = self.me(user_id).await?;
        let replace = mode == UpdateMode::Replace;

        // Falls back to `default` on PUT and to the current value on PATCH
        let pick = |submitted: Option<String>, current: &str, default: &str| -> String {
            match submitted {
                Some(v) => v.trim().to_string(),
                None if replace => default.to_string(),
                None => current.to_string(),
            }
        };

        user.first_name = pick(update.first_name, &user.first_name, "");
        user.last_name = pick(update.last_name, &user.last_name, "");
        user.phone_number = pick(update.phone_number, &user.phone_number, "");
        check_length("first_name", &user.first_name, NAME_MAX_LENGTH)?;
        check_length("last_name", &user.last_name, NAME_MAX_LENGTH)?;
        check_length("phone_number", &user.phone_number, PHONE_MAX_LENGTH)?;

        let username = match update.username {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(
                UserName::new(&raw).map_err(|e| AuthError::validation("username", e.to_string()))?,
            ),
            None if replace => None,
            None => user.username.clone(),
        };
        if let Some(name) = &username {
            if user.username.as_ref() != Some(name)
                && self.repo.exists_by_username(name, Some(user_id)).await?
            {
                return Err(AuthError::validation(
                    "username",
                    "A user with that username already exists.",
                ));
            }
        }
        user.set_username(username);

        profile.bio = pick(update.bio, &profile.bio, "");
        profile.avatar_url = pick(update.avatar_url, &profile.avatar_url, "");
        profile.location = pick(update.location, &profile.location, "");
        profile.timezone = pick(update.timezone, &profile.timezone, DEFAULT_TIMEZONE);
        profile.language = pick(update.language, &profile.language, DEFAULT_LANGUAGE);
        check_length("bio", &profile.bio, BIO_MAX_LENGTH)?;
        check_length("avatar_url", &profile.avatar_url, URL_MAX_LENGTH)?;
        check_length("location", &profile.location, LOCATION_MAX_LENGTH)?;
        check_length("timezone", &profile.timezone, TIMEZONE_MAX_LENGTH)?;
        check_length("language", &profile.language, LANGUAGE_MAX_LENGTH)?;

        profile.privacy_settings = pick_object(
            "privacy_settings",
            update.privacy_settings,
            &profile.privacy_settings,
            replace,
        )?;
        profile.preferences =
            pick_object("preferences", update.preferences, &profile.preferences, replace)?;
        profile.updated_at = Utc::now();

        self.repo.update(&user).await?;
        self.repo.update_profile(&profile).await?;

        tracing::info!(user_id = %user_id, ?mode, "Profile updated");
        Ok((user, profile))
    }

    /// Active users, oldest account first.
    pub async fn list_public(&self, page: PageRequest) -> AuthResult<Page<User>> {
        let (users, total) = self.repo.list_active(page).await?;
        if page.is_out_of_range(total) {
            return Err(AuthError::InvalidPage);
        }
        Ok(Page::new(users, total, page))
    }

    pub async fn get_public(&self, user_id: UserId) -> AuthResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::UserNotFound)
    }
}

fn check_length(field: &'static str, value: &str, max: usize) -> AuthResult<()> {
    if value.chars().count() > max {
        return Err(AuthError::validation(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }
    Ok(())
}

fn pick_object(
    field: &'static str,
    submitted: Option<Value>,
    current: &Value,
    replace: bool,
) -> AuthResult<Value> {
    match submitted {
        Some(Value::Object(map)) => Ok(Value::Object(map)),
        Some(_) => Err(AuthError::validation(field, "Expected a JSON object.")),
        None if replace => Ok(Value::Object(Default::default())),
        None => Ok(current.clone()),
    }
}
