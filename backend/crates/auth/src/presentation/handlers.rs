//! HTTP Handlers

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::id::UserId;
use kernel::json::Json;
use kernel::pagination::{Page, PageParams, PageRequest};
use kernel::principal::{RequireStaff, RequireUser};
use platform::client::ClientInfo;
use platform::tasks::TaskQueue;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    AccountUseCase, AuthJob, ConfirmPasswordResetInput, ConfirmPasswordResetUseCase, LoginInput,
    LoginUseCase, LogoutUseCase, ProfileUseCase, RefreshTokenUseCase, RegisterInput,
    RegisterUseCase, RequestPasswordResetUseCase, SecurityLogQuery, TwoFactorUseCase, UpdateMode,
    VerifyEmailUseCase,
};
use crate::domain::entity::security_log::{AuditLog, LoginHistory};
use crate::domain::repository::AuthStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    BackupCodesRequest, BackupCodesResponse, ConfirmDeviceRequest, DetailResponse,
    DeviceResponse, DisableTwoFactorRequest, EmailVerifyRequest, EnrollmentResponse,
    LoginHistoryQuery, LoginRequest, LoginResponse, LogoutRequest, MeResponse, MeUpdateRequest,
    PasswordResetConfirmRequest, PasswordResetRequest, RefreshRequest, RefreshResponse,
    RegisterRequest, UserPublicResponse,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R: AuthStore> {
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub jobs: TaskQueue<AuthJob>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /auth/register
pub async fn register<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    client: ClientInfo,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse> {
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone(), state.jobs.clone());

    let input = RegisterInput {
        email: req.email,
        username: req.username,
        password: req.password,
        first_name: req.first_name,
        last_name: req.last_name,
    };

    let user = use_case.execute(input, &client).await?;

    Ok((StatusCode::CREATED, Json(UserPublicResponse::from(user))))
}

// ============================================================================
// Login / Logout / Refresh
// ============================================================================

/// POST /auth/login
pub async fn login<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    client: ClientInfo,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<LoginResponse>> {
    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());

    let input = LoginInput {
        identifier: req.email_or_username,
        password: req.password,
        totp_code: req.totp_code,
    };

    let output = use_case.execute(input, &client).await?;

    Ok(Json(LoginResponse {
        access_token: output.access_token,
        refresh_token: output.refresh_token,
        user: UserPublicResponse::from(output.user),
    }))
}

/// POST /auth/logout
///
/// Always 204 for an authenticated caller; a missing or foreign refresh
/// token is ignored.
pub async fn logout<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireUser(principal): RequireUser,
    body: Bytes,
) -> AuthResult<StatusCode> {
    let req: LogoutRequest = serde_json::from_slice(&body).unwrap_or_default();

    let use_case = LogoutUseCase::new(state.repo.clone(), state.config.clone());
    use_case
        .execute(principal.user_id, req.refresh.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/token/refresh
pub async fn refresh<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RefreshRequest>,
) -> AuthResult<Json<RefreshResponse>> {
    let use_case = RefreshTokenUseCase::new(state.repo.clone(), state.config.clone());
    let access_token = use_case.execute(&req.refresh).await?;

    Ok(Json(RefreshResponse { access_token }))
}

// ============================================================================
// Email Verification / Password Reset
// ============================================================================

/// POST /auth/email-verify
pub async fn email_verify<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    client: ClientInfo,
    Json(req): Json<EmailVerifyRequest>,
) -> AuthResult<Json<DetailResponse>> {
    let use_case = VerifyEmailUseCase::new(state.repo.clone());
    use_case.execute(&req.token, &client).await?;

    Ok(Json(DetailResponse::new("Email verified")))
}

/// POST /auth/password-reset
pub async fn password_reset<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<PasswordResetRequest>,
) -> AuthResult<Json<DetailResponse>> {
    let use_case =
        RequestPasswordResetUseCase::new(state.repo.clone(), state.config.clone(), state.jobs.clone());
    use_case.execute(&req.email).await?;

    Ok(Json(DetailResponse::new(
        "If the email exists, a reset link was sent.",
    )))
}

/// POST /auth/password-reset/confirm
pub async fn password_reset_confirm<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    client: ClientInfo,
    Json(req): Json<PasswordResetConfirmRequest>,
) -> AuthResult<Json<DetailResponse>> {
    let use_case = ConfirmPasswordResetUseCase::new(state.repo.clone(), state.config.clone());

    let input = ConfirmPasswordResetInput {
        uid: req.uid,
        token: req.token,
        new_password: req.new_password,
    };
    use_case.execute(input, &client).await?;

    Ok(Json(DetailResponse::new("Password has been reset.")))
}

// ============================================================================
// Me
// ============================================================================

/// GET /users/me
pub async fn me<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireUser(principal): RequireUser,
) -> AuthResult<Json<MeResponse>> {
    let (user, profile) = ProfileUseCase::new(state.repo.clone())
        .me(principal.user_id)
        .await?;

    Ok(Json(MeResponse::new(&user, &profile)))
}

/// PUT /users/me
pub async fn me_replace<R: AuthStore>(
    state: State<AuthAppState<R>>,
    principal: RequireUser,
    Json(req): Json<MeUpdateRequest>,
) -> AuthResult<Json<MeResponse>> {
    update_me(state, principal, req, UpdateMode::Replace).await
}

/// PATCH /users/me
pub async fn me_patch<R: AuthStore>(
    state: State<AuthAppState<R>>,
    principal: RequireUser,
    Json(req): Json<MeUpdateRequest>,
) -> AuthResult<Json<MeResponse>> {
    update_me(state, principal, req, UpdateMode::Partial).await
}

async fn update_me<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireUser(principal): RequireUser,
    req: MeUpdateRequest,
    mode: UpdateMode,
) -> AuthResult<Json<MeResponse>> {
    let (user, profile) = ProfileUseCase::new(state.repo.clone())
        .update(principal.user_id, req.into(), mode)
        .await?;

    Ok(Json(MeResponse::new(&user, &profile)))
}

/// POST /users/me/export
pub async fn request_export<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireUser(principal): RequireUser,
    client: ClientInfo,
) -> AuthResult<impl IntoResponse> {
    AccountUseCase::new(state.repo.clone(), state.config.clone(), state.jobs.clone())
        .request_export(principal.user_id, &client)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DetailResponse::new("Export scheduled.")),
    ))
}

/// DELETE /users/me
pub async fn request_deletion<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireUser(principal): RequireUser,
    client: ClientInfo,
) -> AuthResult<impl IntoResponse> {
    AccountUseCase::new(state.repo.clone(), state.config.clone(), state.jobs.clone())
        .request_deletion(principal.user_id, &client)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DetailResponse::new("Account deletion scheduled.")),
    ))
}

// ============================================================================
// Public Users
// ============================================================================

/// GET /users
pub async fn list_users<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Query(params): Query<PageParams>,
) -> AuthResult<Json<Page<UserPublicResponse>>> {
    let page = ProfileUseCase::new(state.repo.clone())
        .list_public(PageRequest::from(params))
        .await?;

    Ok(Json(page.map(UserPublicResponse::from)))
}

/// GET /users/{id}
pub async fn get_user<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Path(user_id): Path<UserId>,
) -> AuthResult<Json<UserPublicResponse>> {
    let user = ProfileUseCase::new(state.repo.clone())
        .get_public(user_id)
        .await?;

    Ok(Json(UserPublicResponse::from(user)))
}

// ============================================================================
// Two-Factor
// ============================================================================

fn two_factor<R: AuthStore>(state: &AuthAppState<R>) -> TwoFactorUseCase<R> {
    TwoFactorUseCase::new(state.repo.clone(), state.config.clone())
}

/// GET /users/me/2fa
pub async fn list_devices<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireUser(principal): RequireUser,
) -> AuthResult<Json<Vec<DeviceResponse>>> {
    let devices = two_factor(&state).list(principal.user_id).await?;

    Ok(Json(devices.into_iter().map(DeviceResponse::from).collect()))
}

/// POST /users/me/2fa
pub async fn initiate_two_factor<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireUser(principal): RequireUser,
) -> AuthResult<Json<EnrollmentResponse>> {
    let user = state
        .repo
        .find_by_id(principal.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;
    let output = two_factor(&state).initiate(&user).await?;

    Ok(Json(EnrollmentResponse {
        otpauth_uri: output.otpauth_uri,
        secret: output.secret,
        device_id: output.device_id,
        qr_code: output.qr_code,
    }))
}

/// POST /users/me/2fa/confirm
pub async fn confirm_two_factor<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireUser(principal): RequireUser,
    client: ClientInfo,
    Json(req): Json<ConfirmDeviceRequest>,
) -> AuthResult<Json<DetailResponse>> {
    two_factor(&state)
        .confirm(principal.user_id, req.device_id, &req.code, &client)
        .await?;

    Ok(Json(DetailResponse::new("2FA enabled")))
}

/// DELETE /users/me/2fa
pub async fn disable_two_factor<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireUser(principal): RequireUser,
    client: ClientInfo,
    Json(req): Json<DisableTwoFactorRequest>,
) -> AuthResult<StatusCode> {
    two_factor(&state)
        .disable(principal.user_id, req.password, &client)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /users/me/2fa/backup-codes
pub async fn regenerate_backup_codes<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireUser(principal): RequireUser,
    client: ClientInfo,
    body: Bytes,
) -> AuthResult<Json<BackupCodesResponse>> {
    let req: BackupCodesRequest = if body.is_empty() {
        BackupCodesRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| AuthError::validation("count", "A valid integer is required."))?
    };

    let codes = two_factor(&state)
        .regenerate_backup_codes(principal.user_id, req.count, &client)
        .await?;

    Ok(Json(BackupCodesResponse { codes }))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /admin/audit-logs
pub async fn list_audit_logs<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Query(params): Query<PageParams>,
) -> AuthResult<Json<Page<AuditLog>>> {
    let page = SecurityLogQuery::new(state.repo.clone())
        .audit_logs(PageRequest::from(params))
        .await?;

    Ok(Json(page))
}

/// GET /admin/login-history
pub async fn list_login_history<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    RequireStaff(_staff): RequireStaff,
    Query(query): Query<LoginHistoryQuery>,
) -> AuthResult<Json<Page<LoginHistory>>> {
    let page = SecurityLogQuery::new(state.repo.clone())
        .login_history(query.user_id, PageRequest::new(query.page, query.page_size))
        .await?;

    Ok(Json(page))
}
