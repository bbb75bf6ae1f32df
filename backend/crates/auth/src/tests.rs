//! HTTP flow tests for the auth crate
//!
//! Every test drives the real router through `oneshot` with the in-memory
//! repository, the bearer middleware and a detached job queue whose receiver
//! stands in for the mailer.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::middleware::from_fn_with_state;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use kernel::id::UserId;
use platform::tasks::TaskQueue;

use crate::application::AuthJob;
use crate::application::config::AuthConfig;
use crate::domain::entity::two_factor::BackupCodeRecord;
use crate::domain::repository::TwoFactorRepository;
use crate::domain::value_object::backup_code::BackupCode;
use crate::domain::value_object::totp_secret::TotpSecret;
use crate::infra::InMemoryAuthRepository;
use crate::presentation::middleware::{AuthMiddlewareState, authenticate};
use crate::presentation::router::auth_router_generic;

const PASSWORD: &str = "Velvet-Otter-42!";

struct TestApp {
    router: Router,
    repo: InMemoryAuthRepository,
    jobs: mpsc::Receiver<AuthJob>,
}

impl TestApp {
    fn new() -> Self {
        let repo = InMemoryAuthRepository::new();
        let config = Arc::new(AuthConfig::with_random_secret());
        let (queue, jobs) = TaskQueue::detached("auth-test", 64);

        let shared = Arc::new(repo.clone());
        let router = auth_router_generic(shared.clone(), config.clone(), queue).layer(
            from_fn_with_state(
                AuthMiddlewareState::new(shared, config),
                authenticate::<InMemoryAuthRepository>,
            ),
        );

        Self { router, repo, jobs }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn post(&self, uri: &str, bearer: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, bearer, Some(body)).await
    }

    async fn get(&self, uri: &str, bearer: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, bearer, None).await
    }

    /// Register and return (user id, verification token).
    async fn register(&mut self, email: &str, username: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({"email": email, "username": username, "password": PASSWORD}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        let token = match self.jobs.try_recv() {
            Ok(AuthJob::SendVerificationEmail { token, .. }) => token,
            other => panic!("expected verification mail, got {other:?}"),
        };
        (body["id"].as_str().unwrap().to_string(), token)
    }

    async fn login(&self, identifier: &str, totp_code: Option<&str>) -> (StatusCode, Value) {
        let mut body = json!({"email_or_username": identifier, "password": PASSWORD});
        if let Some(code) = totp_code {
            body["totp_code"] = json!(code);
        }
        self.post("/auth/login", None, body).await
    }

    async fn access_token(&self, identifier: &str) -> String {
        let (status, body) = self.login(identifier, None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Enroll and confirm a TOTP device; returns the base32 secret.
    async fn enable_totp(&self, access: &str) -> TotpSecret {
        let (status, enrollment) = self.post("/users/me/2fa", Some(access), json!({})).await;
        assert_eq!(status, StatusCode::OK, "{enrollment}");
        let secret = TotpSecret::from_base32(enrollment["secret"].as_str().unwrap()).unwrap();

        let (status, body) = self
            .post(
                "/users/me/2fa/confirm",
                Some(access),
                json!({
                    "device_id": enrollment["device_id"],
                    "code": secret.generate_current().unwrap(),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        secret
    }

    async fn count_audits(&self, action: &str) -> usize {
        self.repo
            .audit_actions()
            .await
            .iter()
            .filter(|a| a.as_str() == action)
            .count()
    }
}

#[tokio::test]
async fn test_register_then_verify_once() {
    let mut app = TestApp::new();
    let (_, token) = app.register("ada@example.com", "ada").await;

    let (status, body) = app
        .post("/auth/email-verify", None, json!({"token": token}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Email verified");

    let (status, body) = app
        .post("/auth/email-verify", None, json!({"token": token}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid token");

    let access = app.access_token("ada").await;
    let (_, me) = app.get("/users/me", Some(&access)).await;
    assert_eq!(me["email_verified"], true);
    assert_eq!(app.count_audits("email_verify").await, 1);
}

#[tokio::test]
async fn test_expired_verification_token() {
    let mut app = TestApp::new();
    let (_, token) = app.register("bob@example.com", "bob").await;
    app.repo.expire_verification_tokens().await;

    let (status, body) = app
        .post("/auth/email-verify", None, json!({"token": token}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Token expired");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_weak_passwords() {
    let mut app = TestApp::new();
    app.register("cy@example.com", "cy").await;

    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({"email": "cy@EXAMPLE.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["email"].is_array(), "{body}");

    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({"email": "other@example.com", "username": "cy", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["username"].is_array(), "{body}");

    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({"email": "short@example.com", "password": "abc"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["password"].is_array(), "{body}");
}

#[tokio::test]
async fn test_register_missing_field_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/auth/register", None, json!({"email": "zed@example.com", "username": "zed"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["status"], 400);
    assert_eq!(body["errors"]["password"][0], "This field is required.");

    let (status, body) = app.post("/auth/login", None, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert!(body["errors"].is_object(), "{body}");
}

#[tokio::test]
async fn test_login_bad_credentials_is_uniform() {
    let mut app = TestApp::new();
    app.register("dee@example.com", "dee").await;

    let (status, wrong_password) = app
        .post(
            "/auth/login",
            None,
            json!({"email_or_username": "dee", "password": "not-the-password"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, unknown_user) = app
        .post(
            "/auth/login",
            None,
            json!({"email_or_username": "nobody@example.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password["detail"], unknown_user["detail"]);
    assert_eq!(app.repo.login_history_len().await, 2);
}

#[tokio::test]
async fn test_login_by_email_or_username() {
    let mut app = TestApp::new();
    app.register("eve@example.com", "eve").await;

    let (status, body) = app.login("eve@EXAMPLE.com", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["username"], "eve");

    let (status, _) = app.login("eve", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.count_audits("login_success").await, 2);
}

#[tokio::test]
async fn test_unconfirmed_device_does_not_require_second_factor() {
    let mut app = TestApp::new();
    app.register("fay@example.com", "fay").await;
    let access = app.access_token("fay").await;

    let (status, _) = app.post("/users/me/2fa", Some(&access), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.login("fay", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_totp_code_is_rejected_and_logged() {
    let mut app = TestApp::new();
    app.register("gus@example.com", "gus").await;
    let access = app.access_token("gus").await;
    let secret = app.enable_totp(&access).await;
    let history_before = app.repo.login_history_len().await;

    let (status, body) = app.login("gus", Some("000000")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "2FA code required or invalid");
    assert_eq!(app.repo.login_history_len().await, history_before + 1);
    assert_eq!(app.count_audits("login_failed").await, 1);

    let (status, _) = app.login("gus", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let code = secret.generate_current().unwrap();
    let (status, _) = app.login("gus", Some(&code)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_device_cannot_be_confirmed_twice() {
    let mut app = TestApp::new();
    app.register("hal@example.com", "hal").await;
    let access = app.access_token("hal").await;

    let (_, enrollment) = app.post("/users/me/2fa", Some(&access), json!({})).await;
    let secret = TotpSecret::from_base32(enrollment["secret"].as_str().unwrap()).unwrap();
    let confirm = json!({
        "device_id": enrollment["device_id"],
        "code": secret.generate_current().unwrap(),
    });

    let (status, _) = app
        .post("/users/me/2fa/confirm", Some(&access), confirm.clone())
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post("/users/me/2fa/confirm", Some(&access), confirm)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Device not found");
    assert_eq!(app.count_audits("2fa_enabled").await, 1);
}

#[tokio::test]
async fn test_backup_code_works_once() {
    let mut app = TestApp::new();
    app.register("ivy@example.com", "ivy").await;
    let access = app.access_token("ivy").await;
    app.enable_totp(&access).await;

    let (status, body) = app
        .post("/users/me/2fa/backup-codes", Some(&access), json!({"count": 2}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let codes = body["codes"].as_array().unwrap();
    assert_eq!(codes.len(), 2);
    let code = codes[0].as_str().unwrap();

    let (status, _) = app.login("ivy", Some(code)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.login("ivy", Some(code)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post("/users/me/2fa/backup-codes", Some(&access), json!({"count": 21}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["count"].is_array(), "{body}");
}

#[tokio::test]
async fn test_wrong_backup_code_consumes_nothing() {
    let mut app = TestApp::new();
    let (user_id, _) = app.register("kit@example.com", "kit").await;
    let user_id: UserId = user_id.parse().unwrap();
    let access = app.access_token("kit").await;
    app.enable_totp(&access).await;

    let (status, body) = app
        .post("/users/me/2fa/backup-codes", Some(&access), json!({"count": 3}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let code = body["codes"][0].as_str().unwrap().to_string();
    assert_eq!(app.repo.count_unused_backup_codes(user_id).await.unwrap(), 3);

    let (status, _) = app.login("kit", Some("zzzzzzzz")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.repo.count_unused_backup_codes(user_id).await.unwrap(), 3);

    let (status, _) = app.login("kit", Some(&code)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.repo.count_unused_backup_codes(user_id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_concurrent_backup_code_redeem_succeeds_once() {
    let repo = InMemoryAuthRepository::new();
    let user_id = UserId::new();
    let hash = BackupCode::generate().hash(b"backup-code-key");
    repo.replace_backup_codes(user_id, &[BackupCodeRecord::new(user_id, hash.clone())])
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        repo.redeem_backup_code(user_id, &hash),
        repo.redeem_backup_code(user_id, &hash),
    );
    let mut redeemed = [first.unwrap(), second.unwrap()];
    redeemed.sort();
    assert_eq!(redeemed, [false, true]);
    assert_eq!(repo.count_unused_backup_codes(user_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_disable_two_factor_requires_password() {
    let mut app = TestApp::new();
    app.register("jon@example.com", "jon").await;
    let access = app.access_token("jon").await;
    app.enable_totp(&access).await;

    let (status, _) = app
        .call(
            Method::DELETE,
            "/users/me/2fa",
            Some(&access),
            Some(json!({"password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            Method::DELETE,
            "/users/me/2fa",
            Some(&access),
            Some(json!({"password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.login("jon", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.count_audits("2fa_disabled").await, 1);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let mut app = TestApp::new();
    app.register("kim@example.com", "kim").await;

    let (status, unknown) = app
        .post("/auth/password-reset", None, json!({"email": "ghost@example.com"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.jobs.try_recv().is_err());

    let (status, known) = app
        .post("/auth/password-reset", None, json!({"email": "kim@example.com"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unknown, known);

    let (uid, token) = match app.jobs.try_recv() {
        Ok(AuthJob::SendPasswordReset { uid, token, .. }) => (uid.to_string(), token),
        other => panic!("expected reset mail, got {other:?}"),
    };

    let (status, _) = app
        .post(
            "/auth/password-reset/confirm",
            None,
            json!({"uid": uid, "token": "forged", "new_password": "Fresh-Marble-77"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/auth/password-reset/confirm",
            None,
            json!({"uid": uid, "token": token, "new_password": "Fresh-Marble-77"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // The token is bound to the old password hash
    let (status, _) = app
        .post(
            "/auth/password-reset/confirm",
            None,
            json!({"uid": uid, "token": token, "new_password": "Another-Marble-88"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.login("kim", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post(
            "/auth/login",
            None,
            json!({"email_or_username": "kim", "password": "Fresh-Marble-77"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_then_logout_revokes_session() {
    let mut app = TestApp::new();
    app.register("lea@example.com", "lea").await;
    let (_, login) = app.login("lea", None).await;
    let access = login["access_token"].as_str().unwrap();
    let refresh = login["refresh_token"].as_str().unwrap();

    let (status, body) = app
        .post("/auth/token/refresh", None, json!({"refresh": refresh}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());

    let (status, _) = app
        .post("/auth/logout", Some(access), json!({"refresh": refresh}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .post("/auth/token/refresh", None, json!({"refresh": refresh}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The session behind the access token is gone too
    let (status, _) = app.get("/users/me", Some(access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_body_is_no_content() {
    let mut app = TestApp::new();
    app.register("max@example.com", "max").await;
    let access = app.access_token("max").await;

    let (status, _) = app.call(Method::POST, "/auth/logout", Some(&access), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.call(Method::POST, "/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_patch_keeps_and_put_resets() {
    let mut app = TestApp::new();
    app.register("ned@example.com", "ned").await;
    let access = app.access_token("ned").await;

    let (status, body) = app
        .call(
            Method::PATCH,
            "/users/me",
            Some(&access),
            Some(json!({"first_name": "Ned", "profile": {"bio": "Writes about tea."}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["first_name"], "Ned");
    assert_eq!(body["profile"]["bio"], "Writes about tea.");

    let (status, body) = app
        .call(
            Method::PATCH,
            "/users/me",
            Some(&access),
            Some(json!({"last_name": "Stark"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ned");
    assert_eq!(body["profile"]["bio"], "Writes about tea.");

    let (status, body) = app
        .call(
            Method::PUT,
            "/users/me",
            Some(&access),
            Some(json!({"username": "ned"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "");
    assert_eq!(body["username"], "ned");
}

#[tokio::test]
async fn test_public_users_listing() {
    let mut app = TestApp::new();
    let (id, _) = app.register("ola@example.com", "ola").await;
    app.register("pat@example.com", "pat").await;

    let (status, body) = app.get("/users?page_size=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["next"], 2);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);

    let (status, _) = app.get("/users?page=9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get(&format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ola");
}

#[tokio::test]
async fn test_admin_routes_require_staff() {
    let mut app = TestApp::new();
    let (id, _) = app.register("quinn@example.com", "quinn").await;
    let access = app.access_token("quinn").await;

    let (status, _) = app.get("/admin/audit-logs", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/admin/audit-logs", Some(&access)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.repo.set_staff(id.parse().unwrap(), true).await;

    let (status, body) = app.get("/admin/audit-logs", Some(&access)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["count"].as_u64().unwrap() >= 1);

    let (status, body) = app
        .get(&format!("/admin/login-history?user_id={id}"), Some(&access))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_export_and_deletion_are_queued() {
    let mut app = TestApp::new();
    app.register("rae@example.com", "rae").await;
    let access = app.access_token("rae").await;

    let (status, _) = app.post("/users/me/export", Some(&access), json!({})).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(matches!(
        app.jobs.try_recv(),
        Ok(AuthJob::ExportAccountData { .. })
    ));

    let (status, _) = app.call(Method::DELETE, "/users/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(matches!(
        app.jobs.try_recv(),
        Ok(AuthJob::DeactivateAccount { .. })
    ));
    assert_eq!(app.count_audits("export_requested").await, 1);
    assert_eq!(app.count_audits("delete_requested").await, 1);
}
