//! Account Lifecycle Use Cases
//!
//! Data export, deletion requests and the staff view of the security logs.

use std::sync::Arc;

use kernel::id::UserId;
use kernel::pagination::{Page, PageRequest};
use platform::client::ClientInfo;
use platform::tasks::TaskQueue;

use crate::application::config::AuthConfig;
use crate::application::jobs::AuthJob;
use crate::domain::entity::security_log::{AuditAction, AuditLog, LoginHistory};
use crate::domain::repository::SecurityLogRepository;
use crate::error::{AuthError, AuthResult};

pub struct AccountUseCase<R: SecurityLogRepository> {
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    jobs: TaskQueue<AuthJob>,
}

impl<R: SecurityLogRepository> AccountUseCase<R> {
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>, jobs: TaskQueue<AuthJob>) -> Self {
        Self { repo, config, jobs }
    }

    pub async fn request_export(&self, user_id: UserId, client: &ClientInfo) -> AuthResult<()> {
        self.repo
            .record_audit(&AuditLog::new(
                AuditAction::ExportRequested,
                Some(user_id),
                Some(client),
                serde_json::json!({}),
            ))
            .await?;
        self.jobs.dispatch(AuthJob::ExportAccountData { user_id });
        tracing::info!(user_id = %user_id, "Account export scheduled");
        Ok(())
    }

    pub async fn request_deletion(&self, user_id: UserId, client: &ClientInfo) -> AuthResult<()> {
        self.repo
            .record_audit(&AuditLog::new(
                AuditAction::DeleteRequested,
                Some(user_id),
                Some(client),
                serde_json::json!({ "grace_days": self.config.deletion_grace_days }),
            ))
            .await?;
        self.jobs.dispatch(AuthJob::DeactivateAccount { user_id });
        tracing::info!(user_id = %user_id, "Account deletion scheduled");
        Ok(())
    }
}

/// Read-only staff queries over the security logs.
pub struct SecurityLogQuery<R: SecurityLogRepository> {
    repo: Arc<R>,
}

impl<R: SecurityLogRepository> SecurityLogQuery<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn audit_logs(&self, page: PageRequest) -> AuthResult<Page<AuditLog>> {
        let (rows, total) = self.repo.list_audit_logs(page).await?;
        if page.is_out_of_range(total) {
            return Err(AuthError::InvalidPage);
        }
        Ok(Page::new(rows, total, page))
    }

    pub async fn login_history(
        &self,
        user_id: Option<UserId>,
        page: PageRequest,
    ) -> AuthResult<Page<LoginHistory>> {
        let (rows, total) = self.repo.list_login_history(user_id, page).await?;
        if page.is_out_of_range(total) {
            return Err(AuthError::InvalidPage);
        }
        Ok(Page::new(rows, total, page))
    }
}
