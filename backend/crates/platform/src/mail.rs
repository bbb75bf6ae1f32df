//! Outbound mail
//!
//! Delivery is best-effort. Callers run inside background jobs and log
//! failures instead of surfacing them.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail endpoint rejected message with status {0}")]
    Rejected(u16),
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

#[async_trait::async_trait]
impl<M: Mailer + ?Sized> Mailer for Arc<M> {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        (**self).send(email).await
    }
}

/// Writes messages to the log instead of sending them (development).
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "Outbound email (log transport)"
        );
        Ok(())
    }
}

/// POSTs each message as JSON to an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct WebhookMailer {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookMailer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait::async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&email)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);
        let email = Email {
            to: "reader@example.com".to_string(),
            subject: "Verify your email".to_string(),
            body: "token".to_string(),
        };
        assert!(mailer.send(email).await.is_ok());
    }

    #[tokio::test]
    async fn test_webhook_mailer_reports_transport_errors() {
        // Nothing listens on port 9 (discard) in the test environment
        let mailer = WebhookMailer::new("http://127.0.0.1:9/mail");
        let email = Email {
            to: "reader@example.com".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        assert!(matches!(
            mailer.send(email).await,
            Err(MailError::Transport(_))
        ));
    }
}
