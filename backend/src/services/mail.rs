//! Outbound mail delivery
//!
//! The auth core only needs "send this message to this address". The HTTP
//! provider posts to a transactional mail API; the log provider is the
//! development default and never leaves the process.

use crate::config::{ConfigError, MailConfig, MailProvider};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Mail delivery failure
#[derive(Error, Debug)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Mail delivery collaborator
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}

/// Writes messages to the log instead of delivering them
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        info!(to, subject, "Mail delivery disabled, message logged only");
        debug!(body = html_body, "Undelivered mail body");
        Ok(())
    }
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Delivers messages through an HTTP mail API
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
    from: String,
}

impl HttpMailer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<SecretString>,
        from: impl Into<String>,
    ) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            from: from.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        let mut request = self.client.post(&self.endpoint).json(&OutboundMessage {
            from: &self.from,
            to,
            subject,
            html: html_body,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to, subject, "Mail accepted by provider");
        Ok(())
    }
}

/// Build the configured mailer
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, ConfigError> {
    match config.provider {
        MailProvider::Log => Ok(Arc::new(LogMailer)),
        MailProvider::Http => {
            let endpoint = config
                .api_url
                .clone()
                .filter(|url| !url.is_empty())
                .ok_or(ConfigError::MissingMailEndpoint)?;
            let mailer = HttpMailer::new(endpoint, config.api_key.clone(), config.from.clone())
                .map_err(|e| ConfigError::MailClient(e.to_string()))?;
            Ok(Arc::new(mailer))
        }
    }
}

/// Render the password-reset message body
pub fn render_reset_email(reset_link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta http-equiv="Content-Type" content="text/html; charset=UTF-8" /><title>Forgot Password</title></head>
<body style="background-color: #FFFFFF; padding: 0; margin: 0; font-family: Arial;">
<h2 style="color: #121481;">FORGOT PASSWORD</h2>
<p>We have sent you this email in response to your request to reset your password on the job board.</p>
<p>To reset your password, please follow the link below:</p>
<p><a href="{reset_link}" style="color: #272727;">Reset Password</a></p>
<p>The link expires shortly. If you did not request this, simply ignore this message.</p>
</body>
</html>"#
    )
}

/// Append the reset token to the frontend link
pub fn reset_link(base: &str, token: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}token={token}")
}
