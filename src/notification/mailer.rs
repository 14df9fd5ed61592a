use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

/// A plain-text message for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl MailMessage {
    pub fn verification_code(to: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your Verification Code".to_string(),
            text: format!(
                "Your verification code is: {}. It will expire in 2 minutes.",
                code
            ),
        }
    }
}

/// Outbound mail transport. Delivery is attempted once; the result is success or failure.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()>;
}

#[derive(Serialize)]
struct SendMailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Delivers through an HTTP mail API: POST `{"from","to","subject","text"}`.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: Option<String>, from: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Ideabox-Mailer/1.0")
            .build()
            .context("failed to build mail HTTP client")?;
        Ok(Self {
            client,
            api_url,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl MailSender for HttpMailer {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        let body = SendMailBody {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
        };

        let mut req = self.client.post(&self.api_url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.context("failed to reach mail API")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("mail API returned error: status={}, body={}", status, body);
        }

        tracing::info!(to = %message.to, subject = %message.subject, "mail delivered");
        Ok(())
    }
}

/// Transport used when no mail API is configured: logs instead of sending.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl MailSender for LogMailer {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        tracing::warn!(
            to = %message.to,
            subject = %message.subject,
            "no mail API configured, message not delivered"
        );
        tracing::debug!(to = %message.to, text = %message.text, "undelivered mail body");
        Ok(())
    }
}
