use anyhow::Context as _;
use serde::Serialize;

use crate::domain::repository::Notifier;
use crate::domain::types::CodePurpose;

/// Writes codes to the log. Used when no SMS channel is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send_code(&self, phone: &str, code: &str, purpose: CodePurpose) -> anyhow::Result<()> {
        tracing::info!(phone, code, purpose = purpose.as_str(), "no sms channel, code logged only");
        Ok(())
    }
}

#[derive(Serialize)]
struct CodeMessage<'a> {
    phone: &'a str,
    code: &'a str,
    purpose: &'a str,
}

/// POSTs `{phone, code, purpose}` to an SMS gateway.
#[derive(Clone)]
pub struct WebhookNotifier {
    pub client: reqwest::Client,
    pub url: String,
}

impl Notifier for WebhookNotifier {
    async fn send_code(&self, phone: &str, code: &str, purpose: CodePurpose) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(&CodeMessage {
                phone,
                code,
                purpose: purpose.as_str(),
            })
            .send()
            .await
            .context("send code to sms webhook")?
            .error_for_status()
            .context("sms webhook rejected code")?;
        Ok(())
    }
}

/// Notifier picked at startup from configuration.
#[derive(Clone)]
pub enum AppNotifier {
    Log(LogNotifier),
    Webhook(WebhookNotifier),
}

impl AppNotifier {
    pub fn from_webhook_url(url: Option<String>) -> Self {
        match url {
            Some(url) if !url.trim().is_empty() => Self::Webhook(WebhookNotifier {
                client: reqwest::Client::new(),
                url,
            }),
            _ => Self::Log(LogNotifier),
        }
    }
}

impl Notifier for AppNotifier {
    async fn send_code(&self, phone: &str, code: &str, purpose: CodePurpose) -> anyhow::Result<()> {
        match self {
            Self::Log(n) => n.send_code(phone, code, purpose).await,
            Self::Webhook(n) => n.send_code(phone, code, purpose).await,
        }
    }
}
