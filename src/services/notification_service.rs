use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::error::{Error, Result};
use crate::utils::signature::sign_payload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyChannel {
    Email,
    Whatsapp,
    Webhook,
}

/// Outbound notification collaborator. Callers treat delivery as
/// best-effort; see [`notify_detached`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, channel: NotifyChannel, target: &str, payload: &JsonValue) -> Result<()>;
}

/// Posts every notification to a single relay endpoint that fans out to
/// email/WhatsApp.
pub struct WebhookNotifier {
    client: Client,
    target_url: String,
    secret: String,
}

impl WebhookNotifier {
    pub fn new(client: Client, target_url: String, secret: String) -> Self {
        Self {
            client,
            target_url,
            secret,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, channel: NotifyChannel, target: &str, payload: &JsonValue) -> Result<()> {
        let body = serde_json::to_vec(&json!({
            "channel": channel,
            "target": target,
            "payload": payload,
        }))?;
        let signature = sign_payload(&self.secret, &body)?;

        let resp = self
            .client
            .post(&self.target_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("X-Webhook-Secret", &self.secret)
            .header("X-Webhook-Signature", signature)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Unavailable(format!(
                "Notification relay returned {}: {}",
                status, text
            )));
        }
        Ok(())
    }
}

/// Used when no relay URL is configured: notifications are only logged.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, channel: NotifyChannel, target: &str, payload: &JsonValue) -> Result<()> {
        tracing::info!(?channel, %target, %payload, "Notification relay disabled, logging only");
        Ok(())
    }
}

pub fn build_notifier(
    client: Client,
    target_url: Option<String>,
    secret: String,
) -> Arc<dyn Notifier> {
    match target_url {
        Some(url) => {
            tracing::info!("Notification relay enabled, webhook URL: {}", url);
            Arc::new(WebhookNotifier::new(client, url, secret))
        }
        None => {
            tracing::info!("Notification relay disabled (NOTIFY_WEBHOOK_URL not set)");
            Arc::new(LogNotifier)
        }
    }
}

/// Fire-and-forget delivery. Runs on its own task so the caller's response
/// never waits on, or fails because of, the notification channel.
pub fn notify_detached(
    notifier: Arc<dyn Notifier>,
    channel: NotifyChannel,
    target: String,
    payload: JsonValue,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(channel, &target, &payload).await {
            tracing::warn!(error = %e, ?channel, %target, "Notification delivery failed");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detached_failures_are_swallowed() {
        let mut mock = MockNotifier::new();
        mock.expect_notify()
            .times(1)
            .returning(|_, _, _| Err(Error::Unavailable("relay down".into())));

        let handle = notify_detached(
            Arc::new(mock),
            NotifyChannel::Email,
            "ops@client.example".into(),
            json!({ "event": "request_responded" }),
        );
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn detached_delivery_passes_target_and_payload() {
        let mut mock = MockNotifier::new();
        mock.expect_notify()
            .withf(|channel, target, payload| {
                *channel == NotifyChannel::Email
                    && target == "hr@shipco.example"
                    && payload["status"] == "approved"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        notify_detached(
            Arc::new(mock),
            NotifyChannel::Email,
            "hr@shipco.example".into(),
            json!({ "status": "approved" }),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        assert!(LogNotifier
            .notify(NotifyChannel::Webhook, "admins", &json!({}))
            .await
            .is_ok());
    }
}
