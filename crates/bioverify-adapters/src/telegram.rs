//! Telegram bot notifier.

use async_trait::async_trait;
use bioverify_core::{NotificationError, Notifier};
use serde_json::json;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

/// Sends Markdown messages to one chat. Without credentials every message
/// is logged and dropped.
pub struct TelegramNotifier {
    api_base: String,
    credentials: Option<TelegramCredentials>,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(
        api_base: impl Into<String>,
        credentials: Option<TelegramCredentials>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
            client,
        }
    }

    fn send_url(&self, credentials: &TelegramCredentials) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, credentials.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        let Some(credentials) = &self.credentials else {
            warn!("telegram credentials missing, notification skipped");
            return Ok(());
        };
        debug!(chars = message.chars().count(), "sending notification");

        let response = self
            .client
            .post(self.send_url(credentials))
            .json(&json!({
                "chat_id": credentials.chat_id,
                "text": message,
                "parse_mode": "Markdown",
            }))
            .send()
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Http(status.as_u16()));
        }
        Ok(())
    }
}
