//! Telegram bot channel.

use async_trait::async_trait;
use serde_json::json;

use crate::{Notifier, NotifyError, NotifyResult, TelegramConfig};

/// Delivers messages through the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: reqwest::Client,
    url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client, config: &TelegramConfig) -> Self {
        Self {
            client,
            url: format!("https://api.telegram.org/bot{}/sendMessage", config.bot_token),
            chat_id: config.chat_id.clone(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, message: &str) -> NotifyResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "chat_id": self.chat_id, "text": message }))
            .send()
            .await
            .map_err(|e| NotifyError::delivery(self.channel(), e.to_string()))?;

        response
            .error_for_status()
            .map_err(|e| NotifyError::delivery(self.channel(), e.to_string()))?;
        Ok(())
    }
}
