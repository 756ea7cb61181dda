//! Generic JSON webhook channel.

use async_trait::async_trait;
use serde_json::json;

use crate::{Notifier, NotifyError, NotifyResult, WebhookConfig};

/// Posts `{"text": "..."}` to a configured URL. The shape matches what
/// Slack-compatible incoming webhooks accept.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, config: &WebhookConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn channel(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, message: &str) -> NotifyResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "text": message }))
            .send()
            .await
            .map_err(|e| NotifyError::delivery(self.channel(), e.to_string()))?;

        response
            .error_for_status()
            .map_err(|e| NotifyError::delivery(self.channel(), e.to_string()))?;
        Ok(())
    }
}
