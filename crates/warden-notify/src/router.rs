//! Fan-out of one message to every enabled channel.

use std::time::Duration;

use tracing::{debug, warn};

use crate::{NotificationsConfig, Notifier, TelegramNotifier, WebhookNotifier};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Holds the enabled channels and delivers to all of them. Delivery
/// failures are logged per channel and swallowed; a dead webhook must not
/// affect supervision.
pub struct NotificationRouter {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotificationRouter {
    /// Build the router from the optional config block. A missing block or
    /// all-disabled channels yield a router that silently does nothing.
    pub fn from_config(config: Option<&NotificationsConfig>) -> Self {
        let mut channels: Vec<Box<dyn Notifier>> = Vec::new();

        let Some(config) = config else {
            return Self { channels };
        };

        // One shared client; the timeout bounds every send so a stuck
        // destination cannot stall the supervision loop.
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_default();

        if let Some(webhook) = config.webhook.as_ref().filter(|c| c.enabled) {
            channels.push(Box::new(WebhookNotifier::new(client.clone(), webhook)));
        }
        if let Some(telegram) = config.telegram.as_ref().filter(|c| c.enabled) {
            channels.push(Box::new(TelegramNotifier::new(client.clone(), telegram)));
        }

        Self { channels }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Deliver `message` to every enabled channel.
    pub async fn broadcast(&self, message: &str) {
        for channel in &self.channels {
            match channel.send(message).await {
                Ok(()) => debug!(channel = channel.channel(), "notification delivered"),
                Err(e) => warn!("notification failed: {}", e),
            }
        }
    }
}
