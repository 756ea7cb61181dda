//! # Warden Notify
//!
//! Outbound notification channels. The supervisor reports tracked-state
//! transitions (supervision started, restart triggered, target recovered)
//! through the narrow [`Notifier`] interface; delivery failures are logged
//! by the router and never influence restart decisions.

pub mod config;
pub mod router;
pub mod telegram;
pub mod webhook;

use async_trait::async_trait;
use thiserror::Error;

pub use config::{NotificationsConfig, TelegramConfig, WebhookConfig};
pub use router::NotificationRouter;
pub use telegram::TelegramNotifier;
pub use webhook::WebhookNotifier;

/// Notification delivery error.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("delivery via {channel} failed: {reason}")]
    Delivery { channel: &'static str, reason: String },
}

impl NotifyError {
    pub fn delivery(channel: &'static str, reason: impl Into<String>) -> Self {
        Self::Delivery {
            channel,
            reason: reason.into(),
        }
    }
}

/// Result type for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// One outbound channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logs.
    fn channel(&self) -> &'static str;

    /// Deliver one message.
    async fn send(&self, message: &str) -> NotifyResult<()>;
}
