//! Notification channel configuration.

use serde::Deserialize;

/// Channel settings block from the watchdog configuration file. Channels
/// are independent; any subset may be configured and each carries its own
/// enabled flag so a destination can be parked without deleting it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub bot_token: String,
    pub chat_id: String,
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: NotificationsConfig = serde_yaml::from_str(
            r#"
            webhook:
              url: "https://hooks.example.com/warden"
            telegram:
              enabled: false
              bot_token: "123:abc"
              chat_id: "-100200300"
            "#,
        )
        .unwrap();

        let webhook = config.webhook.unwrap();
        assert!(webhook.enabled);
        assert_eq!(webhook.url, "https://hooks.example.com/warden");

        let telegram = config.telegram.unwrap();
        assert!(!telegram.enabled);
        assert_eq!(telegram.chat_id, "-100200300");
    }

    #[test]
    fn test_empty_config() {
        let config: NotificationsConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.webhook.is_none());
        assert!(config.telegram.is_none());
    }
}
