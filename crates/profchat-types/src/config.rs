//! Client configuration types for profchat.
//!
//! `ClientConfig` represents the top-level `config.toml` that controls the
//! endpoints, the seed greeting, and stream timeouts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chat::DEFAULT_GREETING;

/// Top-level configuration for the profchat client.
///
/// Loaded from `~/.profchat/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Assistant turn every new transcript starts with.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    #[serde(default)]
    pub chat: ChatEndpointConfig,

    #[serde(default)]
    pub analytics: AnalyticsEndpointConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            chat: ChatEndpointConfig::default(),
            analytics: AnalyticsEndpointConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Streaming chat endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEndpointConfig {
    #[serde(default = "default_chat_url")]
    pub url: String,

    /// Fail the exchange if no chunk arrives for this many seconds (0 disables).
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Capacity of the transcript change-notification channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_chat_url() -> String {
    "http://127.0.0.1:3000/api/chat".to_string()
}

fn default_idle_timeout_secs() -> u64 {
    60
}

fn default_event_capacity() -> usize {
    1024
}

impl Default for ChatEndpointConfig {
    fn default() -> Self {
        Self {
            url: default_chat_url(),
            idle_timeout_secs: default_idle_timeout_secs(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl ChatEndpointConfig {
    /// The idle timeout, or `None` when disabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}

/// Analytics side-endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEndpointConfig {
    /// Base URL; `/get_professor_sentiment` and `/get_professor_trends` are appended.
    #[serde(default = "default_analytics_base_url")]
    pub base_url: String,
}

fn default_analytics_base_url() -> String {
    "http://127.0.0.1:5001".to_string()
}

impl Default for AnalyticsEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_analytics_base_url(),
        }
    }
}

/// Shared HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default_values() {
        let config = ClientConfig::default();
        assert_eq!(config.greeting, DEFAULT_GREETING);
        assert_eq!(config.chat.url, "http://127.0.0.1:3000/api/chat");
        assert_eq!(config.chat.idle_timeout_secs, 60);
        assert_eq!(config.chat.event_capacity, 1024);
        assert_eq!(config.analytics.base_url, "http://127.0.0.1:5001");
        assert_eq!(config.http.connect_timeout_secs, 10);
    }

    #[test]
    fn test_client_config_deserialize_empty() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_client_config_deserialize_partial() {
        let toml_str = r#"
greeting = "Hello there"

[chat]
url = "https://chat.example.com/api/chat"
idle_timeout_secs = 0
"#;
        let config: ClientConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.greeting, "Hello there");
        assert_eq!(config.chat.url, "https://chat.example.com/api/chat");
        assert!(config.chat.idle_timeout().is_none());
        // Untouched sections keep their defaults.
        assert_eq!(config.chat.event_capacity, 1024);
        assert_eq!(config.analytics.base_url, "http://127.0.0.1:5001");
    }

    #[test]
    fn test_idle_timeout_enabled() {
        let chat = ChatEndpointConfig {
            idle_timeout_secs: 5,
            ..Default::default()
        };
        assert_eq!(chat.idle_timeout(), Some(Duration::from_secs(5)));
    }
}
