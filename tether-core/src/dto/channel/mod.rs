//! Notification channel DTOs

use serde::{Deserialize, Serialize};

/// Notification channel configuration returned by `GET /channels`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelConfig {
    /// Address of the notification service (e.g., "wss://push.example.com/subscribe")
    pub endpoint: String,

    /// Key presented to the notification service, if it requires one
    #[serde(default)]
    pub auth_key: Option<String>,

    /// Channels the caller is allowed to subscribe to
    #[serde(default)]
    pub channels: Vec<Channel>,
}

/// A single notification channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
}

impl ChannelConfig {
    /// Names of all channels, in the order the platform listed them
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_config() {
        let json = r#"{
            "endpoint": "wss://push.example.com/subscribe",
            "authKey": "secret",
            "channels": [{"name": "jobs:1"}, {"name": "runs:1"}]
        }"#;

        let config: ChannelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.endpoint, "wss://push.example.com/subscribe");
        assert_eq!(config.auth_key.as_deref(), Some("secret"));
        assert_eq!(config.channel_names(), vec!["jobs:1", "runs:1"]);
    }

    #[test]
    fn test_optional_fields_default() {
        let config: ChannelConfig =
            serde_json::from_str(r#"{"endpoint": "ws://localhost:9000"}"#).unwrap();
        assert!(config.auth_key.is_none());
        assert!(config.channels.is_empty());
    }
}
