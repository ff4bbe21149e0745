//! Messaging configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::message::Tags;

/// Default application name tag value
pub const DEFAULT_APP_NAME: &str = "Linkspace";

/// Default application version tag value
pub const DEFAULT_APP_VERSION: &str = "1.0.0";

/// Configuration for a [`MessagingClient`](crate::MessagingClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Value of the `App-Name` tag on every outgoing message
    pub app_name: String,
    /// Value of the `App-Version` tag on every outgoing message
    pub app_version: String,
    /// How long `await_result` waits before reporting a timeout
    pub result_timeout: Duration,
    /// Interval between result polls
    pub poll_interval: Duration,
    /// Default page size for result listings
    pub page_size: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            result_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
            page_size: 100,
        }
    }
}

impl MessagingConfig {
    /// Short timeouts for tests
    pub fn testing() -> Self {
        Self {
            result_timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(5),
            page_size: 10,
            ..Default::default()
        }
    }

    pub fn with_result_timeout(mut self, timeout: Duration) -> Self {
        self.result_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Tags prepended to every outgoing message
    pub fn common_tags(&self) -> Tags {
        Tags::new()
            .with("App-Name", self.app_name.clone())
            .with("App-Version", self.app_version.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_tags() {
        let tags = MessagingConfig::default().common_tags();
        assert_eq!(tags.get("App-Name"), Some("Linkspace"));
        assert_eq!(tags.get("App-Version"), Some("1.0.0"));
    }

    #[test]
    fn test_page_size_floor() {
        let config = MessagingConfig::default().with_page_size(0);
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MessagingConfig = serde_json::from_str(r#"{"page_size": 5}"#).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.app_name, DEFAULT_APP_NAME);
    }
}
