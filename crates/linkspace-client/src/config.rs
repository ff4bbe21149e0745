//! Configuration and presets for the claim workflow.
//!
//! Defaults target the public registry process and gateway; presets trade
//! responsiveness against tolerance for slow networks.

use std::time::Duration;

use linkspace_messaging::{MessagingConfig, ProcessId};
use linkspace_registry::DEFAULT_TTL_SECONDS;
use linkspace_storage::PublishMode;
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Process holding the name registry
pub const DEFAULT_REGISTRY_PROCESS: &str = "K6237CpdkRfSGLYyfmRby3RNL5dSzjmZDVGCWNnP_oI";

/// Gateway host used for web share links
pub const DEFAULT_GATEWAY: &str = "ar-io.dev";

/// Suffix appended to claimed names in share links
pub const DEFAULT_NAME_SUFFIX: &str = "_linkspace";

/// Environment variable overriding the registry process id
pub const REGISTRY_PROCESS_ENV: &str = "LINKSPACE_REGISTRY_PROCESS";

/// Environment variable overriding the share-link gateway
pub const GATEWAY_ENV: &str = "LINKSPACE_GATEWAY";

/// Preset configurations for common use cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// Balanced defaults.
    #[default]
    Default,
    /// A user is watching a spinner.
    /// - Short result timeout (10s)
    /// - Two attempts
    Interactive,
    /// Slow or flaky networks.
    /// - Long result timeout (2min)
    /// - Five attempts
    Patient,
}

impl Preset {
    /// How long to wait for a remote result.
    pub fn result_timeout(&self) -> Duration {
        match self {
            Preset::Default => Duration::from_secs(30),
            Preset::Interactive => Duration::from_secs(10),
            Preset::Patient => Duration::from_secs(120),
        }
    }

    /// Retry policy for transport failures.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Preset::Default => RetryPolicy::default(),
            Preset::Interactive => {
                RetryPolicy::new(2, Duration::from_millis(250), Duration::from_secs(2))
            }
            Preset::Patient => RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(30)),
        }
    }
}

/// Configuration for a [`ClaimWorkflow`](crate::ClaimWorkflow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Registry process receiving name requests.
    pub registry_process: ProcessId,
    /// TTL sent with record updates.
    pub ttl_seconds: u32,
    /// Who signs uploads.
    pub publish_mode: PublishMode,
    /// Gateway host for web share links.
    pub gateway: String,
    /// Suffix appended to names in share links.
    pub name_suffix: String,
    /// Retry policy for transport failures.
    pub retry: RetryPolicy,
    /// Messaging settings (tags, timeouts, paging).
    pub messaging: MessagingConfig,
    /// Page size when listing every registered name.
    pub list_page_size: usize,
    /// Preset this configuration was derived from.
    pub preset: Preset,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Default)
    }
}

impl ClientConfig {
    /// Create a configuration from a preset.
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            registry_process: ProcessId::new(DEFAULT_REGISTRY_PROCESS),
            ttl_seconds: DEFAULT_TTL_SECONDS,
            publish_mode: PublishMode::default(),
            gateway: DEFAULT_GATEWAY.to_string(),
            name_suffix: DEFAULT_NAME_SUFFIX.to_string(),
            retry: preset.retry_policy(),
            messaging: MessagingConfig::default().with_result_timeout(preset.result_timeout()),
            list_page_size: 100,
            preset,
        }
    }

    /// Short timeouts and near-zero backoff for tests.
    pub fn testing() -> Self {
        Self {
            retry: RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5)),
            messaging: MessagingConfig::testing(),
            list_page_size: 10,
            ..Self::default()
        }
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `LINKSPACE_REGISTRY_PROCESS` and `LINKSPACE_GATEWAY` if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(process) = non_empty_env(REGISTRY_PROCESS_ENV) {
            self.registry_process = ProcessId::new(process);
        }
        if let Some(gateway) = non_empty_env(GATEWAY_ENV) {
            self.gateway = gateway;
        }
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Builder for [`ClientConfig`].
///
/// # Example
///
/// ```ignore
/// let config = ClientBuilder::new()
///     .with_preset(Preset::Interactive)
///     .publish_mode(PublishMode::Anonymous)
///     .gateway("arweave.net")
///     .build_config();
/// ```
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Apply a preset.
    ///
    /// Resets the retry policy and result timeout; call this before the
    /// other setters.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.config.preset = preset;
        self.config.retry = preset.retry_policy();
        self.config.messaging.result_timeout = preset.result_timeout();
        self
    }

    pub fn registry_process(mut self, process: impl Into<String>) -> Self {
        self.config.registry_process = ProcessId::new(process);
        self
    }

    pub fn ttl_seconds(mut self, ttl_seconds: u32) -> Self {
        self.config.ttl_seconds = ttl_seconds;
        self
    }

    pub fn publish_mode(mut self, mode: PublishMode) -> Self {
        self.config.publish_mode = mode;
        self
    }

    pub fn gateway(mut self, gateway: impl Into<String>) -> Self {
        self.config.gateway = gateway.into();
        self
    }

    pub fn name_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.name_suffix = suffix.into();
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    pub fn messaging(mut self, messaging: MessagingConfig) -> Self {
        self.config.messaging = messaging;
        self
    }

    pub fn list_page_size(mut self, page_size: usize) -> Self {
        self.config.list_page_size = page_size.max(1);
        self
    }

    /// Apply environment overrides on top of what was set so far.
    pub fn from_env(mut self) -> Self {
        self.config = self.config.with_env_overrides();
        self
    }

    /// Build the configuration without creating a workflow.
    pub fn build_config(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.registry_process.as_str(), DEFAULT_REGISTRY_PROCESS);
        assert_eq!(config.ttl_seconds, 3600);
        assert_eq!(config.publish_mode, PublishMode::Wallet);
        assert_eq!(config.gateway, "ar-io.dev");
        assert_eq!(config.name_suffix, "_linkspace");
        assert_eq!(config.messaging.result_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_preset_values() {
        assert_eq!(Preset::Interactive.retry_policy().max_attempts, 2);
        assert_eq!(Preset::Patient.retry_policy().max_attempts, 5);
        assert!(Preset::Interactive.result_timeout() < Preset::Patient.result_timeout());
    }

    #[test]
    fn test_builder() {
        let config = ClientBuilder::new()
            .with_preset(Preset::Patient)
            .registry_process("registry-test")
            .publish_mode(PublishMode::Anonymous)
            .gateway("arweave.net")
            .ttl_seconds(900)
            .list_page_size(0)
            .build_config();

        assert_eq!(config.preset, Preset::Patient);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.messaging.result_timeout, Duration::from_secs(120));
        assert_eq!(config.registry_process.as_str(), "registry-test");
        assert_eq!(config.publish_mode, PublishMode::Anonymous);
        assert_eq!(config.gateway, "arweave.net");
        assert_eq!(config.ttl_seconds, 900);
        assert_eq!(config.list_page_size, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"gateway":"g8way.io","ttl_seconds":60}"#).unwrap();
        assert_eq!(config.gateway, "g8way.io");
        assert_eq!(config.ttl_seconds, 60);
        assert_eq!(config.name_suffix, DEFAULT_NAME_SUFFIX);
        assert_eq!(config.retry, RetryPolicy::default());
    }
}
