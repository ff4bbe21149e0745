//! Where log output goes and how much of it

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable naming the OTLP collector
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
/// Environment variable overriding the reported service name
pub const SERVICE_NAME_ENV: &str = "OTEL_SERVICE_NAME";

const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level used when RUST_LOG is unset
    pub level: String,
    pub console: ConsoleFormat,
    pub file: Option<FileConfig>,
    /// Add span lists and source locations to JSONL lines
    pub verbose_jsonl: bool,
    /// Per-crate overrides, e.g. `linkspace_registry = "debug"`
    pub targets: BTreeMap<String, String>,
    /// OTLP span export; off when unset
    pub otel: Option<OtelConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleFormat::Jsonl,
            file: None,
            verbose_jsonl: true,
            targets: BTreeMap::new(),
            otel: None,
        }
    }
}

impl LogConfig {
    /// Debug level, human-readable console
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            console: ConsoleFormat::Pretty,
            ..Default::default()
        }
    }

    /// No console; JSONL files kept for a month, spans exported over OTLP
    pub fn production(log_dir: PathBuf) -> Self {
        Self {
            console: ConsoleFormat::Off,
            file: Some(FileConfig {
                directory: log_dir,
                retain_days: Some(30),
                ..FileConfig::default()
            }),
            otel: Some(OtelConfig::from_env()),
            ..Default::default()
        }
    }

    pub fn testing() -> Self {
        Self {
            level: "warn".to_string(),
            ..Default::default()
        }
    }

    /// The level followed by per-crate overrides, in `EnvFilter` syntax
    pub fn filter_directives(&self) -> String {
        let mut directives = vec![self.level.clone()];
        directives.extend(
            self.targets
                .iter()
                .map(|(target, level)| format!("{}={}", target, level)),
        );
        directives.join(",")
    }
}

/// How events reach stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    Off,
    #[default]
    Jsonl,
    Pretty,
}

/// JSONL written under `directory`
///
/// With `retain_days` unset everything goes to `<prefix>.log`, truncated
/// at startup. Otherwise files rotate daily and only the newest
/// `retain_days` are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub directory: PathBuf,
    pub prefix: String,
    pub retain_days: Option<usize>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            prefix: "linkspace".to_string(),
            retain_days: Some(7),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtelConfig {
    pub endpoint: String,
    pub service_name: String,
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            service_name: "linkspace".to_string(),
        }
    }
}

impl OtelConfig {
    /// Defaults with [`OTLP_ENDPOINT_ENV`] and [`SERVICE_NAME_ENV`] applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = non_empty_env(OTLP_ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        if let Some(name) = non_empty_env(SERVICE_NAME_ENV) {
            config.service_name = name;
        }
        config
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
