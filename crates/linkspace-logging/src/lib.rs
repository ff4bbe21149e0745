//! JSONL logging with identity context and OpenTelemetry support for Linkspace
//!
//! # Features
//!
//! - **JSONL Output**: structured JSON lines for log aggregation (default)
//! - **Identity Context**: attribute spans to the acting identity
//! - **Correlation IDs**: tie a workflow run to the remote messages it sent
//! - **OpenTelemetry Integration**: OTLP span export
//! - **File Output**: a single file, or daily files with bounded retention
//!
//! # Quick Start
//!
//! ```ignore
//! use linkspace_logging::{LinkspaceSubscriberBuilder, LogConfig};
//!
//! // JSONL to the console
//! let _guard = LinkspaceSubscriberBuilder::new().try_init()?;
//!
//! // Pretty output while developing
//! let _guard = LinkspaceSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .try_init()?;
//! ```
//!
//! Keep the returned guard alive while logging to a file; dropping it
//! flushes and stops the background writer.

pub mod config;
pub mod context;
pub mod correlation;
pub mod error;
pub mod layers;
pub mod otel;

pub use config::{ConsoleFormat, FileConfig, LogConfig, OtelConfig};
pub use context::{IdentityContextData, IdentityContextGuard};
pub use correlation::{CorrelationContext, CorrelationExt, fields, spans};
pub use error::LogError;
pub use layers::{IdentityContextExtension, IdentityContextLayer, jsonl_layer};
pub use tracing_appender::non_blocking::WorkerGuard;

use std::fs::{self, File};

use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Builder for the global Linkspace subscriber
///
/// Console output is JSONL unless [`LogConfig::development`] (or
/// [`ConsoleFormat::Pretty`]) asks for human-readable lines.
#[derive(Debug, Clone, Default)]
pub struct LinkspaceSubscriberBuilder {
    config: LogConfig,
}

impl LinkspaceSubscriberBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Default level when RUST_LOG is unset
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.level = level.into();
        self
    }

    /// Level override for one target
    pub fn with_target(mut self, target: impl Into<String>, level: impl Into<String>) -> Self {
        self.config.targets.insert(target.into(), level.into());
        self
    }

    pub fn with_console(mut self, format: ConsoleFormat) -> Self {
        self.config.console = format;
        self
    }

    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    pub fn with_opentelemetry(mut self, config: OtelConfig) -> Self {
        self.config.otel = Some(config);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    fn env_filter(&self) -> Result<EnvFilter, LogError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(self.config.filter_directives())
            .map_err(|e| LogError::Filter(e.to_string()))
    }

    fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LogError> {
        let Some(retain_days) = config.retain_days else {
            fs::create_dir_all(&config.directory)?;
            let file = File::create(config.directory.join(format!("{}.log", config.prefix)))?;
            return Ok(tracing_appender::non_blocking(file));
        };

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(config.prefix.as_str())
            .filename_suffix("log")
            .max_log_files(retain_days.max(1))
            .build(&config.directory)
            .map_err(|e| LogError::File(e.to_string()))?;
        Ok(tracing_appender::non_blocking(appender))
    }

    fn layers(&self) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>), LogError> {
        let mut layers: Vec<BoxedLayer> = vec![IdentityContextLayer::new().boxed()];
        let mut guard = None;

        let verbose = self.config.verbose_jsonl;
        match self.config.console {
            ConsoleFormat::Off => {}
            ConsoleFormat::Jsonl => {
                layers.push(jsonl_layer::<Registry, _>(std::io::stdout, verbose).boxed());
            }
            ConsoleFormat::Pretty => {
                layers.push(tracing_subscriber::fmt::layer().with_target(true).boxed());
            }
        }

        if let Some(file) = &self.config.file {
            let (writer, file_guard) = Self::file_writer(file)?;
            guard = Some(file_guard);
            layers.push(jsonl_layer::<Registry, _>(writer, verbose).boxed());
        }

        if let Some(otel_config) = &self.config.otel {
            match otel::init_otel_layer::<Registry>(otel_config) {
                Ok(layer) => layers.push(layer.boxed()),
                // No subscriber yet to report through
                Err(e) => eprintln!("Warning: {}", e),
            }
        }

        Ok((layers, guard))
    }

    /// Install the subscriber globally
    ///
    /// Fails with [`LogError::AlreadyInitialized`] if a global subscriber
    /// is already set. The returned guard keeps file output alive.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LogError> {
        let filter = self.env_filter()?;
        let (layers, guard) = self.layers()?;
        tracing_subscriber::registry()
            .with(layers)
            .with(filter)
            .try_init()
            .map_err(|e| LogError::AlreadyInitialized(e.to_string()))?;
        Ok(guard)
    }
}

/// JSONL to the console
pub fn init_default() -> Result<Option<WorkerGuard>, LogError> {
    LinkspaceSubscriberBuilder::new().try_init()
}

/// Verbose, pretty console output
pub fn init_development() -> Result<Option<WorkerGuard>, LogError> {
    LinkspaceSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .try_init()
}

/// Warnings only; safe to call from every test
pub fn init_testing() {
    let _ = LinkspaceSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}

/// Flush pending OpenTelemetry spans
pub fn shutdown() {
    otel::shutdown_otel();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_jsonl_info() {
        let builder = LinkspaceSubscriberBuilder::new();
        assert_eq!(builder.config().level, "info");
        assert_eq!(builder.config().console, ConsoleFormat::Jsonl);
    }

    #[test]
    fn test_builder_overrides() {
        let builder = LinkspaceSubscriberBuilder::new()
            .with_config(LogConfig::development())
            .with_level("trace")
            .with_target("linkspace_client", "debug")
            .with_console(ConsoleFormat::Off);
        assert_eq!(builder.config().level, "trace");
        assert_eq!(builder.config().console, ConsoleFormat::Off);
        assert_eq!(
            builder.config().filter_directives(),
            "trace,linkspace_client=debug"
        );
    }

    #[test]
    fn test_layers_for_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let builder = LinkspaceSubscriberBuilder::new().with_file_output(FileConfig {
            directory: dir.path().to_path_buf(),
            retain_days: None,
            ..FileConfig::default()
        });
        let (layers, guard) = builder.layers().unwrap();
        // identity context + console + file
        assert_eq!(layers.len(), 3);
        assert!(guard.is_some());
        assert!(dir.path().join("linkspace.log").exists());
    }
}
