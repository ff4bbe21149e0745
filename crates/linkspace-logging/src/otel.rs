//! OpenTelemetry export
//!
//! Builds an OTLP span exporter and the matching tracing layer.

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{RandomIdGenerator, Tracer, TracerProvider};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::registry::LookupSpan;

use crate::config::OtelConfig;
use crate::error::LogError;

/// Tracer name reported on exported spans
pub const TRACER_NAME: &str = "linkspace";

/// Set up OTLP export and return the layer feeding it
///
/// The tracer provider is installed globally; call [`shutdown_otel`] before
/// exit to flush pending spans. Requires a Tokio runtime.
pub fn init_otel_layer<S>(config: &OtelConfig) -> Result<OpenTelemetryLayer<S, Tracer>, LogError>
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
{
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .build()
        .map_err(|e| LogError::Otel(e.to_string()))?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(Resource::new([
            KeyValue::new("service.name", config.service_name.clone()),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]))
        .build();

    let tracer = provider.tracer(TRACER_NAME);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer))
}

/// Flush and shut down the global tracer provider
pub fn shutdown_otel() {
    opentelemetry::global::shutdown_tracer_provider();
}
