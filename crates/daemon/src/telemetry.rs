//! Telemetry setup for OpenTelemetry integration

use crate::logging::BoxedLayer;
use anyhow::Result;

/// Build the OpenTelemetry layer if an OTLP endpoint is configured
///
/// # Environment Variables
///
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., http://localhost:4317)
/// - `OTEL_SERVICE_NAME`: Service name (default: taskhub)
///
/// # Example
///
/// ```text
/// OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 \
/// OTEL_SERVICE_NAME=taskhub-dev \
///     ./taskhub-daemon
/// ```
pub fn layer() -> Result<Option<BoxedLayer>> {
    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        return Ok(None);
    };

    #[cfg(feature = "telemetry")]
    {
        otlp_layer(&endpoint).map(Some)
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = endpoint;
        Ok(None)
    }
}

/// Call once the subscriber is installed
pub fn report_status() {
    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        tracing::debug!("OpenTelemetry not configured (OTEL_EXPORTER_OTLP_ENDPOINT not set)");
        return;
    };

    if cfg!(feature = "telemetry") {
        tracing::info!(endpoint = %endpoint, "OpenTelemetry export enabled");
    } else {
        tracing::warn!("OpenTelemetry endpoint set but feature 'telemetry' not enabled");
        tracing::warn!("Rebuild with: cargo build --features telemetry");
    }
}

#[cfg(feature = "telemetry")]
fn otlp_layer(endpoint: &str) -> Result<BoxedLayer> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};
    use opentelemetry_sdk::trace::TracerProvider;
    use opentelemetry_sdk::{runtime, Resource};
    use tracing_subscriber::Layer;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "taskhub".to_string());

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.clone(),
        )]))
        .build();

    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
}

/// Flush pending spans
pub fn shutdown() {
    #[cfg(feature = "telemetry")]
    opentelemetry::global::shutdown_tracer_provider();
}
