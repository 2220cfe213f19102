//! Telemetry setup for OpenTelemetry integration
//!
//! Built as an extra tracing layer so countdown spans (one per timer) can be
//! exported alongside the regular log output.

use anyhow::Result;
use tracing_subscriber::{Layer, Registry};

/// Layer type accepted by the subscriber registry
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// OTLP endpoint, if configured
///
/// # Environment Variables
///
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., http://localhost:4317)
/// - `OTEL_SERVICE_NAME`: Service name (default: promo-countdown)
///
/// # Example
///
/// ```text
/// OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 \
/// OTEL_SERVICE_NAME=promo-countdown-dev \
///     ./promo-countdown --deadline 2030-01-01T00:00:00Z
/// ```
pub fn endpoint() -> Option<String> {
    std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()
}

/// Build the OpenTelemetry layer
///
/// Returns `None` when the `telemetry` feature is not compiled in.
pub fn layer(endpoint: &str) -> Result<Option<BoxedLayer>> {
    #[cfg(feature = "telemetry")]
    {
        layer_impl(endpoint).map(Some)
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = endpoint;
        Ok(None)
    }
}

#[cfg(feature = "telemetry")]
fn layer_impl(endpoint: &str) -> Result<BoxedLayer> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use opentelemetry_sdk::Resource;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "promo-countdown".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.clone(),
        )]))
        .build();

    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(Box::new(tracing_opentelemetry::layer().with_tracer(tracer)))
}
