//! `tracing-subscriber` setup, with an optional OTLP exporter for the relay.

use std::io;

use anyhow::Context;
use clap::ValueEnum;
use opentelemetry::{trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace::TracerProvider, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable, for local runs.
    Pretty,
}

/// Flushes and shuts down the OTLP exporter on drop.
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("error shutting down tracer provider: {e:?}");
            }
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the relay's subscriber.
///
/// Spans are also exported over OTLP/gRPC when `otlp_endpoint` is set.
///
/// # Errors
///
/// Returns an error if the exporter cannot be built or a global subscriber is
/// already installed.
pub fn init_relay(
    service_name: &'static str,
    format: LogFormat,
    otlp_endpoint: Option<&str>,
) -> anyhow::Result<TelemetryGuard> {
    let provider = otlp_endpoint
        .map(|endpoint| build_provider(service_name, endpoint))
        .transpose()?;
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(service_name)));

    let (json, pretty) = match format {
        LogFormat::Json => (
            Some(tracing_subscriber::fmt::layer().json().with_target(true)),
            None,
        ),
        LogFormat::Pretty => (None, Some(tracing_subscriber::fmt::layer().with_target(true))),
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(otel_layer)
        .with(json)
        .with(pretty)
        .try_init()
        .context("failed to install tracing subscriber")?;

    if let Some(endpoint) = otlp_endpoint {
        tracing::info!(service = service_name, otlp_endpoint = endpoint, "OpenTelemetry export enabled");
    }

    Ok(TelemetryGuard { provider })
}

fn build_provider(service_name: &'static str, endpoint: &str) -> anyhow::Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("failed to build OTLP span exporter")?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![
            KeyValue::new("service.name", service_name),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]))
        .build())
}

/// Installs the check executable's subscriber: JSON lines on standard error.
///
/// Standard output is reserved for the version list.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_check() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr),
        )
        .try_init()
        .context("failed to install tracing subscriber")
}
