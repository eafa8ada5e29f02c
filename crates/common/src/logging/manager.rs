//! Logging initialization and shutdown.

use std::sync::OnceLock;

use opentelemetry::{
    global::{self, set_text_map_propagator},
    trace::{TraceError, TracerProvider},
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    propagation::TraceContextPropagator,
    runtime::Tokio,
    trace::{Config, TracerProvider as SdkTracerProvider},
};
use thiserror::Error;
use tracing::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    fmt::layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::types::LoggerConfig;

/// Held so [`finalize`] can flush pending spans.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to initialize otlp pipeline: {0}")]
    OtlpPipeline(#[from] TraceError),

    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    set_text_map_propagator(TraceContextPropagator::new());

    let filt = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let stdout_sub = if config.stdout_config.json_format {
        layer()
            .json()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    } else {
        layer()
            .compact()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    };

    let file_layer = config.file_logging_config.as_ref().map(|file_config| {
        let file_appender = RollingFileAppender::new(
            file_config.rotation.clone(),
            &file_config.directory,
            &file_config.file_name_prefix,
        );

        if file_config.json_format {
            layer()
                .json()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        } else {
            layer()
                .compact()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(filt.clone())
                .boxed()
        }
    });

    let otel_layer = match config.otel_url.as_ref() {
        Some(otel_url) => {
            let trace_config = Config::default().with_resource(config.resource.build_resource());

            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(otel_url)
                .with_timeout(config.otlp_export_config.timeout);

            let tp = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(trace_config)
                .install_batch(Tokio)?;

            if TRACER_PROVIDER.set(tp.clone()).is_err() {
                warn!("tracer provider already set, keeping the first one");
            }

            let tt = tp.tracer("conduit-tracer");
            Some(tracing_opentelemetry::layer().with_tracer(tt))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_sub)
        .with(file_layer)
        .with(otel_layer)
        .try_init()?;

    info!(
        service_name = %config.resource.service_name,
        service_version = ?config.resource.service_version,
        deployment_environment = ?config.resource.deployment_environment,
        "logging initialized"
    );

    Ok(())
}

/// Flushes pending spans to the collector, if one was configured.
///
/// Call once before the process exits.
pub fn finalize() {
    info!("shutting down logging");

    match TRACER_PROVIDER.get() {
        Some(provider) => match provider.shutdown() {
            Ok(()) => info!("tracer provider shut down"),
            Err(e) => error!(%e, "failed to shut down tracer provider"),
        },
        None => debug!("no tracer provider to shut down"),
    }

    global::shutdown_tracer_provider();
}
