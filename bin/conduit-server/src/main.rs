//! Conduit command API server entrypoint.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use argh::from_env;
use conduit_common::logging;
use tokio::{
    net::TcpListener,
    runtime::{self, Handle},
    signal,
};
use tracing::*;

use crate::{args::Args, errors::InitError};

mod args;
mod config;
mod errors;
mod services;

fn main() {
    if let Err(e) = main_inner() {
        eprintln!("FATAL ERROR: {e:?}");
        std::process::exit(1);
    }
}

fn main_inner() -> Result<()> {
    let args: Args = from_env();

    let config =
        config::load_config(&args).map_err(|e| anyhow!("Failed to load configuration: {e}"))?;

    let rt = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("conduit-rt")
        .build()
        .map_err(InitError::Io)?;

    init_logging(rt.handle(), &config)?;

    let app = services::build_app(&config)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let res = rt.block_on(async move {
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        conduit_http_api::serve(listener, app, shutdown_signal())
            .await
            .context("http server failed")
    });

    logging::finalize();
    info!("Exiting conduit");
    res
}

fn init_logging(rt: &Handle, config: &config::Config) -> Result<()> {
    // OTLP export needs a runtime context.
    let _g = rt.enter();
    logging::init_logging_from_config(logging::LoggingInitConfig {
        service_base_name: "conduit-server",
        service_label: config.logging.service_label.as_deref(),
        service_version: Some(env!("CARGO_PKG_VERSION")),
        environment: config.logging.environment.as_deref(),
        instance_id: config.logging.instance_id.as_deref(),
        otlp_url: config.logging.otlp_url.as_deref(),
        otlp_timeout: config.logging.otlp_timeout_secs.map(Duration::from_secs),
        log_dir: config.logging.log_dir.as_ref(),
        log_file_prefix: config.logging.log_file_prefix.as_deref(),
        json_format: config.logging.json_format,
        default_log_prefix: "conduit",
    })?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(err = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
