//! Logging setup as binaries call it, from flattened config values.

use std::{path::PathBuf, time::Duration};

use tracing::info;

use super::{
    format_service_name, init, FileLoggingConfig, LoggerConfig, LoggingError, OtlpExportConfig,
};

#[derive(Debug)]
pub struct LoggingInitConfig<'a> {
    pub service_base_name: &'a str,
    /// Suffix such as `prod` or `dev`.
    pub service_label: Option<&'a str>,
    pub service_version: Option<&'a str>,
    /// Reported as `deployment.environment`.
    pub environment: Option<&'a str>,
    /// Reported as `service.instance.id`.
    pub instance_id: Option<&'a str>,
    pub otlp_url: Option<&'a str>,
    pub otlp_timeout: Option<Duration>,
    pub log_dir: Option<&'a PathBuf>,
    pub log_file_prefix: Option<&'a str>,
    pub json_format: Option<bool>,
    /// Used when `log_dir` is set but `log_file_prefix` is not.
    pub default_log_prefix: &'a str,
}

impl LoggingInitConfig<'_> {
    /// Builds the [`LoggerConfig`] without installing anything.
    pub fn to_logger_config(&self) -> LoggerConfig {
        let service_name = format_service_name(self.service_base_name, self.service_label);
        let mut lconfig = LoggerConfig::new(service_name);

        if let Some(version) = self.service_version {
            lconfig = lconfig.with_service_version(version.to_string());
        }

        if let Some(env) = self.environment {
            lconfig = lconfig.with_deployment_environment(env.to_string());
        }

        if let Some(instance_id) = self.instance_id {
            lconfig = lconfig.with_service_instance_id(instance_id.to_string());
        }

        if let Some(url) = self.otlp_url {
            lconfig.set_otlp_url(url.to_string());
        }

        if let Some(timeout) = self.otlp_timeout {
            lconfig = lconfig.with_otlp_export_config(OtlpExportConfig { timeout });
        }

        if let Some(dir) = self.log_dir {
            let prefix = self
                .log_file_prefix
                .unwrap_or(self.default_log_prefix)
                .to_string();
            lconfig = lconfig.with_file_logging(FileLoggingConfig::new(dir.clone(), prefix));
        }

        if let Some(json_format) = self.json_format {
            lconfig = lconfig.with_json_logging(json_format);
        }

        lconfig
    }
}

/// Initializes logging and reports which outputs are active.
pub fn init_logging_from_config(config: LoggingInitConfig<'_>) -> Result<(), LoggingError> {
    let lconfig = config.to_logger_config();
    let file_logging_config = lconfig.file_logging_config.clone();

    init(lconfig)?;

    if let Some(url) = config.otlp_url {
        info!(%url, "using OpenTelemetry tracing output");
    }
    if let Some(file_config) = &file_logging_config {
        info!(
            log_dir = %file_config.directory.display(),
            log_prefix = %file_config.file_name_prefix,
            "file logging enabled"
        );
    }

    Ok(())
}
