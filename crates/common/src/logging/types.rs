//! Configuration types for the logging subsystem.

use std::{path::PathBuf, time::Duration};

use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::format::FmtSpan;

/// Stdout layer settings.
#[derive(Debug, Clone)]
pub struct StdoutConfig {
    /// JSON instead of compact lines.
    pub json_format: bool,
    /// Span events to emit.
    pub fmt_span: FmtSpan,
}

impl Default for StdoutConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            // CLOSE carries the span duration, which is what request spans are for.
            fmt_span: FmtSpan::CLOSE,
        }
    }
}

/// Rolling file output.
#[derive(Debug, Clone)]
pub struct FileLoggingConfig {
    pub directory: PathBuf,
    /// File name prefix, e.g. `conduit` produces `conduit.2026-01-01`.
    pub file_name_prefix: String,
    pub rotation: Rotation,
    pub json_format: bool,
}

impl FileLoggingConfig {
    pub fn new(directory: PathBuf, file_name_prefix: String) -> Self {
        Self {
            directory,
            file_name_prefix,
            rotation: Rotation::DAILY,
            json_format: false,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_json_format(mut self, json_format: bool) -> Self {
        self.json_format = json_format;
        self
    }
}

#[derive(Debug, Clone)]
pub struct OtlpExportConfig {
    /// Per-export request timeout.
    pub timeout: Duration,
}

impl Default for OtlpExportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

/// OpenTelemetry resource attributes.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub service_name: String,
    pub service_version: Option<String>,
    pub deployment_environment: Option<String>,
    pub service_instance_id: Option<String>,
}

impl ResourceConfig {
    pub fn new(service_name: String) -> Self {
        Self {
            service_name,
            service_version: None,
            deployment_environment: None,
            service_instance_id: None,
        }
    }

    /// Builds the resource using the semantic-convention keys.
    pub fn build_resource(&self) -> Resource {
        let ResourceConfig {
            service_name,
            service_version,
            deployment_environment,
            service_instance_id,
        } = self;

        let mut attributes = vec![KeyValue::new("service.name", service_name.clone())];

        if let Some(version) = service_version {
            attributes.push(KeyValue::new("service.version", version.clone()));
        }

        if let Some(env) = deployment_environment {
            attributes.push(KeyValue::new("deployment.environment", env.clone()));
        }

        if let Some(instance_id) = service_instance_id {
            attributes.push(KeyValue::new("service.instance.id", instance_id.clone()));
        }

        Resource::new(attributes)
    }
}

/// Full logger configuration consumed by [`init`](super::init).
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub resource: ResourceConfig,
    /// OTLP collector endpoint. Tracing export is off when unset.
    pub otel_url: Option<String>,
    pub stdout_config: StdoutConfig,
    pub file_logging_config: Option<FileLoggingConfig>,
    pub otlp_export_config: OtlpExportConfig,
}

impl LoggerConfig {
    pub fn new(service_name: String) -> Self {
        Self {
            resource: ResourceConfig::new(service_name),
            otel_url: None,
            stdout_config: StdoutConfig::default(),
            file_logging_config: None,
            otlp_export_config: OtlpExportConfig::default(),
        }
    }

    pub fn set_otlp_url(&mut self, url: String) {
        self.otel_url = Some(url);
    }

    pub fn with_service_version(mut self, version: String) -> Self {
        self.resource.service_version = Some(version);
        self
    }

    pub fn with_deployment_environment(mut self, env: String) -> Self {
        self.resource.deployment_environment = Some(env);
        self
    }

    pub fn with_service_instance_id(mut self, instance_id: String) -> Self {
        self.resource.service_instance_id = Some(instance_id);
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.stdout_config.json_format = enabled;
        self
    }

    pub fn with_file_logging(mut self, config: FileLoggingConfig) -> Self {
        self.file_logging_config = Some(config);
        self
    }

    pub fn with_otlp_export_config(mut self, config: OtlpExportConfig) -> Self {
        self.otlp_export_config = config;
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new("conduit".to_string())
    }
}
