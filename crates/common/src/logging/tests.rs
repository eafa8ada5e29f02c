use std::{path::PathBuf, time::Duration};

use super::{types::*, *};

fn has_attr(resource: &opentelemetry_sdk::Resource, key: &str, value: &str) -> bool {
    resource
        .iter()
        .any(|(k, v)| k.as_str() == key && v.as_str() == value)
}

#[test]
fn test_resource_config_build_minimal() {
    let config = ResourceConfig::new("conduit".to_string());
    let resource = config.build_resource();

    assert!(has_attr(&resource, "service.name", "conduit"));
    assert!(resource
        .iter()
        .all(|(k, _)| k.as_str() != "service.version"));
}

#[test]
fn test_resource_config_build_with_all_semantic_conventions() {
    let config = ResourceConfig {
        service_name: "conduit".to_string(),
        service_version: Some("0.1.0".to_string()),
        deployment_environment: Some("staging".to_string()),
        service_instance_id: Some("gw-1".to_string()),
    };

    let resource = config.build_resource();

    assert!(has_attr(&resource, "service.name", "conduit"));
    assert!(has_attr(&resource, "service.version", "0.1.0"));
    assert!(has_attr(&resource, "deployment.environment", "staging"));
    assert!(has_attr(&resource, "service.instance.id", "gw-1"));
}

#[test]
fn test_logger_config_builder_pattern() {
    let config = LoggerConfig::new("conduit".to_string())
        .with_service_version("2.0.0".to_string())
        .with_deployment_environment("staging".to_string())
        .with_json_logging(true);

    assert_eq!(config.resource.service_version.as_deref(), Some("2.0.0"));
    assert_eq!(
        config.resource.deployment_environment.as_deref(),
        Some("staging")
    );
    assert!(config.stdout_config.json_format);
    assert!(config.otel_url.is_none());
}

#[test]
fn test_format_service_name() {
    assert_eq!(format_service_name("conduit", None), "conduit");
    assert_eq!(format_service_name("conduit", Some("dev")), "conduit%dev");
}

#[test]
fn test_init_config_falls_back_to_default_prefix() {
    let dir = PathBuf::from("/var/log/conduit");
    let init = LoggingInitConfig {
        service_base_name: "conduit",
        service_label: Some("prod"),
        service_version: None,
        environment: Some("production"),
        instance_id: Some("gw-2"),
        otlp_url: Some("http://collector:4317"),
        otlp_timeout: Some(Duration::from_secs(3)),
        log_dir: Some(&dir),
        log_file_prefix: None,
        json_format: Some(true),
        default_log_prefix: "conduit",
    };

    let config = init.to_logger_config();

    assert_eq!(config.resource.service_name, "conduit%prod");
    assert_eq!(
        config.resource.deployment_environment.as_deref(),
        Some("production")
    );
    assert_eq!(config.resource.service_instance_id.as_deref(), Some("gw-2"));
    let resource = config.resource.build_resource();
    assert!(has_attr(&resource, "deployment.environment", "production"));
    assert!(has_attr(&resource, "service.instance.id", "gw-2"));
    assert_eq!(config.otel_url.as_deref(), Some("http://collector:4317"));
    assert_eq!(config.otlp_export_config.timeout, Duration::from_secs(3));
    assert!(config.stdout_config.json_format);

    let file = config.file_logging_config.expect("file logging configured");
    assert_eq!(file.directory, dir);
    assert_eq!(file.file_name_prefix, "conduit");
    assert!(!file.json_format);
}

#[test]
fn test_init_config_without_log_dir_skips_file_output() {
    let init = LoggingInitConfig {
        service_base_name: "conduit",
        service_label: None,
        service_version: Some("0.1.0"),
        environment: None,
        instance_id: None,
        otlp_url: None,
        otlp_timeout: None,
        log_dir: None,
        log_file_prefix: Some("ignored"),
        json_format: None,
        default_log_prefix: "conduit",
    };

    let config = init.to_logger_config();

    assert!(config.file_logging_config.is_none());
    assert!(config.otel_url.is_none());
    assert_eq!(config.resource.service_version.as_deref(), Some("0.1.0"));
    assert!(config.resource.deployment_environment.is_none());
    assert!(config.resource.service_instance_id.is_none());
}
