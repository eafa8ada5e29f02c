//! Outputs are stored as JSON text, so their wire shape is load-bearing.

use conduit_primitives::*;
use serde_json::json;

#[test]
fn test_check_output_reads_worker_json() {
    let output: ConnectorJobOutput = serde_json::from_value(json!({
        "outputType": "check_connection",
        "checkConnection": {"status": "failed", "message": "could not connect"},
        "failureReason": {"failureOrigin": "source", "retryable": null}
    }))
    .unwrap();

    assert_eq!(output.output_type, OutputType::CheckConnection);
    assert_eq!(
        output.check_connection.as_ref().map(|c| c.status),
        Some(CheckStatus::Failed)
    );
    let reason = output.failure_reason.unwrap();
    assert_eq!(reason.failure_origin, Some(FailureOrigin::Source));
    assert!(reason.is_retryable());
}

#[test]
fn test_discover_output_without_catalog() {
    let output: DiscoverCommandOutput = serde_json::from_value(json!({
        "failureReason": {"failureType": "system_error", "retryable": false}
    }))
    .unwrap();

    assert!(output.catalog.is_none());
    assert!(output.catalog_id.is_none());
    assert!(!output.failure_reason.unwrap().is_retryable());
}

#[test]
fn test_protocol_catalog_defaults() {
    let catalog: ProtocolCatalog = serde_json::from_value(json!({
        "streams": [{"name": "users"}]
    }))
    .unwrap();

    let stream = &catalog.streams[0];
    assert_eq!(stream.name, "users");
    assert!(stream.supported_sync_modes.is_empty());
    assert!(stream.default_cursor_field.is_empty());
    assert!(stream.namespace.is_none());
}

#[test]
fn test_replication_output_omits_empty_failures() {
    let output = ReplicationOutput {
        replication_attempt_summary: ReplicationAttemptSummary {
            status: ReplicationStatus::Completed,
            records_synced: 10,
            bytes_synced: 2048,
            start_time: Some(1),
            end_time: Some(2),
        },
        state: None,
        output_catalog: None,
        failures: Vec::new(),
    };

    let value = serde_json::to_value(&output).unwrap();
    assert!(value.get("failures").is_none());
    assert!(value.get("state").is_none());
    assert_eq!(value["replicationAttemptSummary"]["recordsSynced"], 10);

    let read: ReplicationOutput = serde_json::from_value(value).unwrap();
    assert_eq!(read, output);
}

#[test]
fn test_explicit_null_payloads_survive_a_round_trip() {
    let output = ReplicationOutput {
        replication_attempt_summary: ReplicationAttemptSummary {
            status: ReplicationStatus::Failed,
            records_synced: 0,
            bytes_synced: 0,
            start_time: None,
            end_time: None,
        },
        state: Some(serde_json::Value::Null),
        output_catalog: Some(json!({"streams": []})),
        failures: vec![FailureReason {
            metadata: Some(serde_json::Value::Null),
            ..Default::default()
        }],
    };

    let text = serde_json::to_string(&output).unwrap();
    let read: ReplicationOutput = serde_json::from_str(&text).unwrap();

    assert_eq!(read, output);
    assert_eq!(read.state, Some(serde_json::Value::Null));
    assert_eq!(read.failures[0].metadata, Some(serde_json::Value::Null));
}
