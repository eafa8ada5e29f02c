//! End-to-end flows through the gateway with the in-process executor.

use std::sync::Arc;

use conduit_commands::{
    api::{ApiCommandStatus, ApiJobStatus, CommandIdRequest, RunCheckCommandRequest},
    convert::CatalogConverter,
    CommandGateway, CommandService, LocalCommandService,
};
use conduit_common::metrics::OutputStoreMetrics;
use conduit_db_types::{
    stubs::{InMemoryStorageClient, StubCommandDb, StubSecretPersistence},
    traits::{CommandDatabase, SecretPersistence},
};
use conduit_output_store::OutputStore;
use conduit_primitives::{CheckStatus, CommandId, ConnectorJobOutput, FailureReason};
use conduit_secrets::{SecretCoordinate, SpecSecretSanitizer, StaticSpecSource};
use prometheus::Registry;
use serde_json::json;

struct Harness {
    gateway: CommandGateway,
    executor: Arc<LocalCommandService>,
    commands: Arc<StubCommandDb>,
    secrets: Arc<StubSecretPersistence>,
    store: OutputStore,
}

fn harness() -> Harness {
    let metrics = OutputStoreMetrics::register(&Registry::new()).unwrap();
    let store = OutputStore::new(Arc::new(InMemoryStorageClient::new()), metrics);
    let commands = Arc::new(StubCommandDb::new());
    let secrets = Arc::new(StubSecretPersistence::new());

    let specs = StaticSpecSource::new().with_spec(
        "d1",
        json!({
            "type": "object",
            "properties": {
                "apiKey": {"type": "string", "airbyte_secret": true},
                "host": {"type": "string"}
            }
        }),
    );
    let sanitizer = SpecSecretSanitizer::new(Arc::new(specs), secrets.clone());
    let executor = Arc::new(LocalCommandService::new(commands.clone(), store.clone()));
    let gateway = CommandGateway::new(executor.clone(), Arc::new(sanitizer), CatalogConverter::new());

    Harness {
        gateway,
        executor,
        commands,
        secrets,
        store,
    }
}

#[tokio::test]
async fn test_inline_check_never_persists_raw_secret() {
    let h = harness();

    let req = RunCheckCommandRequest {
        id: "c1".into(),
        actor_id: None,
        actor_definition_id: Some("d1".into()),
        workspace_id: Some("w1".into()),
        config: Some(json!({"apiKey": "secret", "host": "db.internal"})),
        job_id: None,
        attempt_number: None,
        priority: None,
        signal_input: None,
    };
    let resp = h.gateway.run_check(req).await.unwrap();
    assert_eq!(resp.id, "c1");

    let record = h
        .commands
        .get_command(&CommandId::from("c1"))
        .unwrap()
        .expect("command recorded");
    let persisted = serde_json::to_string(&record).unwrap();
    assert!(!persisted.contains("\"secret\""));

    let input = record.command.command_input();
    assert_eq!(input["config"]["host"], "db.internal");
    assert!(SecretCoordinate::is_reference(&input["config"]["apiKey"]));

    // The reference resolves to the original value.
    assert_eq!(h.secrets.len(), 1);
    let coordinate = input["config"]["apiKey"]["_secret"].as_str().unwrap();
    assert_eq!(
        h.secrets.read_secret(coordinate).unwrap().as_deref(),
        Some("secret")
    );

    let status = h
        .gateway
        .get_status(CommandIdRequest { id: "c1".into() })
        .await
        .unwrap();
    assert_eq!(status.status, Some(ApiCommandStatus::Pending));
}

#[tokio::test]
async fn test_failed_check_output_reports_retryable() {
    let h = harness();

    let output = ConnectorJobOutput::check(CheckStatus::Failed, None).with_failure_reason(
        FailureReason {
            retryable: None,
            ..Default::default()
        },
    );
    h.store.write("job-42", &output).await.unwrap();

    let resp = h
        .gateway
        .get_check_output(CommandIdRequest {
            id: "job-42".into(),
        })
        .await
        .unwrap();

    assert_eq!(resp.id, "job-42");
    assert_eq!(resp.status, Some(ApiJobStatus::Failed));
    assert!(resp.failure_reason.unwrap().retryable);
    assert_eq!(h.store.metrics().read_count(conduit_common::metrics::Outcome::Success), 1);
}

#[tokio::test]
async fn test_completed_check_is_visible_through_gateway() {
    let h = harness();

    let req = RunCheckCommandRequest {
        id: "c2".into(),
        actor_id: Some("a1".into()),
        actor_definition_id: None,
        workspace_id: None,
        config: None,
        job_id: Some("j1".into()),
        attempt_number: Some(0),
        priority: Some("high".into()),
        signal_input: None,
    };
    h.gateway.run_check(req).await.unwrap();

    let id = CommandId::from("c2");
    h.executor.mark_running(&id).await.unwrap();
    h.executor
        .complete_check(&id, &ConnectorJobOutput::check(CheckStatus::Succeeded, None))
        .await
        .unwrap();

    let output = h
        .gateway
        .get_check_output(CommandIdRequest { id: "c2".into() })
        .await
        .unwrap();
    assert_eq!(output.status, Some(ApiJobStatus::Succeeded));
    assert_eq!(output.failure_reason, None);

    // Cancelling a finished command is a no-op.
    h.gateway
        .cancel(CommandIdRequest { id: "c2".into() })
        .await
        .unwrap();
    assert_eq!(
        h.executor.get_status(&id).await.unwrap(),
        Some(conduit_primitives::CommandStatus::Completed)
    );
}
