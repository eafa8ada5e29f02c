//! Request validation, sanitization and response mapping in front of the
//! executor.

use std::{fmt, sync::Arc};

use conduit_primitives::{ActorRef, Command, CommandId, InlineConfig, ParsePriorityError, Priority};
use conduit_secrets::{secret_references, SecretSanitizer};
use serde::Serialize;
use serde_json::Value;
use tracing::*;

use crate::{
    api::{
        CheckCommandOutputResponse, CommandIdRequest, CommandIdResponse, CommandStatusResponse,
        DiscoverCommandOutputResponse, RunCheckCommandRequest, RunDiscoverCommandRequest,
    },
    convert::{
        check_output_status, command_status_to_api, discover_status, failure_reason_to_api,
        CatalogConverter,
    },
    CommandApiError, CommandApiResult, CommandService,
};

/// Front of the command API. Collaborators are injected at construction.
#[derive(Clone)]
pub struct CommandGateway {
    service: Arc<dyn CommandService>,
    sanitizer: Arc<dyn SecretSanitizer>,
    catalog_converter: CatalogConverter,
}

impl fmt::Debug for CommandGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandGateway").finish_non_exhaustive()
    }
}

fn command_id(id: &str) -> CommandApiResult<CommandId> {
    if id.trim().is_empty() {
        return Err(CommandApiError::validation("command id must not be empty"));
    }
    Ok(CommandId::new(id))
}

fn parse_priority(priority: Option<&str>) -> CommandApiResult<Priority> {
    match priority {
        None => Ok(Priority::Default),
        Some(raw) => raw
            .parse()
            .map_err(|e: ParsePriorityError| CommandApiError::validation(e.to_string())),
    }
}

fn command_input<T: Serialize>(req: &T) -> CommandApiResult<Value> {
    serde_json::to_value(req)
        .map_err(|e| CommandApiError::validation(format!("unserializable request: {e}")))
}

impl CommandGateway {
    pub fn new(
        service: Arc<dyn CommandService>,
        sanitizer: Arc<dyn SecretSanitizer>,
        catalog_converter: CatalogConverter,
    ) -> Self {
        Self {
            service,
            sanitizer,
            catalog_converter,
        }
    }

    /// Asks the executor to cancel and echoes the id back.
    #[instrument(skip_all, fields(id = %req.id))]
    pub async fn cancel(&self, req: CommandIdRequest) -> CommandApiResult<CommandIdResponse> {
        let id = command_id(&req.id)?;
        self.service.cancel(&id).await?;
        Ok(CommandIdResponse::new(req.id))
    }

    #[instrument(skip_all, fields(id = %req.id))]
    pub async fn get_status(&self, req: CommandIdRequest) -> CommandApiResult<CommandStatusResponse> {
        let id = command_id(&req.id)?;
        let status = self.service.get_status(&id).await?;
        Ok(CommandStatusResponse {
            id: req.id,
            status: status.map(command_status_to_api),
        })
    }

    #[instrument(skip_all, fields(id = %req.id))]
    pub async fn get_check_output(
        &self,
        req: CommandIdRequest,
    ) -> CommandApiResult<CheckCommandOutputResponse> {
        let id = command_id(&req.id)?;
        let output = self.service.get_connector_job_output(&id).await?;

        let mut resp = CheckCommandOutputResponse {
            id: req.id,
            status: None,
            failure_reason: None,
        };
        if let Some(output) = output {
            resp.status = check_output_status(&output);
            resp.failure_reason = output.failure_reason.as_ref().map(failure_reason_to_api);
        }
        Ok(resp)
    }

    #[instrument(skip_all, fields(id = %req.id))]
    pub async fn get_discover_output(
        &self,
        req: CommandIdRequest,
    ) -> CommandApiResult<DiscoverCommandOutputResponse> {
        let id = command_id(&req.id)?;
        let output = self.service.get_discover_output(&id).await?;

        let mut resp = DiscoverCommandOutputResponse {
            id: req.id,
            status: None,
            catalog_id: None,
            catalog: None,
            failure_reason: None,
        };
        let Some(output) = output else {
            return Ok(resp);
        };

        let catalog = match &output.catalog {
            Some(actor_catalog) => Some(
                self.catalog_converter
                    .protocol_value_to_api(&actor_catalog.catalog)
                    .map_err(|source| CommandApiError::CatalogConversion {
                        id: resp.id.clone(),
                        source,
                    })?,
            ),
            None => None,
        };

        resp.status = Some(discover_status(&output));
        resp.catalog_id = output.catalog_id;
        resp.catalog = catalog;
        resp.failure_reason = output.failure_reason.as_ref().map(failure_reason_to_api);
        Ok(resp)
    }

    /// Runs a check against either an existing actor or an inline
    /// configuration. Inline configuration is sanitized before it reaches the
    /// executor, including inside the persisted command input.
    ///
    /// Secrets stored while sanitizing are discarded again if the executor
    /// fails to record the command. A resubmitted id that the executor
    /// ignores keeps the secrets of its second sanitization.
    #[instrument(skip_all, fields(id = %req.id))]
    pub async fn run_check(
        &self,
        mut req: RunCheckCommandRequest,
    ) -> CommandApiResult<CommandIdResponse> {
        let id = command_id(&req.id)?;
        let priority = parse_priority(req.priority.as_deref())?;

        let has_inline_field = req.actor_definition_id.is_some()
            || req.workspace_id.is_some()
            || req.config.is_some();

        let (command, stored_secrets) = match req.actor_id.clone() {
            Some(_) if has_inline_field => {
                return Err(CommandApiError::validation(
                    "actorId cannot be combined with actorDefinitionId, workspaceId or config",
                ));
            }
            Some(actor_id) => {
                let actor = ActorRef {
                    actor_id,
                    job_id: req.job_id.clone(),
                    attempt_number: req.attempt_number,
                };
                let input = command_input(&req)?;
                let command =
                    Command::check_actor(id, actor, priority, req.signal_input.clone(), input);
                (command, Vec::new())
            }
            None => {
                let (Some(actor_definition_id), Some(workspace_id), Some(config)) = (
                    req.actor_definition_id.clone(),
                    req.workspace_id.clone(),
                    req.config.take(),
                ) else {
                    return Err(CommandApiError::validation(
                        "either actorId or all of actorDefinitionId, workspaceId and config are required",
                    ));
                };

                let supplied = secret_references(&config);
                let sanitized = self
                    .sanitizer
                    .sanitize_partial_config(&actor_definition_id, &workspace_id, config)
                    .await?;
                let stored_secrets: Vec<String> = secret_references(&sanitized)
                    .into_iter()
                    .filter(|coordinate| !supplied.contains(coordinate))
                    .collect();
                req.config = Some(sanitized.clone());

                let inline = InlineConfig {
                    actor_definition_id,
                    workspace_id,
                    configuration: sanitized,
                };
                let input = command_input(&req)?;
                let command =
                    Command::check_inline(id, inline, priority, req.signal_input.clone(), input);
                (command, stored_secrets)
            }
        };

        if let Err(e) = self.service.create_command(command).await {
            if !stored_secrets.is_empty() {
                if let Err(err) = self.sanitizer.discard_secrets(&stored_secrets).await {
                    warn!(%err, count = stored_secrets.len(), "failed to discard secrets");
                }
            }
            return Err(e.into());
        }
        Ok(CommandIdResponse::new(req.id))
    }

    #[instrument(skip_all, fields(id = %req.id))]
    pub async fn run_discover(
        &self,
        req: RunDiscoverCommandRequest,
    ) -> CommandApiResult<CommandIdResponse> {
        let id = command_id(&req.id)?;
        let priority = parse_priority(req.priority.as_deref())?;
        if req.actor_id.trim().is_empty() {
            return Err(CommandApiError::validation("actorId must not be empty"));
        }

        let actor = ActorRef {
            actor_id: req.actor_id.clone(),
            job_id: req.job_id.clone(),
            attempt_number: req.attempt_number,
        };
        let input = command_input(&req)?;
        let command = Command::discover(id, actor, priority, req.signal_input.clone(), input);

        self.service.create_command(command).await?;
        Ok(CommandIdResponse::new(req.id))
    }
}

#[cfg(test)]
mod tests {
    use conduit_primitives::{
        ActorCatalog, ActorContext, CheckStatus, CommandKind, CommandStatus, ConnectorJobOutput,
        DiscoverCommandOutput, FailureReason,
    };
    use conduit_secrets::{MockSecretSanitizer, SanitizerError};
    use serde_json::json;

    use super::*;
    use crate::{api::ApiJobStatus, ExecutorError, MockCommandService};

    fn gateway(service: MockCommandService, sanitizer: MockSecretSanitizer) -> CommandGateway {
        CommandGateway::new(Arc::new(service), Arc::new(sanitizer), CatalogConverter::new())
    }

    fn check_request(id: &str) -> RunCheckCommandRequest {
        RunCheckCommandRequest {
            id: id.to_owned(),
            actor_id: None,
            actor_definition_id: None,
            workspace_id: None,
            config: None,
            job_id: None,
            attempt_number: None,
            priority: None,
            signal_input: None,
        }
    }

    fn discover_request(id: &str, actor_id: &str) -> RunDiscoverCommandRequest {
        RunDiscoverCommandRequest {
            id: id.to_owned(),
            actor_id: actor_id.to_owned(),
            job_id: None,
            attempt_number: None,
            priority: None,
            signal_input: None,
        }
    }

    #[tokio::test]
    async fn test_inline_check_persists_sanitized_config() {
        let mut sanitizer = MockSecretSanitizer::new();
        sanitizer
            .expect_sanitize_partial_config()
            .withf(|def, ws, config| def == "d1" && ws == "w1" && *config == json!({"apiKey": "secret"}))
            .times(1)
            .returning(|_, _, _| Ok(json!({"apiKey": {"_secret": "workspace_w1_secret_x_v1"}})));

        let mut service = MockCommandService::new();
        service
            .expect_create_command()
            .withf(|cmd| {
                let Some(inline) = cmd.actor().inline_config() else {
                    return false;
                };
                let input = cmd.command_input();
                cmd.kind() == CommandKind::Check
                    && inline.configuration["apiKey"]["_secret"] == "workspace_w1_secret_x_v1"
                    && input["config"]["apiKey"]["_secret"] == "workspace_w1_secret_x_v1"
                    && input["actorDefinitionId"] == "d1"
                    && input["workspaceId"] == "w1"
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut req = check_request("c1");
        req.actor_definition_id = Some("d1".into());
        req.workspace_id = Some("w1".into());
        req.config = Some(json!({"apiKey": "secret"}));

        let resp = gateway(service, sanitizer).run_check(req).await.unwrap();
        assert_eq!(resp, CommandIdResponse::new("c1"));
    }

    #[tokio::test]
    async fn test_actor_check_skips_sanitizer() {
        let mut sanitizer = MockSecretSanitizer::new();
        sanitizer.expect_sanitize_partial_config().never();

        let mut service = MockCommandService::new();
        service
            .expect_create_command()
            .withf(|cmd| {
                let input = cmd.command_input();
                matches!(cmd.actor(), ActorContext::Actor(a) if a.actor_id == "a1")
                    && cmd.priority() == Priority::High
                    && cmd.signal_input() == Some("sig")
                    && input["id"] == "c2"
                    && input["actorId"] == "a1"
                    && input["priority"] == "high"
                    && input["signalInput"] == "sig"
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut req = check_request("c2");
        req.actor_id = Some("a1".into());
        req.priority = Some("high".into());
        req.signal_input = Some("sig".into());

        let resp = gateway(service, sanitizer).run_check(req).await.unwrap();
        assert_eq!(resp.id, "c2");
    }

    #[tokio::test]
    async fn test_actor_check_input_is_the_request() {
        let mut req = check_request("c5");
        req.actor_id = Some("a1".into());
        req.job_id = Some("job-9".into());
        req.attempt_number = Some(3);
        req.priority = Some("LOW".into());
        let expected = serde_json::to_value(&req).unwrap();

        let mut service = MockCommandService::new();
        service
            .expect_create_command()
            .withf(move |cmd| *cmd.command_input() == expected)
            .times(1)
            .returning(|_| Ok(()));

        gateway(service, MockSecretSanitizer::new())
            .run_check(req)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_check_with_unknown_priority_is_rejected_before_sanitizing() {
        let mut sanitizer = MockSecretSanitizer::new();
        sanitizer.expect_sanitize_partial_config().never();
        let mut service = MockCommandService::new();
        service.expect_create_command().never();
        let gw = gateway(service, sanitizer);

        let mut actor = check_request("c6");
        actor.actor_id = Some("a1".into());
        actor.priority = Some("urgent".into());
        let err = gw.run_check(actor).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let mut inline = check_request("c6");
        inline.actor_definition_id = Some("d1".into());
        inline.workspace_id = Some("w1".into());
        inline.config = Some(json!({"apiKey": "secret"}));
        inline.priority = Some("urgent".into());
        let err = gw.run_check(inline).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_failed_inline_check_discards_new_secrets() {
        let mut sanitizer = MockSecretSanitizer::new();
        sanitizer.expect_sanitize_partial_config().returning(|_, _, _| {
            Ok(json!({
                "apiKey": {"_secret": "workspace_w1_secret_new_v1"},
                "password": {"_secret": "workspace_w1_secret_old_v1"}
            }))
        });
        sanitizer
            .expect_discard_secrets()
            .withf(|coordinates| {
                coordinates.len() == 1 && coordinates[0] == "workspace_w1_secret_new_v1"
            })
            .times(1)
            .returning(|_| Ok(()));
        let mut service = MockCommandService::new();
        service
            .expect_create_command()
            .returning(|_| Err(ExecutorError::Unavailable("queue full".into())));

        let mut req = check_request("c7");
        req.actor_definition_id = Some("d1".into());
        req.workspace_id = Some("w1".into());
        req.config = Some(json!({
            "apiKey": "secret",
            "password": {"_secret": "workspace_w1_secret_old_v1"}
        }));

        let err = gateway(service, sanitizer).run_check(req).await.unwrap_err();
        assert!(matches!(err, CommandApiError::Executor(_)));
    }

    #[tokio::test]
    async fn test_check_rejects_mixed_and_partial_targets() {
        let mut service = MockCommandService::new();
        service.expect_create_command().never();
        let gw = gateway(service, MockSecretSanitizer::new());

        let mut mixed = check_request("c3");
        mixed.actor_id = Some("a1".into());
        mixed.config = Some(json!({}));
        let err = gw.run_check(mixed).await.unwrap_err();
        assert!(matches!(err, CommandApiError::Validation(_)));

        let mut partial = check_request("c3");
        partial.actor_definition_id = Some("d1".into());
        partial.config = Some(json!({}));
        let err = gw.run_check(partial).await.unwrap_err();
        assert!(matches!(err, CommandApiError::Validation(_)));

        let err = gw.run_check(check_request("c3")).await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_unknown_priority_and_empty_id_rejected() {
        let mut service = MockCommandService::new();
        service.expect_create_command().never();
        service.expect_cancel().never();
        let gw = gateway(service, MockSecretSanitizer::new());

        let mut req = discover_request("d1", "a1");
        req.priority = Some("urgent".into());
        let err = gw.run_discover(req).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = gw
            .cancel(CommandIdRequest { id: "  ".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, CommandApiError::Validation(_)));

        let err = gw.run_discover(discover_request("d1", "")).await.unwrap_err();
        assert!(matches!(err, CommandApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_sanitizer_rejection_is_client_error() {
        let mut sanitizer = MockSecretSanitizer::new();
        sanitizer
            .expect_sanitize_partial_config()
            .returning(|def, _, _| Err(SanitizerError::UnknownDefinition(def.to_owned())));
        let mut service = MockCommandService::new();
        service.expect_create_command().never();

        let mut req = check_request("c4");
        req.actor_definition_id = Some("nope".into());
        req.workspace_id = Some("w1".into());
        req.config = Some(json!({"apiKey": "secret"}));

        let err = gateway(service, sanitizer).run_check(req).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_cancel_echoes_id() {
        let mut service = MockCommandService::new();
        service
            .expect_cancel()
            .withf(|id| id.as_str() == "x1")
            .times(1)
            .returning(|_| Ok(()));

        let resp = gateway(service, MockSecretSanitizer::new())
            .cancel(CommandIdRequest { id: "x1".into() })
            .await
            .unwrap();
        assert_eq!(resp.id, "x1");
    }

    #[tokio::test]
    async fn test_status_maps_and_tolerates_unknown() {
        let mut service = MockCommandService::new();
        service
            .expect_get_status()
            .returning(|id| Ok((id.as_str() == "known").then_some(CommandStatus::Running)));
        let gw = gateway(service, MockSecretSanitizer::new());

        let resp = gw
            .get_status(CommandIdRequest { id: "known".into() })
            .await
            .unwrap();
        assert_eq!(resp.status, Some(crate::api::ApiCommandStatus::Running));

        let resp = gw
            .get_status(CommandIdRequest { id: "other".into() })
            .await
            .unwrap();
        assert_eq!(resp.status, None);
    }

    #[tokio::test]
    async fn test_check_output_defaults_retryable() {
        let mut service = MockCommandService::new();
        service.expect_get_connector_job_output().returning(|_| {
            Ok(Some(
                ConnectorJobOutput::check(CheckStatus::Failed, Some("bad creds".into()))
                    .with_failure_reason(FailureReason {
                        external_message: Some("bad creds".into()),
                        retryable: None,
                        ..Default::default()
                    }),
            ))
        });

        let resp = gateway(service, MockSecretSanitizer::new())
            .get_check_output(CommandIdRequest { id: "job-42".into() })
            .await
            .unwrap();

        assert_eq!(resp.id, "job-42");
        assert_eq!(resp.status, Some(ApiJobStatus::Failed));
        let reason = resp.failure_reason.unwrap();
        assert!(reason.retryable);
        assert_eq!(reason.external_message.as_deref(), Some("bad creds"));
    }

    #[tokio::test]
    async fn test_missing_check_output_has_only_id() {
        let mut service = MockCommandService::new();
        service
            .expect_get_connector_job_output()
            .returning(|_| Ok(None));

        let resp = gateway(service, MockSecretSanitizer::new())
            .get_check_output(CommandIdRequest { id: "none".into() })
            .await
            .unwrap();
        assert_eq!(resp.status, None);
        assert_eq!(resp.failure_reason, None);
    }

    #[tokio::test]
    async fn test_discover_output_converts_catalog() {
        let mut service = MockCommandService::new();
        service.expect_get_discover_output().returning(|_| {
            Ok(Some(DiscoverCommandOutput {
                catalog_id: Some("cat-1".into()),
                catalog: Some(ActorCatalog {
                    id: "cat-1".into(),
                    catalog: json!({"streams": [{
                        "name": "users",
                        "json_schema": {"type": "object"},
                        "supported_sync_modes": ["full_refresh"]
                    }]}),
                    catalog_hash: None,
                }),
                failure_reason: None,
            }))
        });

        let resp = gateway(service, MockSecretSanitizer::new())
            .get_discover_output(CommandIdRequest { id: "d1".into() })
            .await
            .unwrap();

        assert_eq!(resp.status, Some(ApiJobStatus::Succeeded));
        assert_eq!(resp.catalog_id.as_deref(), Some("cat-1"));
        let catalog = resp.catalog.unwrap();
        assert_eq!(catalog.streams.len(), 1);
        assert_eq!(catalog.streams[0].stream.name, "users");
    }

    #[tokio::test]
    async fn test_discover_output_with_malformed_catalog_fails() {
        let mut service = MockCommandService::new();
        service.expect_get_discover_output().returning(|_| {
            Ok(Some(DiscoverCommandOutput {
                catalog_id: Some("cat-2".into()),
                catalog: Some(ActorCatalog {
                    id: "cat-2".into(),
                    catalog: json!({"streams": "not a list"}),
                    catalog_hash: None,
                }),
                failure_reason: None,
            }))
        });

        let err = gateway(service, MockSecretSanitizer::new())
            .get_discover_output(CommandIdRequest { id: "d2".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, CommandApiError::CatalogConversion { ref id, .. } if id == "d2"));
    }

    #[tokio::test]
    async fn test_executor_failure_propagates() {
        let mut service = MockCommandService::new();
        service
            .expect_create_command()
            .returning(|_| Err(ExecutorError::Unavailable("queue full".into())));

        let err = gateway(service, MockSecretSanitizer::new())
            .run_discover(discover_request("d3", "a1"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandApiError::Executor(_)));
        assert!(!err.is_client_error());
    }
}
