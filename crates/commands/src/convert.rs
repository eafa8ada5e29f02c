//! Domain to wire conversions.

use conduit_primitives::{
    CheckStatus, CommandStatus, ConnectorJobOutput, DiscoverCommandOutput, FailureReason,
    ProtocolCatalog, ProtocolStream, SyncMode,
};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{
    ApiCatalog, ApiCommandStatus, ApiFailureReason, ApiJobStatus, ApiStream,
    ApiStreamAndConfiguration, ApiStreamConfiguration, DestinationSyncMode,
};

/// Unset `retryable` goes out as `true`.
pub fn failure_reason_to_api(reason: &FailureReason) -> ApiFailureReason {
    ApiFailureReason {
        failure_origin: reason.failure_origin,
        failure_type: reason.failure_type,
        external_message: reason.external_message.clone(),
        internal_message: reason.internal_message.clone(),
        stacktrace: reason.stacktrace.clone(),
        timestamp: reason.timestamp,
        retryable: reason.is_retryable(),
    }
}

pub fn check_status_to_api(status: CheckStatus) -> ApiJobStatus {
    match status {
        CheckStatus::Succeeded => ApiJobStatus::Succeeded,
        CheckStatus::Failed => ApiJobStatus::Failed,
    }
}

pub fn command_status_to_api(status: CommandStatus) -> ApiCommandStatus {
    match status {
        CommandStatus::Pending => ApiCommandStatus::Pending,
        CommandStatus::Running => ApiCommandStatus::Running,
        CommandStatus::Completed => ApiCommandStatus::Completed,
        CommandStatus::Cancelled => ApiCommandStatus::Cancelled,
    }
}

/// Status of a stored check output, if it carries a check result at all.
pub fn check_output_status(output: &ConnectorJobOutput) -> Option<ApiJobStatus> {
    output
        .check_connection
        .as_ref()
        .map(|c| check_status_to_api(c.status))
}

/// Discover succeeded iff no failure reason was recorded. Catalog presence
/// plays no part.
pub fn discover_status(output: &DiscoverCommandOutput) -> ApiJobStatus {
    match output.failure_reason {
        None => ApiJobStatus::Succeeded,
        Some(_) => ApiJobStatus::Failed,
    }
}

/// Translates protocol catalogs into API catalogs with default stream
/// configuration.
#[derive(Copy, Clone, Debug, Default)]
pub struct CatalogConverter;

impl CatalogConverter {
    pub fn new() -> Self {
        Self
    }

    /// Parses a stored protocol catalog document and converts it.
    pub fn protocol_value_to_api(&self, catalog: &Value) -> Result<ApiCatalog, serde_json::Error> {
        let protocol = ProtocolCatalog::deserialize(catalog)?;
        Ok(self.to_api(&protocol))
    }

    pub fn to_api(&self, catalog: &ProtocolCatalog) -> ApiCatalog {
        ApiCatalog {
            streams: catalog
                .streams
                .iter()
                .map(|s| ApiStreamAndConfiguration {
                    stream: to_api_stream(s),
                    config: default_stream_config(s),
                })
                .collect(),
        }
    }
}

fn to_api_stream(stream: &ProtocolStream) -> ApiStream {
    ApiStream {
        name: stream.name.clone(),
        json_schema: stream.json_schema.clone(),
        supported_sync_modes: stream.supported_sync_modes.clone(),
        source_defined_cursor: stream.source_defined_cursor,
        default_cursor_field: stream.default_cursor_field.clone(),
        source_defined_primary_key: stream.source_defined_primary_key.clone(),
        namespace: stream.namespace.clone(),
        is_resumable: stream.is_resumable,
    }
}

fn default_stream_config(stream: &ProtocolStream) -> ApiStreamConfiguration {
    ApiStreamConfiguration {
        sync_mode: stream
            .supported_sync_modes
            .first()
            .copied()
            .unwrap_or(SyncMode::Incremental),
        cursor_field: stream.default_cursor_field.clone(),
        destination_sync_mode: DestinationSyncMode::Append,
        primary_key: stream.source_defined_primary_key.clone(),
        alias_name: alias_name(&stream.name),
        selected: true,
        suggested: false,
        field_selection_enabled: false,
    }
}

/// Stream name with every non-alphanumeric character replaced by `_`.
fn alias_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
