//! Terminal job outputs persisted in the output store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::failure::FailureReason;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    CheckConnection,
    DiscoverCatalogId,
    Spec,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Succeeded,
    Failed,
}

/// Result of a connection check as reported by the connector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardCheckConnectionOutput {
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Output of a connector job (check, discover or spec).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorJobOutput {
    pub output_type: OutputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_connection: Option<StandardCheckConnectionOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discover_catalog_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<FailureReason>,
}

impl ConnectorJobOutput {
    pub fn check(status: CheckStatus, message: Option<String>) -> Self {
        Self {
            output_type: OutputType::CheckConnection,
            check_connection: Some(StandardCheckConnectionOutput { status, message }),
            discover_catalog_id: None,
            failure_reason: None,
        }
    }

    pub fn with_failure_reason(mut self, reason: FailureReason) -> Self {
        self.failure_reason = Some(reason);
        self
    }
}

/// A discovered catalog as persisted for an actor. `catalog` holds the
/// protocol-format document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorCatalog {
    pub id: String,
    pub catalog: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_hash: Option<String>,
}

/// Output of a discover command. `catalog` is absent when the job failed
/// before producing one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverCommandOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<ActorCatalog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<FailureReason>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicationStatus {
    Completed,
    Failed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationAttemptSummary {
    pub status: ReplicationStatus,
    #[serde(default)]
    pub records_synced: u64,
    #[serde(default)]
    pub bytes_synced: u64,
    /// Epoch millis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// Epoch millis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

/// Output of a sync (replication) attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationOutput {
    pub replication_attempt_summary: ReplicationAttemptSummary,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::serde_utils::present_value"
    )]
    pub state: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::serde_utils::present_value"
    )]
    pub output_catalog: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureReason>,
}
