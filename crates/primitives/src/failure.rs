//! Structured failure reasons attached to job outputs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a failure originated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureOrigin {
    Source,
    Destination,
    Replication,
    Persistence,
    Normalization,
    Dbt,
    AirbytePlatform,
    Unknown,
}

/// Broad classification of a failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureType {
    ConfigError,
    SystemError,
    ManualCancellation,
    RefreshSchema,
    TransientError,
}

/// Failure record as written by workers.
///
/// `retryable` is optional here; consumers that need a definite answer treat
/// an unset value as retryable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReason {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_origin: Option<FailureOrigin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_type: Option<FailureType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<String>,
    /// Epoch millis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::serde_utils::present_value"
    )]
    pub metadata: Option<Value>,
}

impl FailureReason {
    /// Unset means retryable.
    pub fn is_retryable(&self) -> bool {
        self.retryable.unwrap_or(true)
    }
}
