//! Serde helpers for optional JSON payloads.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a field that is present as `Some`, even when it holds `null`.
///
/// Paired with `#[serde(default)]` so an absent field stays `None`. A plain
/// `Option<Value>` would read an explicit `null` back as `None`.
pub(crate) fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
