//! Commands: one asynchronous check or discover job tracked by a caller-supplied id.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::priority::Priority;

/// Opaque, caller-supplied command identifier. Doubles as the idempotency key
/// and as the output store key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(String);

impl CommandId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CommandId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for CommandId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Job kinds the gateway can run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Check,
    Discover,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Check => f.write_str("check"),
            CommandKind::Discover => f.write_str("discover"),
        }
    }
}

/// Reference to an already configured actor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRef {
    pub actor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_number: Option<u64>,
}

/// Ad hoc connector configuration. The configuration must already be sanitized
/// by the time it lands here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineConfig {
    pub actor_definition_id: String,
    pub workspace_id: String,
    pub configuration: Value,
}

/// Exactly one of an actor reference or an inline configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActorContext {
    Actor(ActorRef),
    Inline(InlineConfig),
}

impl ActorContext {
    pub fn actor_ref(&self) -> Option<&ActorRef> {
        match self {
            ActorContext::Actor(r) => Some(r),
            ActorContext::Inline(_) => None,
        }
    }

    pub fn inline_config(&self) -> Option<&InlineConfig> {
        match self {
            ActorContext::Actor(_) => None,
            ActorContext::Inline(c) => Some(c),
        }
    }
}

/// A unit of work handed to the executor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    id: CommandId,
    kind: CommandKind,
    priority: Priority,
    actor: ActorContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signal_input: Option<String>,
    command_input: Value,
}

impl Command {
    /// Check command against an existing actor.
    pub fn check_actor(
        id: CommandId,
        actor: ActorRef,
        priority: Priority,
        signal_input: Option<String>,
        command_input: Value,
    ) -> Self {
        Self {
            id,
            kind: CommandKind::Check,
            priority,
            actor: ActorContext::Actor(actor),
            signal_input,
            command_input,
        }
    }

    /// Check command against an inline (already sanitized) configuration.
    pub fn check_inline(
        id: CommandId,
        config: InlineConfig,
        priority: Priority,
        signal_input: Option<String>,
        command_input: Value,
    ) -> Self {
        Self {
            id,
            kind: CommandKind::Check,
            priority,
            actor: ActorContext::Inline(config),
            signal_input,
            command_input,
        }
    }

    /// Discover commands only ever reference an existing actor.
    pub fn discover(
        id: CommandId,
        actor: ActorRef,
        priority: Priority,
        signal_input: Option<String>,
        command_input: Value,
    ) -> Self {
        Self {
            id,
            kind: CommandKind::Discover,
            priority,
            actor: ActorContext::Actor(actor),
            signal_input,
            command_input,
        }
    }

    pub fn id(&self) -> &CommandId {
        &self.id
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn actor(&self) -> &ActorContext {
        &self.actor
    }

    pub fn signal_input(&self) -> Option<&str> {
        self.signal_input.as_deref()
    }

    pub fn command_input(&self) -> &Value {
        &self.command_input
    }
}

/// Executor-owned lifecycle state of a command.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Pending,
    Running,
    Completed,
    Cancelled,
}

impl CommandStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CommandStatus::Completed | CommandStatus::Cancelled)
    }
}

/// A command together with its tracked status, as persisted by an executor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRecord {
    pub command: Command,
    pub status: CommandStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommandRecord {
    pub fn new(command: Command) -> Self {
        let now = Utc::now();
        Self {
            command,
            status: CommandStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, status: CommandStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn actor() -> ActorRef {
        ActorRef {
            actor_id: "a1".into(),
            job_id: Some("7".into()),
            attempt_number: Some(2),
        }
    }

    #[test]
    fn test_discover_is_actor_shaped() {
        let cmd = Command::discover(
            "d1".into(),
            actor(),
            Priority::Default,
            None,
            json!({}),
        );
        assert_eq!(cmd.kind(), CommandKind::Discover);
        assert!(cmd.actor().actor_ref().is_some());
        assert!(cmd.actor().inline_config().is_none());
    }

    #[test]
    fn test_record_roundtrips_through_json() {
        let cmd = Command::check_inline(
            "c1".into(),
            InlineConfig {
                actor_definition_id: "d1".into(),
                workspace_id: "w1".into(),
                configuration: json!({"host": "localhost"}),
            },
            Priority::High,
            Some("signal".into()),
            json!({"id": "c1"}),
        );
        let record = CommandRecord::new(cmd);

        let text = serde_json::to_string(&record).unwrap();
        let back: CommandRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!CommandStatus::Pending.is_terminal());
        assert!(!CommandStatus::Running.is_terminal());
        assert!(CommandStatus::Completed.is_terminal());
        assert!(CommandStatus::Cancelled.is_terminal());
    }
}
