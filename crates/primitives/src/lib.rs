//! Domain types shared by the command gateway, the output store and the executor.
//!
//! Everything here is plain data: commands and their actor context, the
//! terminal outputs persisted per command id, failure reasons and the
//! protocol-format catalog produced by discover jobs.

pub mod catalog;
pub mod command;
pub mod failure;
pub mod output;
pub mod priority;
mod serde_utils;

pub use catalog::{ProtocolCatalog, ProtocolStream, SyncMode};
pub use command::{
    ActorContext, ActorRef, Command, CommandId, CommandKind, CommandRecord, CommandStatus,
    InlineConfig,
};
pub use failure::{FailureOrigin, FailureReason, FailureType};
pub use output::{
    ActorCatalog, CheckStatus, ConnectorJobOutput, DiscoverCommandOutput, OutputType,
    ReplicationAttemptSummary, ReplicationOutput, ReplicationStatus, StandardCheckConnectionOutput,
};
pub use priority::{ParsePriorityError, Priority};
