use async_trait::async_trait;
use conduit_primitives::{
    Command, CommandId, CommandStatus, ConnectorJobOutput, DiscoverCommandOutput,
};

use crate::ExecutorResult;

/// The executor seam. Owns command lifecycle and terminal output.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait CommandService: Send + Sync + 'static {
    /// Submits a command. Re-submitting a known id does nothing.
    async fn create_command(&self, command: Command) -> ExecutorResult<()>;

    /// Requests cancellation. No confirmation is given.
    async fn cancel(&self, id: &CommandId) -> ExecutorResult<()>;

    async fn get_status(&self, id: &CommandId) -> ExecutorResult<Option<CommandStatus>>;

    async fn get_connector_job_output(
        &self,
        id: &CommandId,
    ) -> ExecutorResult<Option<ConnectorJobOutput>>;

    async fn get_discover_output(
        &self,
        id: &CommandId,
    ) -> ExecutorResult<Option<DiscoverCommandOutput>>;
}
