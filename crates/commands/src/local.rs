//! In-process executor over the embedded command table and the output store.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use conduit_db_types::{traits::CommandDatabase, DbError};
use conduit_output_store::OutputStore;
use conduit_primitives::{
    Command, CommandId, CommandRecord, CommandStatus, ConnectorJobOutput, DiscoverCommandOutput,
};
use tracing::*;

use crate::{CommandService, ExecutorError, ExecutorResult};

pub struct LocalCommandService {
    db: Arc<dyn CommandDatabase>,
    store: OutputStore,
}

impl fmt::Debug for LocalCommandService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCommandService")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl LocalCommandService {
    pub fn new(db: Arc<dyn CommandDatabase>, store: OutputStore) -> Self {
        Self { db, store }
    }

    /// Moves a live command to `status`. Returns `false` if the command had
    /// already finished, in which case nothing changes.
    fn transition(&self, id: &CommandId, status: CommandStatus) -> ExecutorResult<bool> {
        match self.db.update_status(id, status, not_terminal) {
            Ok(updated) => Ok(updated.is_some()),
            Err(DbError::NonExistentEntry) => Err(ExecutorError::UnknownCommand(id.clone())),
            Err(other) => Err(ExecutorError::Db(other)),
        }
    }

    /// Returns whether the command is still live, failing for unknown ids.
    fn ensure_live(&self, id: &CommandId) -> ExecutorResult<bool> {
        let record = self
            .db
            .get_command(id)?
            .ok_or_else(|| ExecutorError::UnknownCommand(id.clone()))?;
        if record.status.is_terminal() {
            debug!(%id, status = ?record.status, "command already finished");
            return Ok(false);
        }
        Ok(true)
    }

    /// A worker picked the command up.
    pub async fn mark_running(&self, id: &CommandId) -> ExecutorResult<()> {
        if !self.transition(id, CommandStatus::Running)? {
            debug!(%id, "not starting finished command");
        }
        Ok(())
    }

    /// Persists the check output, then marks the command completed. A command
    /// that already finished is left as it is and no output is written.
    pub async fn complete_check(
        &self,
        id: &CommandId,
        output: &ConnectorJobOutput,
    ) -> ExecutorResult<()> {
        if !self.ensure_live(id)? {
            return Ok(());
        }
        self.store.write(id.as_str(), output).await?;
        if self.transition(id, CommandStatus::Completed)? {
            info!(%id, "check command completed");
        }
        Ok(())
    }

    /// Persists the discover output, then marks the command completed. A
    /// command that already finished is left as it is and no output is written.
    pub async fn complete_discover(
        &self,
        id: &CommandId,
        output: &DiscoverCommandOutput,
    ) -> ExecutorResult<()> {
        if !self.ensure_live(id)? {
            return Ok(());
        }
        self.store.write_output(id.as_str(), output).await?;
        if self.transition(id, CommandStatus::Completed)? {
            info!(%id, "discover command completed");
        }
        Ok(())
    }
}

fn not_terminal(status: CommandStatus) -> bool {
    !status.is_terminal()
}

#[async_trait]
impl CommandService for LocalCommandService {
    async fn create_command(&self, command: Command) -> ExecutorResult<()> {
        let id = command.id().clone();
        let kind = command.kind();
        match self.db.put_command(CommandRecord::new(command)) {
            Ok(()) => {
                info!(%id, %kind, "command created");
                Ok(())
            }
            Err(DbError::EntryAlreadyExists) => {
                debug!(%id, "command already exists, ignoring resubmission");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn cancel(&self, id: &CommandId) -> ExecutorResult<()> {
        match self.transition(id, CommandStatus::Cancelled) {
            Ok(true) => info!(%id, "command cancelled"),
            Ok(false) => debug!(%id, "cancel for finished command"),
            Err(ExecutorError::UnknownCommand(_)) => debug!(%id, "cancel for unknown command"),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn get_status(&self, id: &CommandId) -> ExecutorResult<Option<CommandStatus>> {
        Ok(self.db.get_command(id)?.map(|r| r.status))
    }

    async fn get_connector_job_output(
        &self,
        id: &CommandId,
    ) -> ExecutorResult<Option<ConnectorJobOutput>> {
        Ok(self.store.read(id.as_str()).await?)
    }

    async fn get_discover_output(
        &self,
        id: &CommandId,
    ) -> ExecutorResult<Option<DiscoverCommandOutput>> {
        Ok(self.store.read_output(id.as_str()).await?)
    }
}
