use conduit_db_types::{traits::CommandDatabase, DbError, DbResult};
use conduit_primitives::{CommandId, CommandRecord, CommandStatus};

use crate::{
    utils::{open_tree, to_db_error},
    SledDbConfig,
};

const COMMANDS_TREE: &str = "commands";

/// Command records as JSON values keyed by command id.
#[derive(Debug)]
pub struct SledCommandDb {
    tree: sled::Tree,
    config: SledDbConfig,
}

impl SledCommandDb {
    pub fn new(db: &sled::Db, config: SledDbConfig) -> DbResult<Self> {
        Ok(Self {
            tree: open_tree(db, COMMANDS_TREE)?,
            config,
        })
    }
}

fn encode(record: &CommandRecord) -> DbResult<Vec<u8>> {
    serde_json::to_vec(record).map_err(DbError::codec)
}

fn decode(raw: &[u8]) -> DbResult<CommandRecord> {
    serde_json::from_slice(raw).map_err(DbError::codec)
}

impl CommandDatabase for SledCommandDb {
    fn put_command(&self, record: CommandRecord) -> DbResult<()> {
        let key = record.command.id().as_str().as_bytes().to_vec();
        let value = encode(&record)?;

        self.tree
            .compare_and_swap(key, None as Option<&[u8]>, Some(value))
            .map_err(to_db_error)?
            .map_err(|_| DbError::EntryAlreadyExists)
    }

    fn get_command(&self, id: &CommandId) -> DbResult<Option<CommandRecord>> {
        self.tree
            .get(id.as_str().as_bytes())
            .map_err(to_db_error)?
            .map(|raw| decode(&raw))
            .transpose()
    }

    fn update_status(
        &self,
        id: &CommandId,
        status: CommandStatus,
        allowed_from: fn(CommandStatus) -> bool,
    ) -> DbResult<Option<CommandRecord>> {
        let key = id.as_str().as_bytes();

        self.config.with_retry(|| {
            let old = self
                .tree
                .get(key)
                .map_err(to_db_error)?
                .ok_or(DbError::NonExistentEntry)?;

            let mut record = decode(&old)?;
            // Checked against the same bytes the swap compares with.
            if !allowed_from(record.status) {
                return Ok(Some(None));
            }
            record.update_status(status);
            let new = encode(&record)?;

            let swapped = self
                .tree
                .compare_and_swap(key, Some(old), Some(new))
                .map_err(to_db_error)?;
            Ok(swapped.ok().map(|()| Some(record)))
        })
    }
}
