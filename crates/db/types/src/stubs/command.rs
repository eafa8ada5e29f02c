use std::collections::HashMap;

use conduit_primitives::{CommandId, CommandRecord, CommandStatus};
use parking_lot::Mutex;

use crate::{traits::CommandDatabase, DbError, DbResult};

#[derive(Debug, Default)]
pub struct StubCommandDb {
    records: Mutex<HashMap<CommandId, CommandRecord>>,
}

impl StubCommandDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandDatabase for StubCommandDb {
    fn put_command(&self, record: CommandRecord) -> DbResult<()> {
        let mut tbl = self.records.lock();
        let id = record.command.id().clone();
        if tbl.contains_key(&id) {
            return Err(DbError::EntryAlreadyExists);
        }
        tbl.insert(id, record);
        Ok(())
    }

    fn get_command(&self, id: &CommandId) -> DbResult<Option<CommandRecord>> {
        Ok(self.records.lock().get(id).cloned())
    }

    fn update_status(
        &self,
        id: &CommandId,
        status: CommandStatus,
        allowed_from: fn(CommandStatus) -> bool,
    ) -> DbResult<Option<CommandRecord>> {
        let mut tbl = self.records.lock();
        let record = tbl.get_mut(id).ok_or(DbError::NonExistentEntry)?;
        if !allowed_from(record.status) {
            return Ok(None);
        }
        record.update_status(status);
        Ok(Some(record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance;

    #[test]
    fn test_command_db_conformance() {
        conformance::command_db_tests(&StubCommandDb::new());
    }
}
