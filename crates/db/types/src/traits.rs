//! Trait definitions for the storage backends.

use async_trait::async_trait;
use conduit_primitives::{CommandId, CommandRecord, CommandStatus};

use crate::DbResult;

/// Blob store for text documents keyed by string.
///
/// Writes overwrite unconditionally. A missing key reads as `None`, never as
/// an error.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait StorageClient: Send + Sync + 'static {
    /// Stores `document` under `key`, replacing any previous value.
    async fn write(&self, key: &str, document: &str) -> DbResult<()>;

    /// Returns the document stored under `key`, if any.
    async fn read(&self, key: &str) -> DbResult<Option<String>>;

    /// Removes `key`. Returns whether anything was removed.
    async fn delete(&self, key: &str) -> DbResult<bool>;
}

/// Storage for secret payloads addressed by coordinate strings.
pub trait SecretPersistence: Send + Sync + 'static {
    /// Stores a payload under `coordinate`, replacing any previous value.
    fn write_secret(&self, coordinate: &str, payload: &str) -> DbResult<()>;

    fn read_secret(&self, coordinate: &str) -> DbResult<Option<String>>;

    /// Removes the payload under `coordinate`. Returns whether anything was
    /// removed.
    fn delete_secret(&self, coordinate: &str) -> DbResult<bool>;
}

/// Command records tracked by the local executor.
pub trait CommandDatabase: Send + Sync + 'static {
    /// Inserts a new record. Fails with [`DbError::EntryAlreadyExists`] if the
    /// id is taken.
    ///
    /// [`DbError::EntryAlreadyExists`]: crate::DbError::EntryAlreadyExists
    fn put_command(&self, record: CommandRecord) -> DbResult<()>;

    fn get_command(&self, id: &CommandId) -> DbResult<Option<CommandRecord>>;

    /// Sets the status of an existing record and returns the updated record.
    ///
    /// `allowed_from` is checked against the stored status atomically with the
    /// write. If it rejects the current status the record is left untouched
    /// and `None` is returned. Fails with [`DbError::NonExistentEntry`] for
    /// unknown ids.
    ///
    /// [`DbError::NonExistentEntry`]: crate::DbError::NonExistentEntry
    fn update_status(
        &self,
        id: &CommandId,
        status: CommandStatus,
        allowed_from: fn(CommandStatus) -> bool,
    ) -> DbResult<Option<CommandRecord>>;
}
