//! Sled store for Conduit.

mod command;
mod config;
mod init;
mod secrets;
mod storage;
mod utils;

use std::{path::Path, sync::Arc};

use conduit_db_types::DbResult;

pub use crate::{
    command::SledCommandDb,
    config::SledDbConfig,
    init::open_sled_database,
    secrets::SledSecretPersistence,
    storage::SledStorageClient,
};

pub const SLED_NAME: &str = "conduit";

/// Opens the full sled backend under `datadir`.
pub fn open_sled_backend(
    datadir: &Path,
    dbname: &'static str,
    config: SledDbConfig,
) -> anyhow::Result<Arc<SledBackend>> {
    let sled_db = open_sled_database(datadir, dbname)?;
    SledBackend::new(sled_db, config)
        .map_err(|e| anyhow::anyhow!("failed to initialize sled backend: {e}"))
        .map(Arc::new)
}

/// All sled-backed stores sharing one database.
#[derive(Debug)]
pub struct SledBackend {
    storage: Arc<SledStorageClient>,
    secrets: Arc<SledSecretPersistence>,
    commands: Arc<SledCommandDb>,
}

impl SledBackend {
    pub fn new(sled_db: Arc<sled::Db>, config: SledDbConfig) -> DbResult<Self> {
        let storage = Arc::new(SledStorageClient::new(&sled_db, config.clone())?);
        let secrets = Arc::new(SledSecretPersistence::new(&sled_db)?);
        let commands = Arc::new(SledCommandDb::new(&sled_db, config)?);
        Ok(Self {
            storage,
            secrets,
            commands,
        })
    }

    pub fn storage_client(&self) -> Arc<SledStorageClient> {
        self.storage.clone()
    }

    pub fn secret_persistence(&self) -> Arc<SledSecretPersistence> {
        self.secrets.clone()
    }

    pub fn command_db(&self) -> Arc<SledCommandDb> {
        self.commands.clone()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_sled_backend_creates_datadir_layout() {
        let dir = tempfile::tempdir().unwrap();

        let backend = open_sled_backend(dir.path(), SLED_NAME, SledDbConfig::test()).unwrap();
        assert!(dir.path().join("sled").join(SLED_NAME).exists());

        // Handles share the underlying trees.
        let a = backend.storage_client();
        let b = backend.storage_client();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
