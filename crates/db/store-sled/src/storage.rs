use async_trait::async_trait;
use conduit_db_types::{traits::StorageClient, DbError, DbResult};

use crate::{
    utils::{open_tree, to_db_error},
    SledDbConfig,
};

const OUTPUT_DOCUMENTS_TREE: &str = "output_documents";

/// Document store over a single sled tree.
#[derive(Debug)]
pub struct SledStorageClient {
    tree: sled::Tree,
    config: SledDbConfig,
}

impl SledStorageClient {
    pub fn new(db: &sled::Db, config: SledDbConfig) -> DbResult<Self> {
        Ok(Self {
            tree: open_tree(db, OUTPUT_DOCUMENTS_TREE)?,
            config,
        })
    }
}

#[async_trait]
impl StorageClient for SledStorageClient {
    async fn write(&self, key: &str, document: &str) -> DbResult<()> {
        self.tree
            .insert(key.as_bytes(), document.as_bytes())
            .map_err(to_db_error)?;
        if self.config.flush_on_write {
            self.tree.flush_async().await.map_err(to_db_error)?;
        }
        Ok(())
    }

    async fn read(&self, key: &str) -> DbResult<Option<String>> {
        let Some(raw) = self.tree.get(key.as_bytes()).map_err(to_db_error)? else {
            return Ok(None);
        };
        let text = String::from_utf8(raw.to_vec()).map_err(DbError::codec)?;
        Ok(Some(text))
    }

    async fn delete(&self, key: &str) -> DbResult<bool> {
        let old = self.tree.remove(key.as_bytes()).map_err(to_db_error)?;
        Ok(old.is_some())
    }
}
