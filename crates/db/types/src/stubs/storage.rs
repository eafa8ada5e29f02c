use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{traits::StorageClient, DbResult};

#[derive(Debug, Default)]
pub struct InMemoryStorageClient {
    docs: Mutex<HashMap<String, String>>,
}

impl InMemoryStorageClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.lock().is_empty()
    }
}

#[async_trait]
impl StorageClient for InMemoryStorageClient {
    async fn write(&self, key: &str, document: &str) -> DbResult<()> {
        self.docs
            .lock()
            .insert(key.to_string(), document.to_string());
        Ok(())
    }

    async fn read(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.docs.lock().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> DbResult<bool> {
        Ok(self.docs.lock().remove(key).is_some())
    }
}
