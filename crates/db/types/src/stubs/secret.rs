use std::collections::HashMap;

use parking_lot::Mutex;

use crate::{traits::SecretPersistence, DbResult};

#[derive(Debug, Default)]
pub struct StubSecretPersistence {
    secrets: Mutex<HashMap<String, String>>,
}

impl StubSecretPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.secrets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.lock().is_empty()
    }
}

impl SecretPersistence for StubSecretPersistence {
    fn write_secret(&self, coordinate: &str, payload: &str) -> DbResult<()> {
        self.secrets
            .lock()
            .insert(coordinate.to_string(), payload.to_string());
        Ok(())
    }

    fn read_secret(&self, coordinate: &str) -> DbResult<Option<String>> {
        Ok(self.secrets.lock().get(coordinate).cloned())
    }

    fn delete_secret(&self, coordinate: &str) -> DbResult<bool> {
        Ok(self.secrets.lock().remove(coordinate).is_some())
    }
}
