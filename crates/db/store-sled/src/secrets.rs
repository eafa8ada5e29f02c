use conduit_db_types::{traits::SecretPersistence, DbError, DbResult};

use crate::utils::{open_tree, to_db_error};

const SECRETS_TREE: &str = "secrets";

#[derive(Debug)]
pub struct SledSecretPersistence {
    tree: sled::Tree,
}

impl SledSecretPersistence {
    pub fn new(db: &sled::Db) -> DbResult<Self> {
        Ok(Self {
            tree: open_tree(db, SECRETS_TREE)?,
        })
    }
}

impl SecretPersistence for SledSecretPersistence {
    fn write_secret(&self, coordinate: &str, payload: &str) -> DbResult<()> {
        self.tree
            .insert(coordinate.as_bytes(), payload.as_bytes())
            .map_err(to_db_error)?;
        Ok(())
    }

    fn read_secret(&self, coordinate: &str) -> DbResult<Option<String>> {
        self.tree
            .get(coordinate.as_bytes())
            .map_err(to_db_error)?
            .map(|raw| String::from_utf8(raw.to_vec()).map_err(DbError::codec))
            .transpose()
    }

    fn delete_secret(&self, coordinate: &str) -> DbResult<bool> {
        let removed = self
            .tree
            .remove(coordinate.as_bytes())
            .map_err(to_db_error)?;
        Ok(removed.is_some())
    }
}

#[cfg(test)]
mod tests {
    use conduit_db_types::conformance;

    use super::*;
    use crate::test_utils::temp_db;

    #[test]
    fn test_secret_persistence_conformance() {
        let persistence = SledSecretPersistence::new(&temp_db()).unwrap();
        conformance::secret_persistence_tests(&persistence);
    }
}
