use conduit_db_types::DbError;

pub(crate) fn to_db_error(err: sled::Error) -> DbError {
    match err {
        sled::Error::Io(e) => DbError::IoError(e.to_string()),
        other => DbError::Other(format!("sled error: {other:?}")),
    }
}

pub(crate) fn open_tree(db: &sled::Db, name: &'static str) -> Result<sled::Tree, DbError> {
    db.open_tree(name).map_err(to_db_error)
}
