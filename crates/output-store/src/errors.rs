use conduit_db_types::DbError;
use thiserror::Error;

/// Underlying reason a store access failed.
#[derive(Debug, Error)]
pub enum AccessCause {
    #[error(transparent)]
    Storage(#[from] DbError),

    #[error("malformed document: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Failure to access the document store for a given key.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DocStoreAccessError {
    message: String,
    key: String,
    #[source]
    source: AccessCause,
}

impl DocStoreAccessError {
    pub(crate) fn read(key: &str, source: impl Into<AccessCause>) -> Self {
        Self::new(format!("unable to read output for {key}"), key, source)
    }

    pub(crate) fn write(key: &str, source: impl Into<AccessCause>) -> Self {
        Self::new(format!("unable to write output for {key}"), key, source)
    }

    pub(crate) fn delete(key: &str, source: impl Into<AccessCause>) -> Self {
        Self::new(format!("unable to delete output for {key}"), key, source)
    }

    fn new(message: String, key: &str, source: impl Into<AccessCause>) -> Self {
        Self {
            message,
            key: key.to_string(),
            source: source.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn cause(&self) -> &AccessCause {
        &self.source
    }
}

pub type OutputStoreResult<T> = Result<T, DocStoreAccessError>;
