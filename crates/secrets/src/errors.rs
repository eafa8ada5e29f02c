use std::{io, path::PathBuf};

use conduit_db_types::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SanitizerError {
    #[error("unknown actor definition {0}")]
    UnknownDefinition(String),

    #[error("connector configuration must be a JSON object")]
    InvalidConfig,

    #[error("failed to persist secret: {0}")]
    Persistence(#[from] DbError),

    #[error("failed to read connector spec {path}: {source}")]
    SpecIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed connector spec {path}: {source}")]
    SpecParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SanitizerError {
    /// Whether the caller sent something we can't sanitize, as opposed to an
    /// internal failure.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            SanitizerError::UnknownDefinition(_) | SanitizerError::InvalidConfig
        )
    }
}

pub type SanitizerResult<T> = Result<T, SanitizerError>;
