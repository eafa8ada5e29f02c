use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("entry does not exist")]
    NonExistentEntry,

    #[error("entry already exists")]
    EntryAlreadyExists,

    #[error("codec error {0}")]
    CodecError(String),

    #[error("IO Error: {0}")]
    IoError(String),

    /// A compare-and-swap kept losing to concurrent writers.
    #[error("gave up after {0} conflicting attempts")]
    TooManyConflicts(u16),

    #[error("{0}")]
    Other(String),
}

impl DbError {
    pub fn codec(err: impl std::fmt::Display) -> Self {
        Self::CodecError(err.to_string())
    }
}
