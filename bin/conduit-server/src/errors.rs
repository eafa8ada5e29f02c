//! Error types for initialization and configuration.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum InitError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("unparsable config file: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config: {0}")]
    MalformedConfig(#[from] ConfigError),

    #[error("datadir path is not valid UTF-8: {0:?}")]
    InvalidDatadirPath(PathBuf),

    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// Tried to traverse into a primitive.
    #[error("can't traverse into non-table key '{key}' at '{path}'")]
    TraverseNonTableAt { key: String, path: String },

    /// Invalid override string.
    #[error("invalid override: '{0}'")]
    InvalidOverride(String),

    #[error("auth is enabled but no tokens are configured")]
    NoAuthTokens,

    #[error("storage retry_count must be at least 1")]
    ZeroRetries,
}
