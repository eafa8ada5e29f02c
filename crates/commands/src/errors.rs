use conduit_db_types::DbError;
use conduit_output_store::DocStoreAccessError;
use conduit_primitives::CommandId;
use conduit_secrets::SanitizerError;
use thiserror::Error;

/// Failures reported by a [`CommandService`](crate::CommandService).
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    OutputStore(#[from] DocStoreAccessError),

    #[error("command store: {0}")]
    Db(#[from] DbError),

    #[error("unknown command {0}")]
    UnknownCommand(CommandId),

    #[error("executor unavailable: {0}")]
    Unavailable(String),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Errors surfaced by the command gateway.
#[derive(Debug, Error)]
pub enum CommandApiError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    DocStoreAccess(DocStoreAccessError),

    #[error("executor failure: {0}")]
    Executor(#[source] ExecutorError),

    #[error("sanitizer: {0}")]
    Sanitizer(#[from] SanitizerError),

    #[error("failed to convert catalog for {id}: {source}")]
    CatalogConversion {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CommandApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            CommandApiError::Validation(_) => "VALIDATION_ERROR",
            CommandApiError::DocStoreAccess(_) => "DOC_STORE_ACCESS",
            CommandApiError::Executor(_) => "EXECUTOR_ERROR",
            CommandApiError::Sanitizer(e) if e.is_invalid_input() => "VALIDATION_ERROR",
            CommandApiError::Sanitizer(_) => "SANITIZER_ERROR",
            CommandApiError::CatalogConversion { .. } => "CATALOG_CONVERSION",
        }
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        match self {
            CommandApiError::Validation(_) => true,
            CommandApiError::Sanitizer(e) => e.is_invalid_input(),
            _ => false,
        }
    }
}

impl From<ExecutorError> for CommandApiError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::OutputStore(e) => CommandApiError::DocStoreAccess(e),
            other => CommandApiError::Executor(other),
        }
    }
}

pub type CommandApiResult<T> = Result<T, CommandApiError>;
