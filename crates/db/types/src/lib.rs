//! Storage interfaces behind the gateway: the document store holding job
//! outputs, secret persistence and the command table.

pub mod errors;
#[cfg(any(test, feature = "test-utils"))]
pub mod conformance;
#[cfg(any(test, feature = "stubs"))]
pub mod stubs;
pub mod traits;

pub use errors::DbError;

pub type DbResult<T> = Result<T, DbError>;
