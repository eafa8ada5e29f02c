//! In-memory backends for tests and single-process runs.

mod command;
mod secret;
mod storage;

pub use command::StubCommandDb;
pub use secret::StubSecretPersistence;
pub use storage::InMemoryStorageClient;
