//! Durable store for terminal job output, keyed by job or command id.
//!
//! Documents are JSON text. Every access is counted by outcome in
//! [`OutputStoreMetrics`] and every failure surfaces as a
//! [`DocStoreAccessError`] carrying the key. Nothing here retries.

mod errors;

use std::{fmt, sync::Arc};

use conduit_common::metrics::{Outcome, OutputStoreMetrics};
use conduit_db_types::traits::StorageClient;
use conduit_primitives::{ConnectorJobOutput, ReplicationOutput};
use serde::{de::DeserializeOwned, Serialize};
use tracing::*;

pub use crate::errors::{AccessCause, DocStoreAccessError, OutputStoreResult};

/// Typed front over a [`StorageClient`]. All output types share one key
/// namespace.
#[derive(Clone)]
pub struct OutputStore {
    client: Arc<dyn StorageClient>,
    metrics: OutputStoreMetrics,
}

impl fmt::Debug for OutputStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStore")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl OutputStore {
    pub fn new(client: Arc<dyn StorageClient>, metrics: OutputStoreMetrics) -> Self {
        Self { client, metrics }
    }

    pub fn metrics(&self) -> &OutputStoreMetrics {
        &self.metrics
    }

    /// Serializes `output` and stores it under `id`, replacing any previous
    /// value.
    pub async fn write_output<T>(&self, id: &str, output: &T) -> OutputStoreResult<()>
    where
        T: Serialize + Sync,
    {
        let res = self.write_inner(id, output).await;
        self.metrics.record_write(Outcome::of(&res));
        if let Err(e) = &res {
            warn!(%id, err = %e.cause(), "failed to write job output");
        }
        res
    }

    async fn write_inner<T>(&self, id: &str, output: &T) -> OutputStoreResult<()>
    where
        T: Serialize + Sync,
    {
        let doc = serde_json::to_string(output).map_err(|e| DocStoreAccessError::write(id, e))?;
        self.client
            .write(id, &doc)
            .await
            .map_err(|e| DocStoreAccessError::write(id, e))
    }

    /// Reads and deserializes the output stored under `id`. A missing document
    /// is `Ok(None)`.
    pub async fn read_output<T>(&self, id: &str) -> OutputStoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let res = self.read_inner(id).await;
        self.metrics.record_read(Outcome::of(&res));
        if let Err(e) = &res {
            warn!(%id, err = %e.cause(), "failed to read job output");
        }
        res
    }

    async fn read_inner<T>(&self, id: &str) -> OutputStoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(doc) = self
            .client
            .read(id)
            .await
            .map_err(|e| DocStoreAccessError::read(id, e))?
        else {
            trace!(%id, "no output stored");
            return Ok(None);
        };

        serde_json::from_str(&doc)
            .map(Some)
            .map_err(|e| DocStoreAccessError::read(id, e))
    }

    /// Removes the output under `id`. Returns whether one existed.
    pub async fn delete(&self, id: &str) -> OutputStoreResult<bool> {
        self.client
            .delete(id)
            .await
            .map_err(|e| DocStoreAccessError::delete(id, e))
    }

    pub async fn write(&self, id: &str, output: &ConnectorJobOutput) -> OutputStoreResult<()> {
        self.write_output(id, output).await
    }

    pub async fn read(&self, id: &str) -> OutputStoreResult<Option<ConnectorJobOutput>> {
        self.read_output(id).await
    }

    pub async fn write_sync_output(
        &self,
        id: &str,
        output: &ReplicationOutput,
    ) -> OutputStoreResult<()> {
        self.write_output(id, output).await
    }

    pub async fn read_sync_output(&self, id: &str) -> OutputStoreResult<Option<ReplicationOutput>> {
        self.read_output(id).await
    }
}
