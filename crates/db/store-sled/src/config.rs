use conduit_db_types::{DbError, DbResult};
use tracing::*;

const DEFAULT_RETRY_COUNT: u16 = 3;

/// Database operations configuration.
#[derive(Debug, Clone)]
pub struct SledDbConfig {
    /// Attempts made for a compare-and-swap before giving up.
    pub retry_count: u16,
    /// Flush to disk before a document write returns.
    pub flush_on_write: bool,
}

impl SledDbConfig {
    pub fn new(retry_count: u16, flush_on_write: bool) -> Self {
        Self {
            retry_count,
            flush_on_write,
        }
    }

    pub fn production() -> Self {
        Self::new(DEFAULT_RETRY_COUNT, true)
    }

    /// No forced flushes.
    pub fn test() -> Self {
        Self::new(DEFAULT_RETRY_COUNT, false)
    }

    /// Runs `attempt` until it returns `Some`, retrying immediately on
    /// conflicts. Callers run on async worker threads, so this never sleeps.
    ///
    /// `attempt` returns `Ok(None)` when it lost a compare-and-swap race.
    pub fn with_retry<R, F>(&self, mut attempt: F) -> DbResult<R>
    where
        F: FnMut() -> DbResult<Option<R>>,
    {
        let attempts = self.retry_count.max(1);
        for n in 1..=attempts {
            if let Some(res) = attempt()? {
                return Ok(res);
            }
            debug!(attempt = n, "sled compare-and-swap conflict");
        }
        Err(DbError::TooManyConflicts(attempts))
    }
}
