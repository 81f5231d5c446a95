//! Fixed-capacity pool for bounded-concurrency async work.
//!
//! A counting semaphore guards every future submitted through the pool, so at
//! most `capacity` of them make progress at once. Futures are not spawned;
//! they are polled by whoever awaits the pool, which keeps borrowed inputs
//! usable without `'static` bounds.

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Maximum concurrent sub-directory scans when collecting declaration files.
pub const MAX_CONCURRENT_DIR_SCANS: usize = 8;

/// Maximum concurrent file operations (rewrites, stub writes).
pub const MAX_CONCURRENT_FILE_OPS: usize = 10;

/// A cloneable handle to a shared counting semaphore.
#[derive(Debug, Clone)]
pub struct TaskPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl TaskPool {
    /// Create a pool allowing `capacity` concurrent tasks (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Run a single future inside one pool slot.
    ///
    /// The slot is released as soon as the future completes, so callers may
    /// submit follow-up work to the same pool without deadlocking.
    pub async fn run<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is never closed, so acquire cannot fail; a closed
        // semaphore would only mean running unbounded.
        let _permit = self.semaphore.acquire().await.ok();
        fut.await
    }

    /// Run every future, at most `capacity` at a time, and wait for all of them.
    ///
    /// Results come back in submission order. There is no fail-fast: every
    /// future runs to completion regardless of its siblings' outcomes.
    pub async fn run_all<I, F, T>(&self, futs: I) -> Vec<T>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = T>,
    {
        join_all(futs.into_iter().map(|fut| self.run(fut))).await
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new(MAX_CONCURRENT_FILE_OPS)
    }
}
