use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds how many repositories are evaluated at once.
///
/// Every evaluation acquires a slot with [`Throttler::acquire`] before it starts and
/// releases it by dropping the permit. A worker waiting for a rate budget keeps its
/// slot; the other slots are unaffected.
#[derive(Debug)]
pub struct Throttler {
    semaphore: Arc<Semaphore>,
    workers: usize,
}

impl Throttler {
    /// Create a throttler with `workers` slots. Zero is treated as one.
    #[must_use]
    pub fn new(workers: usize) -> Arc<Self> {
        let workers = workers.max(1);
        Arc::new(Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            workers,
        })
    }

    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("semaphore is never closed")
    }

    /// Slots not currently held by an evaluation.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
