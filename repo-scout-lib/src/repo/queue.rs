use super::{Discovery, RepoId};
use crate::access::Clock;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

const LOG_TARGET: &str = "     queue";

/// How the queue refills itself and how long a consumer waits for work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    /// Refill when fewer than this many repositories are pending.
    pub low_water: usize,

    /// Repositories requested from discovery per refill.
    pub refill_batch: usize,

    /// Extra attempts [`RepositoryQueue::get_next`] makes on an empty queue.
    pub max_polls: u32,

    pub poll_interval: Duration,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            low_water: 2,
            refill_batch: 3,
            max_polls: 10,
            poll_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Default)]
struct Entries {
    pending: VecDeque<RepoId>,
    known: HashSet<RepoId>,
    started: Vec<RepoId>,
}

/// Thread-safe FIFO of repositories awaiting evaluation.
///
/// A repository is handed out at most once per run: ids that are pending or have
/// been handed out already are rejected by [`RepositoryQueue::try_add`].
#[derive(Debug)]
pub struct RepositoryQueue {
    entries: Mutex<Entries>,
    discovery: Option<Arc<dyn Discovery>>,
    refilling: tokio::sync::Mutex<()>,
    discovery_exhausted: AtomicBool,
    settings: QueueSettings,
    clock: Arc<dyn Clock>,
}

impl RepositoryQueue {
    #[must_use]
    pub fn new(settings: QueueSettings, clock: Arc<dyn Clock>, discovery: Option<Arc<dyn Discovery>>) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            discovery,
            refilling: tokio::sync::Mutex::new(()),
            discovery_exhausted: AtomicBool::new(false),
            settings,
            clock,
        }
    }

    /// Append `id` unless it is already pending or was handed out before.
    pub fn try_add(&self, id: RepoId) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if !entries.known.insert(id.clone()) {
            log::trace!(target: LOG_TARGET, "Ignoring duplicate repository '{id}'");
            return false;
        }

        entries.pending.push_back(id);
        true
    }

    /// Number of repositories waiting to be handed out.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Repositories waiting to be handed out, in hand-out order.
    #[must_use]
    pub fn pending(&self) -> Vec<RepoId> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).pending.iter().cloned().collect()
    }

    /// Repositories handed out so far, in hand-out order.
    #[must_use]
    pub fn started(&self) -> Vec<RepoId> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).started.clone()
    }

    fn pop(&self) -> Option<RepoId> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let id = entries.pending.pop_front()?;
        entries.started.push(id.clone());
        Some(id)
    }

    /// Hand out the next repository.
    ///
    /// Refills from discovery when the queue runs low, and polls a bounded number of
    /// times before giving up with `None`.
    pub async fn get_next(&self) -> Option<RepoId> {
        for poll in 0..=self.settings.max_polls {
            if self.len() < self.settings.low_water {
                self.refill().await;
            }

            if let Some(id) = self.pop() {
                return Some(id);
            }

            if poll < self.settings.max_polls {
                log::trace!(target: LOG_TARGET, "Queue is empty, polling again");
                self.clock.sleep(self.settings.poll_interval).await;
            }
        }

        log::debug!(target: LOG_TARGET, "No repository became available after {} polls", self.settings.max_polls);
        None
    }

    async fn refill(&self) {
        let Some(discovery) = &self.discovery else {
            return;
        };

        if self.discovery_exhausted.load(Ordering::Acquire) {
            return;
        }

        // one refill at a time; the others poll and pick up its results
        let Ok(_guard) = self.refilling.try_lock() else {
            return;
        };

        match discovery.discover_batch(self.settings.refill_batch).await {
            Ok(ids) if ids.is_empty() => {
                log::info!(target: LOG_TARGET, "No more repositories to discover");
                self.discovery_exhausted.store(true, Ordering::Release);
            }
            Ok(ids) => {
                let found = ids.len();
                let added = ids.into_iter().filter(|id| self.try_add(id.clone())).count();
                log::debug!(target: LOG_TARGET, "Discovered {found} repositories, {added} new");
            }
            Err(e) => log::warn!(target: LOG_TARGET, "Could not discover more repositories: {e:#}"),
        }
    }
}
