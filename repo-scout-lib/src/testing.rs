//! Test doubles for the remote API, discovery and time.

use crate::Result;
use crate::access::{AccessContext, AccessSettings, Clock, Metadata, RateBudgetTracker, RateCategory, RemoteSource, Throttler, Tree};
use crate::repo::{Discovery, RepoId};
use chrono::{DateTime, TimeDelta, Utc};
use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use futures_util::future::BoxFuture;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Clock that only moves when someone sleeps on it or calls [`ManualClock::advance`].
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let delta = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.checked_add_signed(delta).unwrap_or(*now);
    }

    /// Every duration slept so far, in order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.sleeps.lock().unwrap_or_else(PoisonError::into_inner).push(duration);
        self.advance(duration);
        Box::pin(tokio::task::yield_now())
    }
}

/// In-memory [`RemoteSource`] that counts its calls.
///
/// A clone writes the configured clone content below the target directory.
#[derive(Debug, Default)]
pub struct FakeRemote {
    structure: Option<Tree>,
    files: HashMap<String, String>,
    metadata: Option<Metadata>,
    owner_repos: Option<Vec<String>>,
    clone_content: Vec<(String, String)>,
    clone_fails: bool,
    exhaust_on_first_file: Option<(Arc<RateBudgetTracker>, DateTime<Utc>)>,
    structure_calls: AtomicUsize,
    file_calls: AtomicUsize,
    metadata_calls: AtomicUsize,
    owner_repos_calls: AtomicUsize,
    clone_calls: AtomicUsize,
}

impl FakeRemote {
    #[must_use]
    pub fn with_structure(mut self, tree: Tree) -> Self {
        self.structure = Some(tree);
        self
    }

    #[must_use]
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        let _ = self.files.insert(path.to_string(), content.to_string());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    #[must_use]
    pub fn with_owner_repos(mut self, names: &[&str]) -> Self {
        self.owner_repos = Some(names.iter().map(|n| (*n).to_string()).collect());
        self
    }

    #[must_use]
    pub fn with_clone_content(mut self, files: &[(&str, &str)]) -> Self {
        self.clone_content = files.iter().map(|(p, c)| ((*p).to_string(), (*c).to_string())).collect();
        self
    }

    #[must_use]
    pub const fn failing_clone(mut self) -> Self {
        self.clone_fails = true;
        self
    }

    /// Behave like an API whose core quota runs out with the first file request: that
    /// request records an empty budget resetting at `reset_at` and is refused.
    #[must_use]
    pub fn exhausting_budget_on_first_file(mut self, budget: Arc<RateBudgetTracker>, reset_at: DateTime<Utc>) -> Self {
        self.exhaust_on_first_file = Some((budget, reset_at));
        self
    }

    pub fn structure_calls(&self) -> usize {
        self.structure_calls.load(Ordering::SeqCst)
    }

    pub fn file_calls(&self) -> usize {
        self.file_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn owner_repos_calls(&self) -> usize {
        self.owner_repos_calls.load(Ordering::SeqCst)
    }

    pub fn clone_calls(&self) -> usize {
        self.clone_calls.load(Ordering::SeqCst)
    }

    fn write_clone(&self, target: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(target)?;
        for (path, content) in &self.clone_content {
            let file = target.join(path);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(file, content)?;
        }
        Ok(())
    }
}

impl RemoteSource for FakeRemote {
    fn fetch_structure<'a>(&'a self, _id: &'a RepoId) -> BoxFuture<'a, Option<Tree>> {
        let _ = self.structure_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { self.structure.clone() })
    }

    fn fetch_file<'a>(&'a self, _id: &'a RepoId, path: &'a str) -> BoxFuture<'a, Option<String>> {
        let first = self.file_calls.fetch_add(1, Ordering::SeqCst) == 0;
        Box::pin(async move {
            if let Some((budget, reset_at)) = self.exhaust_on_first_file.as_ref().filter(|_| first) {
                budget.record(RateCategory::Core, 5000, 0, *reset_at);
                return None;
            }
            self.files.get(path).cloned()
        })
    }

    fn fetch_metadata<'a>(&'a self, _id: &'a RepoId) -> BoxFuture<'a, Option<Metadata>> {
        let _ = self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { self.metadata.clone() })
    }

    fn fetch_owner_repos<'a>(&'a self, _owner: &'a str) -> BoxFuture<'a, Option<Vec<String>>> {
        let _ = self.owner_repos_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { self.owner_repos.clone() })
    }

    fn clone_repo<'a>(&'a self, _id: &'a RepoId, target: &'a Path) -> BoxFuture<'a, bool> {
        let _ = self.clone_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { !self.clone_fails && self.write_clone(target).is_ok() })
    }
}

/// [`Discovery`] that serves prepared batches, then reports exhaustion.
#[derive(Debug, Default)]
pub struct FakeDiscovery {
    batches: Mutex<VecDeque<Vec<RepoId>>>,
    requested: Mutex<Vec<usize>>,
}

impl FakeDiscovery {
    #[must_use]
    pub fn new(batches: Vec<Vec<RepoId>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// The batch size of every request so far.
    pub fn requested(&self) -> Vec<usize> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Discovery for FakeDiscovery {
    fn discover_batch(&self, count: usize) -> BoxFuture<'_, Result<Vec<RepoId>>> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner).push(count);
        let batch = self.batches.lock().unwrap_or_else(PoisonError::into_inner).pop_front().unwrap_or_default();
        Box::pin(async move { Ok(batch) })
    }
}

/// An [`AccessContext`] over `remote` with default settings, a [`ManualClock`]
/// and clones below `clone_root`.
#[must_use]
pub fn test_context<R: RemoteSource + 'static>(remote: Arc<R>, clone_root: &Path) -> AccessContext {
    AccessContext {
        remote: remote as Arc<dyn RemoteSource>,
        budget: Arc::new(RateBudgetTracker::new(0.85)),
        clock: Arc::new(ManualClock::default()),
        throttler: Throttler::new(4),
        settings: AccessSettings::default(),
        clone_root: Arc::from(clone_root),
    }
}
