use super::path_utils::sanitize_path_component;
use super::{AccessError, Clock, LocalSource, Metadata, RateBudgetTracker, RateCategory, RemoteSource, Throttler, Tree, backoff};
use crate::repo::RepoId;
use core::fmt::{Display, Formatter};
use core::time::Duration;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOG_TARGET: &str = "    source";

/// Clone attempts per repository before cloning is given up for good.
const MAX_CLONE_ATTEMPTS: u8 = 2;

/// Limits that decide when a repository is read from a clone instead of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessSettings {
    /// Largest structure, in entries, that is used as served by the API.
    pub clone_threshold: usize,

    /// Largest batch of files fetched one by one through the API.
    pub max_files_per_request: usize,

    /// Largest repository, in kilobytes, that may be cloned.
    pub max_clone_size_kb: u64,

    /// Longest a single request waits for an exhausted budget to reset.
    pub max_rate_limit_wait: Duration,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            clone_threshold: 2500,
            max_files_per_request: 35,
            max_clone_size_kb: 300_000,
            max_rate_limit_wait: Duration::from_secs(60 * 60),
        }
    }
}

/// Shared services every [`ResilientDataSource`] of a run uses.
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub remote: Arc<dyn RemoteSource>,
    pub budget: Arc<RateBudgetTracker>,
    pub clock: Arc<dyn Clock>,
    pub throttler: Arc<Throttler>,
    pub settings: AccessSettings,
    pub clone_root: Arc<Path>,
}

impl AccessContext {
    /// Where the clone of `id` lives.
    #[must_use]
    pub fn clone_path(&self, id: &RepoId) -> PathBuf {
        self.clone_root
            .join(sanitize_path_component(id.owner()))
            .join(sanitize_path_component(id.name()))
    }
}

#[derive(Debug, Clone)]
enum Backend {
    Remote,
    Local(LocalSource),
}

#[derive(Debug, Clone, Copy)]
enum SwitchTrigger {
    LowBudget(RateCategory),
    MissingStructure,
    LargeStructure(usize),
    LargeBatch(usize),
}

impl Display for SwitchTrigger {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LowBudget(category) => write!(f, "the {category} rate budget is running low"),
            Self::MissingStructure => write!(f, "the API did not provide its structure"),
            Self::LargeStructure(entries) => write!(f, "its structure has {entries} entries"),
            Self::LargeBatch(files) => write!(f, "{files} files were requested at once"),
        }
    }
}

/// Data access for one repository.
///
/// Starts on the remote API and switches to a local clone at most once, when the
/// API budget gets low, the structure is too large or missing, or a batch of files
/// is too big. Once cloning is prohibited, no further clone is attempted.
#[derive(Debug)]
pub struct ResilientDataSource {
    id: RepoId,
    ctx: AccessContext,
    backend: Backend,
    clone_prohibited: bool,
    failed_clones: u8,
    metadata: Option<Metadata>,
}

impl ResilientDataSource {
    #[must_use]
    pub const fn new(id: RepoId, ctx: AccessContext) -> Self {
        Self {
            id,
            ctx,
            backend: Backend::Remote,
            clone_prohibited: false,
            failed_clones: 0,
            metadata: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &RepoId {
        &self.id
    }

    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self.backend, Backend::Local(_))
    }

    #[must_use]
    pub const fn is_clone_prohibited(&self) -> bool {
        self.clone_prohibited
    }

    /// The clone directory this source has populated, if it switched to local access.
    #[must_use]
    pub fn owned_clone(&self) -> Option<PathBuf> {
        match &self.backend {
            Backend::Local(local) => Some(local.root().to_path_buf()),
            Backend::Remote => None,
        }
    }

    /// The complete listing of the repository.
    pub async fn structure(&mut self) -> Result<Tree, AccessError> {
        if let Backend::Local(local) = &self.backend {
            return Ok(local.read_structure().await);
        }

        self.prepare_remote(RateCategory::Core).await;
        if let Backend::Local(local) = &self.backend {
            return Ok(local.read_structure().await);
        }

        let trigger = match self.ctx.remote.fetch_structure(&self.id).await {
            Some(tree) if tree.len() <= self.ctx.settings.clone_threshold => return Ok(tree),
            Some(tree) => SwitchTrigger::LargeStructure(tree.len()),
            None => SwitchTrigger::MissingStructure,
        };

        let local = self.switch_to_local(trigger).await?;
        Ok(local.read_structure().await)
    }

    /// The contents of the given files, keyed by path.
    ///
    /// Files the API does not have are left out; files missing from a clone map to an
    /// empty string. A file refused because the budget ran out is fetched again once
    /// the budget resets, and fails the whole batch if it is refused a second time.
    pub async fn files(&mut self, paths: Vec<String>) -> Result<HashMap<String, String>, AccessError> {
        if paths.is_empty() {
            return Ok(HashMap::new());
        }

        if !self.is_local() && paths.len() > self.ctx.settings.max_files_per_request {
            let _ = self.switch_to_local(SwitchTrigger::LargeBatch(paths.len())).await?;
        }

        if !self.is_local() {
            self.prepare_remote(RateCategory::Core).await;
        }

        if let Backend::Local(local) = &self.backend {
            return Ok(local.read_files(paths).await);
        }

        let mut contents = HashMap::with_capacity(paths.len());
        for path in paths {
            self.wait_if_exhausted(RateCategory::Core).await;
            if let Some(content) = self.fetch_remote_file(&path).await? {
                let _ = contents.insert(path, content);
            }
        }

        Ok(contents)
    }

    /// Fetch one file through the API, `None` when the repository does not have it.
    async fn fetch_remote_file(&self, path: &str) -> Result<Option<String>, AccessError> {
        if let Some(content) = self.ctx.remote.fetch_file(&self.id, path).await {
            return Ok(Some(content));
        }

        if !self.ctx.budget.is_exhausted(RateCategory::Core, self.ctx.clock.now()) {
            return Ok(None);
        }

        log::debug!(target: LOG_TARGET, "Fetching '{path}' of '{}' again once the rate budget resets", self.id);
        self.wait_if_exhausted(RateCategory::Core).await;

        match self.ctx.remote.fetch_file(&self.id, path).await {
            Some(content) => Ok(Some(content)),
            None if self.ctx.budget.is_exhausted(RateCategory::Core, self.ctx.clock.now()) => Err(AccessError::transient(format!(
                "the rate budget ran out while fetching '{path}' of '{}'",
                self.id
            ))),
            None => Ok(None),
        }
    }

    /// Repository metadata, always served by the remote API and fetched at most once.
    pub async fn metadata(&mut self) -> Result<Metadata, AccessError> {
        if let Some(metadata) = &self.metadata {
            return Ok(metadata.clone());
        }

        self.wait_if_exhausted(RateCategory::Core).await;
        match self.ctx.remote.fetch_metadata(&self.id).await {
            Some(metadata) => {
                self.metadata = Some(metadata.clone());
                Ok(metadata)
            }
            None => Err(AccessError::transient(format!("could not fetch metadata of '{}'", self.id))),
        }
    }

    /// Names of all repositories of this repository's owner, always served by the
    /// remote API.
    pub async fn owner_repos(&mut self) -> Result<Vec<String>, AccessError> {
        self.wait_if_exhausted(RateCategory::Core).await;
        self.ctx
            .remote
            .fetch_owner_repos(self.id.owner())
            .await
            .ok_or_else(|| AccessError::transient(format!("could not list the repositories of '{}'", self.id.owner())))
    }

    /// Get ready for a remote call of `category`: wait out an exhausted budget, and
    /// move to a clone while the budget stays below the comfort threshold.
    async fn prepare_remote(&mut self, category: RateCategory) {
        if self.ctx.budget.is_comfortable(category, self.ctx.clock.now()) {
            return;
        }

        self.wait_if_exhausted(category).await;

        if !self.ctx.budget.is_comfortable(category, self.ctx.clock.now()) {
            if let Err(e) = self.switch_to_local(SwitchTrigger::LowBudget(category)).await {
                log::debug!(target: LOG_TARGET, "Staying on the API for '{}': {e}", self.id);
            }
        }
    }

    /// Block this repository's worker, and only it, until `category` has budget again.
    async fn wait_if_exhausted(&self, category: RateCategory) {
        if !self.ctx.budget.is_exhausted(category, self.ctx.clock.now()) {
            return;
        }

        log::warn!(target: LOG_TARGET, "The {category} rate budget is exhausted, '{}' waits for it to reset", self.id);
        let _ = backoff::wait_for_budget(&self.ctx.budget, category, self.ctx.clock.as_ref(), self.ctx.settings.max_rate_limit_wait).await;
    }

    async fn switch_to_local(&mut self, trigger: SwitchTrigger) -> Result<LocalSource, AccessError> {
        if let Backend::Local(local) = &self.backend {
            return Ok(local.clone());
        }

        if self.clone_prohibited {
            return Err(AccessError::CloneProhibited);
        }

        log::info!(target: LOG_TARGET, "Trying to clone '{}' because {trigger}", self.id);

        // a failed lookup is transient, only a missing size prohibits cloning
        let size_kb = self.metadata().await?.size_kb;
        match size_kb {
            Some(size) if size <= self.ctx.settings.max_clone_size_kb => {}
            Some(size) => {
                log::info!(target: LOG_TARGET, "Not cloning '{}': {size} KB exceeds the {} KB limit", self.id, self.ctx.settings.max_clone_size_kb);
                self.clone_prohibited = true;
                return Err(AccessError::CloneProhibited);
            }
            None => {
                log::info!(target: LOG_TARGET, "Not cloning '{}': its size is unknown", self.id);
                self.clone_prohibited = true;
                return Err(AccessError::CloneProhibited);
            }
        }

        let target = self.ctx.clone_path(&self.id);
        if self.ctx.remote.clone_repo(&self.id, &target).await {
            log::info!(target: LOG_TARGET, "Reading '{}' from its clone at '{}'", self.id, target.display());
            let local = LocalSource::new(&target);
            self.backend = Backend::Local(local.clone());
            return Ok(local);
        }

        self.failed_clones += 1;
        if self.failed_clones >= MAX_CLONE_ATTEMPTS {
            log::warn!(target: LOG_TARGET, "Giving up on cloning '{}' after {} attempts", self.id, self.failed_clones);
            self.clone_prohibited = true;
        }

        Err(AccessError::transient(format!("could not clone '{}'", self.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::TreeEntry;
    use crate::testing::{FakeRemote, ManualClock, test_context};
    use chrono::TimeDelta;

    fn tree_of(files: usize) -> Tree {
        (0..files).map(|i| TreeEntry::file(format!("src/file{i}.txt"))).collect()
    }

    fn small_repo_metadata() -> Metadata {
        Metadata {
            size_kb: Some(100),
            stargazers: 10,
            ..Metadata::default()
        }
    }

    #[tokio::test]
    async fn test_small_structure_stays_remote() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default().with_structure(tree_of(3)));
        let ctx = test_context(Arc::clone(&remote), dir.path());

        let mut source = ResilientDataSource::new(RepoId::new("octo", "small"), ctx);
        let tree = source.structure().await.unwrap();

        assert_eq!(tree.len(), 3);
        assert!(!source.is_local());
        assert_eq!(remote.clone_calls(), 0);
    }

    #[tokio::test]
    async fn test_structure_at_threshold_stays_remote() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default().with_structure(tree_of(5)));
        let mut ctx = test_context(Arc::clone(&remote), dir.path());
        ctx.settings.clone_threshold = 5;

        let mut source = ResilientDataSource::new(RepoId::new("octo", "edge"), ctx);
        assert_eq!(source.structure().await.unwrap().len(), 5);
        assert!(!source.is_local());
    }

    #[tokio::test]
    async fn test_large_structure_switches_to_clone() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(
            FakeRemote::default()
                .with_structure(tree_of(6))
                .with_metadata(small_repo_metadata())
                .with_clone_content(&[("README.md", "hi"), ("docs/guide.md", "guide")]),
        );
        let mut ctx = test_context(Arc::clone(&remote), dir.path());
        ctx.settings.clone_threshold = 5;

        let mut source = ResilientDataSource::new(RepoId::new("octo", "big"), ctx);
        let tree = source.structure().await.unwrap();

        assert!(source.is_local());
        assert_eq!(remote.clone_calls(), 1);
        assert_eq!(tree.files().count(), 2);
        assert_eq!(source.owned_clone().unwrap(), dir.path().join("octo").join("big"));
    }

    #[tokio::test]
    async fn test_large_structure_of_oversized_repo_is_prohibited() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default().with_structure(tree_of(6)).with_metadata(Metadata {
            size_kb: Some(300_001),
            ..Metadata::default()
        }));
        let mut ctx = test_context(Arc::clone(&remote), dir.path());
        ctx.settings.clone_threshold = 5;

        let mut source = ResilientDataSource::new(RepoId::new("octo", "huge"), ctx);

        assert_eq!(source.structure().await.unwrap_err(), AccessError::CloneProhibited);
        assert!(source.is_clone_prohibited());
        assert_eq!(remote.clone_calls(), 0);

        // no further clone attempts once prohibited
        assert_eq!(source.structure().await.unwrap_err(), AccessError::CloneProhibited);
        assert_eq!(remote.metadata_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_size_is_prohibited() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default().with_metadata(Metadata::default()));
        let ctx = test_context(Arc::clone(&remote), dir.path());

        let mut source = ResilientDataSource::new(RepoId::new("octo", "unknown"), ctx);

        // missing structure triggers a clone, which needs a known size
        assert_eq!(source.structure().await.unwrap_err(), AccessError::CloneProhibited);
        assert_eq!(remote.clone_calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_clone_is_transient_then_prohibited() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default().with_metadata(small_repo_metadata()).failing_clone());
        let ctx = test_context(Arc::clone(&remote), dir.path());

        let mut source = ResilientDataSource::new(RepoId::new("octo", "flaky"), ctx);

        assert!(source.structure().await.unwrap_err().is_transient());
        assert!(!source.is_local());
        assert!(!source.is_clone_prohibited());

        assert!(source.structure().await.unwrap_err().is_transient());
        assert!(source.is_clone_prohibited());
        assert_eq!(remote.clone_calls(), 2);

        assert_eq!(source.structure().await.unwrap_err(), AccessError::CloneProhibited);
        assert_eq!(remote.clone_calls(), 2);
    }

    #[tokio::test]
    async fn test_small_batch_is_fetched_remotely() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default().with_file("README.md", "hello").with_file("LICENSE", "MIT"));
        let ctx = test_context(Arc::clone(&remote), dir.path());

        let mut source = ResilientDataSource::new(RepoId::new("octo", "files"), ctx);
        let files = source
            .files(vec!["README.md".to_string(), "LICENSE".to_string(), "missing".to_string()])
            .await
            .unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files["README.md"], "hello");
        assert_eq!(remote.file_calls(), 3);
        assert!(!source.is_local());
    }

    #[tokio::test]
    async fn test_large_batch_switches_to_clone() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(
            FakeRemote::default()
                .with_metadata(small_repo_metadata())
                .with_clone_content(&[("a.txt", "A"), ("b.txt", "B"), ("c.txt", "C")]),
        );
        let mut ctx = test_context(Arc::clone(&remote), dir.path());
        ctx.settings.max_files_per_request = 2;

        let mut source = ResilientDataSource::new(RepoId::new("octo", "batch"), ctx);
        let files = source
            .files(vec!["a.txt".to_string(), "b.txt".to_string(), "c.txt".to_string()])
            .await
            .unwrap();

        assert!(source.is_local());
        assert_eq!(files["c.txt"], "C");
        assert_eq!(remote.file_calls(), 0);
    }

    #[tokio::test]
    async fn test_low_budget_switches_preemptively() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::default());
        let remote = Arc::new(
            FakeRemote::default()
                .with_structure(tree_of(2))
                .with_metadata(small_repo_metadata())
                .with_clone_content(&[("README.md", "local")]),
        );
        let mut ctx = test_context(Arc::clone(&remote), dir.path());
        ctx.clock = Arc::clone(&clock) as Arc<dyn Clock>;
        ctx.budget.record(RateCategory::Core, 5000, 1000, clock.now() + TimeDelta::minutes(30));

        let mut source = ResilientDataSource::new(RepoId::new("octo", "budget"), ctx);
        let tree = source.structure().await.unwrap();

        assert!(source.is_local());
        assert_eq!(tree.len(), 1);
        assert_eq!(remote.structure_calls(), 0);
        assert!(clock.sleeps().is_empty());

        // a refilled budget does not bring the remote back
        source.ctx.budget.record(RateCategory::Core, 5000, 5000, clock.now() + TimeDelta::minutes(60));
        let _ = source.structure().await.unwrap();
        assert!(source.is_local());
        assert_eq!(remote.structure_calls(), 0);
    }

    #[tokio::test]
    async fn test_low_budget_without_clone_keeps_using_remote() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::default());
        let remote = Arc::new(FakeRemote::default().with_structure(tree_of(2)).with_metadata(Metadata {
            size_kb: Some(u64::MAX),
            ..Metadata::default()
        }));
        let mut ctx = test_context(Arc::clone(&remote), dir.path());
        ctx.clock = Arc::clone(&clock) as Arc<dyn Clock>;
        ctx.budget.record(RateCategory::Core, 5000, 10, clock.now() + TimeDelta::minutes(30));

        let mut source = ResilientDataSource::new(RepoId::new("octo", "stuck"), ctx);
        let tree = source.structure().await.unwrap();

        assert!(!source.is_local());
        assert!(source.is_clone_prohibited());
        assert_eq!(tree.len(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_budget_waits_for_reset() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::default());
        let remote = Arc::new(FakeRemote::default().with_file("README.md", "hello"));
        let mut ctx = test_context(Arc::clone(&remote), dir.path());
        ctx.clock = Arc::clone(&clock) as Arc<dyn Clock>;
        ctx.budget.record(RateCategory::Core, 5000, 0, clock.now() + TimeDelta::seconds(120));
        let throttler = Arc::clone(&ctx.throttler);

        let mut source = ResilientDataSource::new(RepoId::new("octo", "waiting"), ctx);
        let files = source.files(vec!["README.md".to_string()]).await.unwrap();

        assert_eq!(files["README.md"], "hello");
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(120)]);
        assert!(!source.is_local());

        // other workers keep their slots while this one waits
        assert_eq!(throttler.available(), throttler.workers());
    }

    #[tokio::test]
    async fn test_file_refused_by_exhausted_budget_is_fetched_again() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::default());
        let mut ctx = test_context(Arc::new(FakeRemote::default()), dir.path());
        let remote = Arc::new(
            FakeRemote::default()
                .with_file("a.md", "content of a.md")
                .with_file("b.md", "content of b.md")
                .exhausting_budget_on_first_file(Arc::clone(&ctx.budget), clock.now() + TimeDelta::seconds(30)),
        );
        ctx.remote = Arc::clone(&remote) as Arc<dyn RemoteSource>;
        ctx.clock = Arc::clone(&clock) as Arc<dyn Clock>;

        let mut source = ResilientDataSource::new(RepoId::new("octo", "quota"), ctx);
        let files = source.files(vec!["a.md".to_string(), "b.md".to_string()]).await.unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files["a.md"], "content of a.md");
        assert_eq!(files["b.md"], "content of b.md");
        assert_eq!(remote.file_calls(), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(30)]);
    }

    #[tokio::test]
    async fn test_file_refused_twice_fails_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::default());
        let remote = Arc::new(FakeRemote::default());
        let mut ctx = test_context(Arc::clone(&remote), dir.path());
        ctx.clock = Arc::clone(&clock) as Arc<dyn Clock>;
        ctx.settings.max_rate_limit_wait = Duration::from_secs(10);
        // a reset far in the future outlasts the longest wait
        ctx.budget.record(RateCategory::Core, 5000, 0, clock.now() + TimeDelta::hours(2));

        let mut source = ResilientDataSource::new(RepoId::new("octo", "starved"), ctx);
        let err = source.files(vec!["a.md".to_string()]).await.unwrap_err();

        assert!(err.is_transient());
        assert_eq!(remote.file_calls(), 2);
    }

    #[tokio::test]
    async fn test_metadata_is_fetched_once() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default().with_metadata(small_repo_metadata()));
        let ctx = test_context(Arc::clone(&remote), dir.path());

        let mut source = ResilientDataSource::new(RepoId::new("octo", "meta"), ctx);
        assert_eq!(source.metadata().await.unwrap().stargazers, 10);
        assert_eq!(source.metadata().await.unwrap().stargazers, 10);
        assert_eq!(remote.metadata_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_metadata_lookup_does_not_prohibit_cloning() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default().with_structure(tree_of(6)));
        let mut ctx = test_context(Arc::clone(&remote), dir.path());
        ctx.settings.clone_threshold = 5;

        let mut source = ResilientDataSource::new(RepoId::new("octo", "unlucky"), ctx);

        assert!(source.structure().await.unwrap_err().is_transient());
        assert!(!source.is_clone_prohibited());
        assert_eq!(remote.clone_calls(), 0);
    }

    #[tokio::test]
    async fn test_owner_repos_come_from_the_api_after_cloning() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(
            FakeRemote::default()
                .with_metadata(small_repo_metadata())
                .with_clone_content(&[("README.md", "hi")])
                .with_owner_repos(&["tool", "tool-docs"]),
        );
        let ctx = test_context(Arc::clone(&remote), dir.path());

        let mut source = ResilientDataSource::new(RepoId::new("octo", "tool"), ctx);
        let _ = source.structure().await.unwrap();
        assert!(source.is_local());

        assert_eq!(source.owner_repos().await.unwrap(), vec!["tool", "tool-docs"]);
        assert_eq!(remote.owner_repos_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_owner_listing_is_transient() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(Arc::new(FakeRemote::default()), dir.path());

        let mut source = ResilientDataSource::new(RepoId::new("octo", "lonely"), ctx);
        assert!(source.owner_repos().await.unwrap_err().is_transient());
    }

    #[tokio::test]
    async fn test_missing_metadata_is_transient() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let ctx = test_context(remote, dir.path());

        let mut source = ResilientDataSource::new(RepoId::new("octo", "ghost"), ctx);
        assert!(source.metadata().await.unwrap_err().is_transient());
    }
}
