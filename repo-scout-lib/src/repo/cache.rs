use super::RepoId;
use crate::access::{AccessContext, AccessError, Metadata, ResilientDataSource, Tree};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOG_TARGET: &str = "     cache";

/// Memoized view of one repository's data, shared by all rules applied to it.
///
/// Each piece of data is fetched at most once. A transient failure is retried once
/// before it is reported.
#[derive(Debug)]
pub struct RepositoryCache {
    id: RepoId,
    source: Option<ResilientDataSource>,
    structure: Option<Arc<Tree>>,
    files: HashMap<String, String>,
    metadata: Option<Metadata>,
    owner_repos: Option<Arc<[String]>>,
}

impl RepositoryCache {
    #[must_use]
    pub fn new(id: RepoId, ctx: AccessContext) -> Self {
        Self {
            source: Some(ResilientDataSource::new(id.clone(), ctx)),
            id,
            structure: None,
            files: HashMap::new(),
            metadata: None,
            owner_repos: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &RepoId {
        &self.id
    }

    /// Whether data is being read from a local clone.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.source.as_ref().is_some_and(ResilientDataSource::is_local)
    }

    fn source(&mut self) -> Result<&mut ResilientDataSource, AccessError> {
        self.source.as_mut().ok_or(AccessError::Finished)
    }

    pub async fn structure(&mut self) -> Result<Arc<Tree>, AccessError> {
        if let Some(tree) = &self.structure {
            return Ok(Arc::clone(tree));
        }

        let id = self.id.clone();
        let source = self.source()?;
        let tree = match source.structure().await {
            Err(AccessError::Transient(reason)) => {
                log::debug!(target: LOG_TARGET, "Retrying structure of '{id}' after: {reason}");
                source.structure().await?
            }
            other => other?,
        };

        let tree = Arc::new(tree);
        self.structure = Some(Arc::clone(&tree));
        Ok(tree)
    }

    /// Contents of the requested files, keyed by path.
    ///
    /// Only files not cached yet are fetched. Files the source cannot provide are
    /// absent from the result.
    pub async fn files<I, S>(&mut self, paths: I) -> Result<HashMap<String, String>, AccessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requested: BTreeSet<String> = paths.into_iter().map(Into::into).collect();
        let missing: Vec<String> = requested.iter().filter(|p| !self.files.contains_key(*p)).cloned().collect();

        if !missing.is_empty() {
            let id = self.id.clone();
            let source = self.source()?;
            let fetched = match source.files(missing.clone()).await {
                Err(AccessError::Transient(reason)) => {
                    log::debug!(target: LOG_TARGET, "Retrying {} files of '{id}' after: {reason}", missing.len());
                    source.files(missing).await?
                }
                other => other?,
            };
            self.files.extend(fetched);
        }

        Ok(requested
            .into_iter()
            .filter_map(|path| {
                let content = self.files.get(&path)?.clone();
                Some((path, content))
            })
            .collect())
    }

    pub async fn metadata(&mut self) -> Result<Metadata, AccessError> {
        if let Some(metadata) = &self.metadata {
            return Ok(metadata.clone());
        }

        let id = self.id.clone();
        let source = self.source()?;
        let metadata = match source.metadata().await {
            Err(AccessError::Transient(reason)) => {
                log::debug!(target: LOG_TARGET, "Retrying metadata of '{id}' after: {reason}");
                source.metadata().await?
            }
            other => other?,
        };

        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    /// Names of all repositories of the same owner, this one included.
    pub async fn owner_repos(&mut self) -> Result<Arc<[String]>, AccessError> {
        if let Some(names) = &self.owner_repos {
            return Ok(Arc::clone(names));
        }

        let id = self.id.clone();
        let source = self.source()?;
        let names = match source.owner_repos().await {
            Err(AccessError::Transient(reason)) => {
                log::debug!(target: LOG_TARGET, "Retrying repositories of '{}' after: {reason}", id.owner());
                source.owner_repos().await?
            }
            other => other?,
        };

        let names: Arc<[String]> = names.into();
        self.owner_repos = Some(Arc::clone(&names));
        Ok(names)
    }

    /// Release all data and delete the clone, if one was made. Further requests fail
    /// with [`AccessError::Finished`].
    pub async fn finish(&mut self) {
        self.structure = None;
        self.files.clear();
        self.metadata = None;
        self.owner_repos = None;

        if let Some(clone) = self.source.take().and_then(|source| source.owned_clone()) {
            remove_clone(clone).await;
        }
    }
}

async fn remove_clone(path: PathBuf) {
    let result = tokio::task::spawn_blocking(move || remove_clone_blocking(&path)).await;
    if let Err(e) = result {
        log::warn!(target: LOG_TARGET, "Clone removal task failed: {e}");
    }
}

fn remove_clone_blocking(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => log::debug!(target: LOG_TARGET, "Deleted clone '{}'", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!(target: LOG_TARGET, "Could not delete clone '{}', it will be removed at the end of the run: {e}", path.display()),
    }
}
