use super::{Metadata, Tree};
use crate::repo::RepoId;
use core::fmt::Debug;
use futures_util::future::BoxFuture;
use std::path::Path;

/// Remote hosting API.
///
/// Every method reports failure as `None` (or `false`); the caller decides whether
/// to retry, fall back to a clone, or give up. Implementations record the rate-limit
/// headers of every response they receive.
pub trait RemoteSource: Send + Sync + Debug {
    /// The complete file and directory listing of the default branch.
    fn fetch_structure<'a>(&'a self, id: &'a RepoId) -> BoxFuture<'a, Option<Tree>>;

    /// The contents of one file, decoded as text.
    fn fetch_file<'a>(&'a self, id: &'a RepoId, path: &'a str) -> BoxFuture<'a, Option<String>>;

    fn fetch_metadata<'a>(&'a self, id: &'a RepoId) -> BoxFuture<'a, Option<Metadata>>;

    /// Names of the public repositories of `owner`.
    fn fetch_owner_repos<'a>(&'a self, owner: &'a str) -> BoxFuture<'a, Option<Vec<String>>>;

    /// Clone the repository into `target`. Succeeds immediately when `target` already
    /// holds a clone.
    fn clone_repo<'a>(&'a self, id: &'a RepoId, target: &'a Path) -> BoxFuture<'a, bool>;
}
