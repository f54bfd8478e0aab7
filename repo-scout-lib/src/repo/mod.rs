//! Repositories under evaluation
//!
//! A [`Repository`] collects the [`Outcome`] of every rule applied to it and owns a
//! [`RepositoryCache`] through which rules read its data. Repositories to evaluate
//! come from the [`RepositoryQueue`], which refills itself from a [`Discovery`].

mod cache;
mod discovery;
mod outcome;
mod queue;
mod repo_id;
mod repository;

pub use cache::RepositoryCache;
pub use discovery::{Discovery, GitHubDiscovery};
pub use outcome::{Outcome, total_score};
pub use queue::{QueueSettings, RepositoryQueue};
pub use repo_id::RepoId;
pub use repository::Repository;
