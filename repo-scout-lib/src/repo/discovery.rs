use super::RepoId;
use crate::Result;
use crate::access::{GitHubClient, RateCategory, backoff};
use core::fmt::Debug;
use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;
use futures_util::future::BoxFuture;

const LOG_TARGET: &str = " discovery";

/// Source of repositories to evaluate.
pub trait Discovery: Send + Sync + Debug {
    /// Up to `count` more repositories. An empty list means there are no more.
    fn discover_batch(&self, count: usize) -> BoxFuture<'_, Result<Vec<RepoId>>>;
}

/// Discovers repositories by paging through a GitHub repository search.
#[derive(Debug)]
pub struct GitHubDiscovery {
    client: GitHubClient,
    query: String,
    next_page: AtomicU32,
    max_rate_limit_wait: Duration,
}

impl GitHubDiscovery {
    #[must_use]
    pub fn new(client: GitHubClient, query: impl Into<String>, max_rate_limit_wait: Duration) -> Self {
        Self {
            client,
            query: query.into(),
            next_page: AtomicU32::new(1),
            max_rate_limit_wait,
        }
    }
}

impl Discovery for GitHubDiscovery {
    fn discover_batch(&self, count: usize) -> BoxFuture<'_, Result<Vec<RepoId>>> {
        Box::pin(async move {
            let _ = backoff::wait_for_budget(
                self.client.budget(),
                RateCategory::Search,
                self.client.clock().as_ref(),
                self.max_rate_limit_wait,
            )
            .await;

            // a failed search leaves the page to be requested again
            let page = self.next_page.load(Ordering::Acquire);
            let ids = self.client.search_repositories(&self.query, count, page).await?;
            let _ = self.next_page.compare_exchange(page, page + 1, Ordering::AcqRel, Ordering::Acquire);

            log::debug!(target: LOG_TARGET, "Search page {page} returned {} repositories", ids.len());
            Ok(ids)
        })
    }
}
