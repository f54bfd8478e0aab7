//! GitHub REST API client
//!
//! Fetches repository structure, file contents, metadata and search results, and
//! records the quota headers of every response in the shared [`RateBudgetTracker`].

use super::resilient_http::resilient_get;
use super::{Clock, EntryKind, Metadata, RateBudgetTracker, RateCategory, RemoteSource, Tree, TreeEntry, git};
use crate::Result;
use crate::repo::RepoId;
use chrono::{DateTime, TimeDelta, Utc};
use core::str::FromStr;
use futures_util::future::BoxFuture;
use ohno::{IntoAppError, app_err, bail};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use url::Url;

const LOG_TARGET: &str = "    github";

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_CLONE_URL: &str = "https://github.com";

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// Largest page the search endpoint serves.
const MAX_SEARCH_PAGE_SIZE: usize = 100;

/// Largest page of an owner's repository listing.
const OWNER_REPOS_PAGE_SIZE: usize = 100;

/// Owner listings are cut off after this many pages.
const MAX_OWNER_REPOS_PAGES: u32 = 10;

/// Wait assumed for a quota response that carries no reset information.
const DEFAULT_RETRY_AFTER_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<RawTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct RawTreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl RawTreeEntry {
    fn into_entry(self) -> Option<TreeEntry> {
        let kind = match self.kind.as_str() {
            "blob" => EntryKind::File,
            "tree" => EntryKind::Directory,
            // submodules
            _ => return None,
        };
        Some(TreeEntry { path: self.path, kind })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    name: String,
    owner: SearchOwner,
}

#[derive(Debug, Deserialize)]
struct SearchOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct OwnerRepo {
    name: String,
}

/// Quota information from response headers
#[derive(Debug, Clone, Copy)]
struct RateLimitInfo {
    category: RateCategory,
    limit: u32,
    remaining: u32,
    reset_at: DateTime<Utc>,
}

/// Result of an API call
enum ApiResult {
    Success(reqwest::Response),

    /// The quota of the given category is used up.
    RateLimited(RateCategory),

    NotFound,

    /// The request was understood but cannot be served, e.g. a search page past the result limit.
    Unprocessable,

    Failed(ohno::AppError),
}

/// Client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: Url,
    clone_url: String,
    budget: Arc<RateBudgetTracker>,
    clock: Arc<dyn Clock>,
}

impl GitHubClient {
    /// Create a client for the API at `api_url` that clones from `clone_url`.
    pub fn new(
        token: Option<&str>,
        api_url: &str,
        clone_url: &str,
        budget: Arc<RateBudgetTracker>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let api_url = Url::parse(api_url).into_app_err_with(|| format!("invalid API URL '{api_url}'"))?;
        if api_url.cannot_be_a_base() {
            bail!("invalid API URL '{api_url}'");
        }

        let mut client_builder = reqwest::Client::builder().user_agent("repo-scout");

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("Bearer {t}"))?;
            auth_val.set_sensitive(true);

            let mut headers = HeaderMap::new();
            let _ = headers.insert(AUTHORIZATION, auth_val);
            let _ = headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));

            client_builder = client_builder.default_headers(headers);
        }

        Ok(Self {
            client: client_builder.build()?,
            api_url,
            clone_url: clone_url.trim_end_matches('/').to_string(),
            budget,
            clock,
        })
    }

    #[must_use]
    pub const fn budget(&self) -> &Arc<RateBudgetTracker> {
        &self.budget
    }

    #[must_use]
    pub const fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            let _ = path.pop_if_empty().extend(segments);
        }
        url
    }

    fn repo_endpoint<'a>(&self, id: &'a RepoId, rest: impl IntoIterator<Item = &'a str>) -> Url {
        self.endpoint(["repos", id.owner(), id.name()].into_iter().chain(rest))
    }

    /// Make an API call, record its quota headers and classify the result
    async fn api_call(&self, url: &Url, accept: &str) -> ApiResult {
        let resp = match resilient_get(&self.client, url.as_str(), accept).await {
            Ok(r) => r,
            Err(e) => return ApiResult::Failed(e),
        };

        let rate_limit = extract_rate_limit_from_headers(resp.headers());
        if let Some(info) = rate_limit {
            self.budget.record(info.category, info.limit, info.remaining, info.reset_at);
        }

        let status = resp.status();
        if status.is_success() {
            return ApiResult::Success(resp);
        }

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let exhausted = rate_limit.is_some_and(|info| info.remaining == 0);
            let retry_after = parse_retry_after(resp.headers());

            // a 403 with quota left and no Retry-After is a permission problem
            if exhausted || retry_after.is_some() || status == StatusCode::TOO_MANY_REQUESTS {
                let category = rate_limit.map_or(RateCategory::Core, |info| info.category);
                if !exhausted {
                    let wait = retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                    let limit = rate_limit.map_or(0, |info| info.limit);
                    self.budget.record(category, limit, 0, self.clock.now() + TimeDelta::seconds(wait));
                }
                return ApiResult::RateLimited(category);
            }
        }

        match status {
            StatusCode::NOT_FOUND => ApiResult::NotFound,
            StatusCode::UNPROCESSABLE_ENTITY => ApiResult::Unprocessable,
            _ => ApiResult::Failed(app_err!("request to '{url}' failed with HTTP status {status}")),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Option<T> {
        match self.api_call(&url, JSON_MEDIA_TYPE).await {
            ApiResult::Success(resp) => match resp.json::<T>().await {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Could not decode {what}: {e}");
                    None
                }
            },
            ApiResult::RateLimited(category) => {
                log::warn!(target: LOG_TARGET, "The {category} rate budget is exhausted, could not fetch {what}");
                None
            }
            ApiResult::NotFound | ApiResult::Unprocessable => {
                log::debug!(target: LOG_TARGET, "No {what} available");
                None
            }
            ApiResult::Failed(e) => {
                log::warn!(target: LOG_TARGET, "Could not fetch {what}: {e:#}");
                None
            }
        }
    }

    /// Fetch one page of repository search results.
    ///
    /// Returns an empty list once the search has no more results to offer.
    pub async fn search_repositories(&self, query: &str, per_page: usize, page: u32) -> Result<Vec<RepoId>> {
        let mut url = self.endpoint(["search", "repositories"]);
        let _ = url
            .query_pairs_mut()
            .append_pair("q", query)
            .append_pair("per_page", &per_page.clamp(1, MAX_SEARCH_PAGE_SIZE).to_string())
            .append_pair("page", &page.to_string());

        log::debug!(target: LOG_TARGET, "Searching repositories, page {page}");

        match self.api_call(&url, JSON_MEDIA_TYPE).await {
            ApiResult::Success(resp) => {
                let response: SearchResponse = resp.json().await.into_app_err("could not decode search results")?;
                Ok(response
                    .items
                    .into_iter()
                    .map(|item| RepoId::new(item.owner.login, item.name))
                    .collect())
            }
            ApiResult::RateLimited(category) => bail!("the {category} rate budget is exhausted"),
            ApiResult::NotFound | ApiResult::Unprocessable => Ok(Vec::new()),
            ApiResult::Failed(e) => Err(e),
        }
    }
}

impl RemoteSource for GitHubClient {
    fn fetch_structure<'a>(&'a self, id: &'a RepoId) -> BoxFuture<'a, Option<Tree>> {
        Box::pin(async move {
            let mut url = self.repo_endpoint(id, ["git", "trees", "HEAD"]);
            url.set_query(Some("recursive=1"));

            let response: TreeResponse = self.get_json(url, &format!("structure of '{id}'")).await?;
            if response.truncated {
                log::info!(target: LOG_TARGET, "The structure of '{id}' is too large for the API");
                return None;
            }

            Some(response.tree.into_iter().filter_map(RawTreeEntry::into_entry).collect())
        })
    }

    fn fetch_file<'a>(&'a self, id: &'a RepoId, path: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move {
            let url = self.repo_endpoint(id, ["contents"].into_iter().chain(path.split('/')));

            match self.api_call(&url, RAW_MEDIA_TYPE).await {
                ApiResult::Success(resp) => match resp.bytes().await {
                    Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(e) => {
                        log::warn!(target: LOG_TARGET, "Could not read '{path}' of '{id}': {e}");
                        None
                    }
                },
                ApiResult::RateLimited(category) => {
                    log::warn!(target: LOG_TARGET, "The {category} rate budget is exhausted, could not fetch '{path}' of '{id}'");
                    None
                }
                ApiResult::NotFound | ApiResult::Unprocessable => {
                    log::debug!(target: LOG_TARGET, "File '{path}' of '{id}' not found");
                    None
                }
                ApiResult::Failed(e) => {
                    log::warn!(target: LOG_TARGET, "Could not fetch '{path}' of '{id}': {e:#}");
                    None
                }
            }
        })
    }

    fn fetch_metadata<'a>(&'a self, id: &'a RepoId) -> BoxFuture<'a, Option<Metadata>> {
        Box::pin(async move {
            let url = self.repo_endpoint(id, []);
            self.get_json(url, &format!("metadata of '{id}'")).await
        })
    }

    fn fetch_owner_repos<'a>(&'a self, owner: &'a str) -> BoxFuture<'a, Option<Vec<String>>> {
        Box::pin(async move {
            let mut names = Vec::new();
            for page in 1..=MAX_OWNER_REPOS_PAGES {
                let mut url = self.endpoint(["users", owner, "repos"]);
                let _ = url
                    .query_pairs_mut()
                    .append_pair("per_page", &OWNER_REPOS_PAGE_SIZE.to_string())
                    .append_pair("page", &page.to_string());

                let repos: Vec<OwnerRepo> = self.get_json(url, &format!("repositories of '{owner}'")).await?;
                let last_page = repos.len() < OWNER_REPOS_PAGE_SIZE;
                names.extend(repos.into_iter().map(|r| r.name));
                if last_page {
                    return Some(names);
                }
            }

            log::debug!(target: LOG_TARGET, "Listing of '{owner}' cut off after {} repositories", names.len());
            Some(names)
        })
    }

    fn clone_repo<'a>(&'a self, id: &'a RepoId, target: &'a Path) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let url = format!("{}/{}/{}.git", self.clone_url, id.owner(), id.name());
            match git::clone_repo(target, &url).await {
                Ok(()) => true,
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Could not clone '{id}': {e:#}");
                    false
                }
            }
        })
    }
}

fn header_value<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Extract quota information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let limit = header_value::<u32>(headers, "x-ratelimit-limit")?;
    let remaining = header_value::<u32>(headers, "x-ratelimit-remaining")?;
    let reset_at = DateTime::from_timestamp(header_value::<i64>(headers, "x-ratelimit-reset")?, 0)?;

    let category = match header_value::<String>(headers, "x-ratelimit-resource") {
        None => RateCategory::Core,
        Some(resource) => match RateCategory::from_str(&resource) {
            Ok(category) => category,
            Err(_) => {
                log::debug!(target: LOG_TARGET, "Ignoring quota of untracked resource '{resource}'");
                return None;
            }
        },
    };

    Some(RateLimitInfo {
        category,
        limit,
        remaining,
        reset_at,
    })
}

fn parse_retry_after(headers: &HeaderMap) -> Option<i64> {
    header_value(headers, RETRY_AFTER.as_str())
}
