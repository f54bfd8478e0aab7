//! Access to repository data
//!
//! Everything a rule learns about a repository flows through this module. Data is
//! fetched from the GitHub REST API while the rate budget allows it; a repository
//! whose structure is too large, whose batch of file requests is too big, or that is
//! evaluated while the budget is running low is cloned to disk and read locally from
//! then on.
//!
//! # Implementation Model
//!
//! - [`RateBudgetTracker`] records the quota headers of every API response, per
//!   [`RateCategory`], and answers "is it comfortable?" and "is it exhausted?".
//! - [`RemoteSource`] is the seam to the remote API. [`GitHubClient`] is the real
//!   implementation; tests substitute a fake.
//! - [`LocalSource`] walks and reads a cloned working tree.
//! - [`ResilientDataSource`] owns the per-repository state machine: it starts on
//!   the remote API and switches to a [`LocalSource`] at most once.
//! - [`backoff`] waits for an exhausted budget to reset through an injectable
//!   [`Clock`], and [`Throttler`] holds back new work while that happens.

pub mod backoff;
mod clock;
mod data_source;
mod error;
mod git;
mod github;
mod local;
mod path_utils;
mod rate_budget;
mod remote;
mod resilient_http;
mod throttler;
mod tree;

pub use clock::{Clock, SystemClock};
pub use data_source::{AccessContext, AccessSettings, ResilientDataSource};
pub use error::AccessError;
pub use github::{DEFAULT_API_URL, DEFAULT_CLONE_URL, GitHubClient};
pub use local::{LocalSource, sweep_clones};
pub use rate_budget::{RateBudget, RateBudgetTracker, RateCategory};
pub use remote::RemoteSource;
pub use throttler::Throttler;
pub use tree::{EntryKind, Metadata, Tree, TreeEntry};
