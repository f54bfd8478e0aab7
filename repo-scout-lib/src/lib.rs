#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for repo-scout
//!
//! repo-scout discovers GitHub repositories, reads their structure and file contents
//! through the rate-limited REST API (falling back to a local clone when the API budget
//! gets tight or a repository is too large), and scores each repository against a
//! registry of rules.
//!
//! # Module Organization
//!
//! - [`access`]: Rate budget bookkeeping, the GitHub client, local clones and the
//!   fallback data source that switches between them
//! - [`repo`]: Repository identity, outcomes, the per-repository cache and the work queue
//! - [`engine`]: Rule registry and the scheduler that drains the queue
//! - [`rules`]: The default scoring rules
//! - [`reports`]: Result persistence
//! - [`commands`]: Command-line interface and orchestration

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod access;
#[cfg(not(any(debug_assertions, test)))]
mod access;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod engine;
#[cfg(not(any(debug_assertions, test)))]
mod engine;

#[cfg(any(debug_assertions, test))]
pub mod repo;
#[cfg(not(any(debug_assertions, test)))]
mod repo;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

#[cfg(any(debug_assertions, test))]
pub mod rules;
#[cfg(not(any(debug_assertions, test)))]
mod rules;

#[cfg(any(debug_assertions, test))]
pub mod testing;

pub use crate::commands::{Host, run};
