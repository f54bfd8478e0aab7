//! Command-line interface and orchestration for repo-scout
//!
//! This module parses the command line, loads the configuration, and wires the
//! access layer, the repository queue, the rules and the scheduler together.
//!
//! # Commands
//!
//! - **scan**: Discover repositories through the GitHub search API, evaluate them
//!   against the default rules, and write one CSV row per repository
//! - **init**: Generate a default configuration file
//!
//! Configuration is a TOML file holding the thresholds of the access layer, the
//! queue's refill behavior, the discovery query, and the inputs of the rules.

mod common;
mod config;
mod host;
mod init;
mod run;
mod scan;

#[cfg(debug_assertions)]
pub use config::Config;
#[cfg(any(debug_assertions, test))]
pub use host::TestHost;
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
pub use scan::{ScanArgs, scan};
