//! Arguments and setup shared by the commands.

use crate::Result;
use camino::Utf8PathBuf;
use clap::ValueEnum;
use directories::BaseDirs;
use ohno::IntoAppError;
use std::path::PathBuf;

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Route `log` output to stderr at `log_level`, unless `RUST_LOG` says otherwise.
///
/// Only the first call in a process has an effect.
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// The directory clones go to: the one given, or `repo-scout/clones` in the platform's
/// cache directory.
pub fn clone_root(clone_dir: Option<&Utf8PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = clone_dir {
        return Ok(dir.as_std_path().to_path_buf());
    }

    Ok(BaseDirs::new()
        .into_app_err("could not determine cache directory")?
        .cache_dir()
        .join("repo-scout")
        .join("clones"))
}
