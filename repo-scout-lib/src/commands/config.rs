use crate::Result;
use crate::access::AccessSettings;
use crate::repo::QueueSettings;
use crate::rules::RuleSettings;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "repo-scout.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Fraction of a rate budget that must remain for the API to stay in use (0 < x <= 1)
    pub rate_threshold: f64,

    /// Largest repository tree, in entries, read through the API
    pub clone_threshold: usize,

    /// Largest repository, in kilobytes, that may be cloned
    pub max_clone_size_kb: u64,

    /// Largest batch of files fetched one request at a time
    pub max_files_per_request: usize,

    /// Refill the queue when fewer than this many repositories are pending
    pub queue_low_water: usize,

    /// Repositories requested from discovery per refill
    pub refill_batch: usize,

    /// Extra looks at an empty queue before a worker gives up
    pub queue_max_polls: u32,

    /// Pause between two looks at an empty queue
    #[serde(with = "humantime_serde")]
    pub queue_poll_interval: Duration,

    /// Longest a request waits for an exhausted rate budget to reset
    #[serde(with = "humantime_serde")]
    pub max_rate_limit_wait: Duration,

    /// GitHub search query used to discover repositories
    pub search_query: String,

    /// Words searched for in the text files of a repository
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub keyword_limits: Vec<u32>,

    #[serde(default)]
    pub doc_folder_limits: Vec<u32>,

    #[serde(default)]
    pub model_file_limits: Vec<u32>,

    /// Points for an unrelated, a similarly named and a same-named documentation repository of the owner
    #[serde(default = "default_owner_repo_limits")]
    pub owner_repo_limits: Vec<u32>,
}

fn default_owner_repo_limits() -> Vec<u32> {
    vec![1, 2, 3]
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `repo-scout.toml` in `base_dir` is used if it exists.
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default_config(),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        Self::parse(&text).into_app_err_with(|| format!("loading configuration file '{final_path}'"))
    }

    /// The embedded default configuration
    pub fn default_config() -> Result<Self> {
        Self::parse(DEFAULT_CONFIG_TOML)
    }

    fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).into_app_err("parsing configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Save the default configuration to a TOML file
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(self.rate_threshold > 0.0 && self.rate_threshold <= 1.0) {
            return Err(app_err!("rate_threshold must be greater than 0 and at most 1, got {}", self.rate_threshold));
        }

        for (name, value) in [
            ("clone_threshold", self.clone_threshold),
            ("max_files_per_request", self.max_files_per_request),
            ("refill_batch", self.refill_batch),
        ] {
            if value == 0 {
                return Err(app_err!("{name} must be positive"));
            }
        }

        if self.max_clone_size_kb == 0 {
            return Err(app_err!("max_clone_size_kb must be positive"));
        }

        if self.queue_poll_interval.is_zero() {
            return Err(app_err!("queue_poll_interval must not be zero"));
        }

        if self.search_query.trim().is_empty() {
            return Err(app_err!("search_query must not be empty"));
        }

        if self.owner_repo_limits.len() != 3 {
            return Err(app_err!("owner_repo_limits needs exactly 3 values, got {}", self.owner_repo_limits.len()));
        }

        Ok(())
    }

    #[must_use]
    pub const fn access_settings(&self) -> AccessSettings {
        AccessSettings {
            clone_threshold: self.clone_threshold,
            max_files_per_request: self.max_files_per_request,
            max_clone_size_kb: self.max_clone_size_kb,
            max_rate_limit_wait: self.max_rate_limit_wait,
        }
    }

    #[must_use]
    pub const fn queue_settings(&self) -> QueueSettings {
        QueueSettings {
            low_water: self.queue_low_water,
            refill_batch: self.refill_batch,
            max_polls: self.queue_max_polls,
            poll_interval: self.queue_poll_interval,
        }
    }

    #[must_use]
    pub fn rule_settings(&self) -> RuleSettings {
        RuleSettings {
            keywords: self.keywords.clone(),
            keyword_limits: self.keyword_limits.clone(),
            doc_folder_limits: self.doc_folder_limits.clone(),
            model_file_limits: self.model_file_limits.clone(),
            owner_repo_limits: self.owner_repo_limits.clone(),
        }
    }
}
