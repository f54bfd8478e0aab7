use super::Host;
use super::common::{LogLevel, clone_root, init_logging};
use super::config::Config;
use crate::Result;
use crate::access::{
    AccessContext, Clock, DEFAULT_API_URL, DEFAULT_CLONE_URL, GitHubClient, RateBudgetTracker, SystemClock, Throttler, sweep_clones,
};
use crate::engine::{RunSummary, Scheduler};
use crate::repo::{Discovery, GitHubDiscovery, RepositoryQueue};
use crate::reports::{CsvRecorder, ResultRecorder, sort_results, sorted_path};
use crate::rules::default_rules;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ohno::IntoAppError;
use std::io::Write;
use std::sync::Arc;

const LOG_TARGET: &str = "      scan";

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Number of repositories to evaluate
    #[arg(long, value_name = "N")]
    pub count: usize,

    /// GitHub search query used to discover repositories (default from the configuration)
    #[arg(long, value_name = "QUERY")]
    pub query: Option<String>,

    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN")]
    pub github_token: Option<String>,

    /// Path to configuration file (default is `repo-scout.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory where repositories are cloned (default is in the platform's cache directory)
    #[arg(long, value_name = "PATH")]
    pub clone_dir: Option<Utf8PathBuf>,

    /// CSV file receiving one row per evaluated repository
    #[arg(long, short = 'o', value_name = "PATH", default_value = "results.csv")]
    pub output: Utf8PathBuf,

    /// Repositories evaluated at the same time (default is the number of available cores)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,

    #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL, hide = true)]
    pub api_url: String,

    #[arg(long, value_name = "URL", default_value = DEFAULT_CLONE_URL, hide = true)]
    pub clone_url: String,
}

pub async fn scan<H: Host>(host: &mut H, args: &ScanArgs) -> Result<()> {
    init_logging(args.log_level);

    match scan_inner(args).await {
        Ok((summary, sorted)) => {
            report(host, &summary, &args.output, sorted.as_deref());
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Scan failed: {e:#}");
            host.exit(1);
            Err(e)
        }
    }
}

async fn scan_inner(args: &ScanArgs) -> Result<(RunSummary, Option<Utf8PathBuf>)> {
    let config = Config::load(Utf8Path::new("."), args.config.as_ref())?;

    let clone_root = clone_root(args.clone_dir.as_ref())?;
    std::fs::create_dir_all(&clone_root).into_app_err_with(|| format!("creating clone directory '{}'", clone_root.display()))?;

    let budget = Arc::new(RateBudgetTracker::new(config.rate_threshold));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let client = GitHubClient::new(
        args.github_token.as_deref(),
        &args.api_url,
        &args.clone_url,
        Arc::clone(&budget),
        Arc::clone(&clock),
    )?;

    if args.github_token.is_none() {
        log::warn!(target: LOG_TARGET, "No GitHub token given, the API allows only a few requests per hour");
    }

    let query = args.query.clone().unwrap_or_else(|| config.search_query.clone());
    let discovery: Arc<dyn Discovery> = Arc::new(GitHubDiscovery::new(client.clone(), query, config.max_rate_limit_wait));
    let queue = Arc::new(RepositoryQueue::new(config.queue_settings(), Arc::clone(&clock), Some(discovery)));

    let access = AccessContext {
        remote: Arc::new(client),
        budget,
        clock,
        throttler: Throttler::new(args.workers.unwrap_or_else(default_workers)),
        settings: config.access_settings(),
        clone_root: Arc::from(clone_root.as_path()),
    };

    let rules = Arc::new(default_rules(&config.rule_settings()));
    let recorder: Arc<dyn ResultRecorder> = Arc::new(CsvRecorder::create(&args.output, rules.names())?);

    let summary = Scheduler::new(Arc::clone(&queue), rules, access.clone(), Some(recorder))
        .run(args.count)
        .await;

    let clones = queue.started().iter().map(|id| access.clone_path(id)).collect();
    if !sweep_clones(&clone_root, clones).await {
        log::warn!(target: LOG_TARGET, "Some clones below '{}' could not be deleted", clone_root.display());
    }

    let sorted = sorted_path(&args.output);
    let sorted = match sort_results(&args.output, &sorted) {
        Ok(_) => Some(sorted),
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Could not write sorted results: {e:#}");
            None
        }
    };

    Ok((summary, sorted))
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, core::num::NonZeroUsize::get)
}

fn report<H: Host>(host: &mut H, summary: &RunSummary, output: &Utf8Path, sorted: Option<&Utf8Path>) {
    let mut out = host.output();
    for repository in &summary.repositories {
        let _ = writeln!(out, "{:>5}  {}", repository.score(), repository.id());
    }

    let _ = writeln!(out, "Evaluated {} repositories, results written to {output}", summary.repositories.len());
    if let Some(sorted) = sorted {
        let _ = writeln!(out, "Results sorted by total score written to {sorted}");
    }
    if summary.skipped > 0 {
        let _ = writeln!(out, "{} evaluations found no repository to work on", summary.skipped);
    }
    if summary.failed > 0 {
        let _ = writeln!(out, "{} evaluations failed", summary.failed);
    }
}
