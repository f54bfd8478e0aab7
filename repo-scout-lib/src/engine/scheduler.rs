use super::{RuleCategory, RuleDef, RuleInstance, RuleRegistry};
use crate::access::{AccessContext, AccessError};
use crate::repo::{Outcome, Repository, RepositoryCache, RepositoryQueue};
use crate::reports::ResultRecorder;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

const LOG_TARGET: &str = " scheduler";

/// Reason recorded for quality rules when the mandatory rules awarded no points.
pub const MANDATORY_NOT_MET: &str = "Did not get mandatory points";

const RULE_UNAVAILABLE: &str = "Rule could not be set up";

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Finished repositories, in completion order.
    pub repositories: Vec<Repository>,

    /// Evaluations that ended without a repository because the queue ran dry.
    pub skipped: usize,

    /// Evaluations that panicked.
    pub failed: usize,
}

/// Drains the repository queue with a bounded number of concurrent evaluations.
#[derive(Debug, Clone)]
pub struct Scheduler {
    queue: Arc<RepositoryQueue>,
    rules: Arc<RuleRegistry>,
    access: AccessContext,
    recorder: Option<Arc<dyn ResultRecorder>>,
}

impl Scheduler {
    #[must_use]
    pub const fn new(
        queue: Arc<RepositoryQueue>,
        rules: Arc<RuleRegistry>,
        access: AccessContext,
        recorder: Option<Arc<dyn ResultRecorder>>,
    ) -> Self {
        Self {
            queue,
            rules,
            access,
            recorder,
        }
    }

    /// Evaluate up to `target_count` repositories.
    ///
    /// At most as many evaluations run at once as the throttler has slots. Results
    /// are collected as evaluations complete; a failing evaluation does not affect the
    /// others.
    pub async fn run(&self, target_count: usize) -> RunSummary {
        let start_time = Instant::now();
        log::info!(target: LOG_TARGET, "Evaluating {target_count} repositories with {} workers", self.access.throttler.workers());

        let mut tasks = JoinSet::new();
        for _ in 0..target_count {
            let this = self.clone();
            let _ = tasks.spawn(async move {
                let _permit = this.access.throttler.acquire().await;
                this.evaluate_next().await
            });
        }

        let mut summary = RunSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(repository)) => summary.repositories.push(repository),
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    log::error!(target: LOG_TARGET, "A repository evaluation failed: {e}");
                    summary.failed += 1;
                }
            }
        }

        log::info!(
            target: LOG_TARGET,
            "Evaluated {} repositories in {:.3}s",
            summary.repositories.len(),
            start_time.elapsed().as_secs_f64()
        );

        summary
    }

    async fn evaluate_next(&self) -> Option<Repository> {
        let Some(id) = self.queue.get_next().await else {
            log::debug!(target: LOG_TARGET, "No repository left to evaluate");
            return None;
        };

        log::info!(target: LOG_TARGET, "Evaluating '{id}'");
        let cache = RepositoryCache::new(id, self.access.clone());
        let mut repository = Repository::new(cache, self.access.clock.now());

        let mut instances: Vec<(&RuleDef, Option<Box<dyn RuleInstance>>)> =
            self.rules.iter().map(|rule| (rule, rule.instantiate(repository.id()))).collect();

        for (rule, instance) in instances.iter_mut().filter(|(rule, _)| rule.category() == RuleCategory::Mandatory) {
            let outcome = apply(instance, &mut repository).await;
            repository.save_outcome(rule.name(), outcome);
        }

        let mandatory_points = repository.score();
        for (rule, instance) in instances.iter_mut().filter(|(rule, _)| rule.category() == RuleCategory::Quality) {
            let outcome = if mandatory_points > 0 {
                apply(instance, &mut repository).await
            } else {
                Outcome::inapplicable(MANDATORY_NOT_MET)
            };
            repository.save_outcome(rule.name(), outcome);
        }

        drop(instances);
        repository.finish().await;
        log::info!(target: LOG_TARGET, "'{}' scored {} points", repository.id(), repository.score());

        if let Some(recorder) = &self.recorder {
            if let Err(e) = recorder.record(&repository) {
                log::warn!(target: LOG_TARGET, "Could not record the result of '{}': {e:#}", repository.id());
            }
        }

        Some(repository)
    }
}

async fn apply(instance: &mut Option<Box<dyn RuleInstance>>, repository: &mut Repository) -> Outcome {
    let Some(rule) = instance else {
        return Outcome::inapplicable(RULE_UNAVAILABLE);
    };

    match repository.cache_mut() {
        Some(cache) => rule.execute(cache).await,
        None => Outcome::from(AccessError::Finished),
    }
}
