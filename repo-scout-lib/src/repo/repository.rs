use super::{Outcome, RepoId, RepositoryCache, total_score};
use chrono::{DateTime, Utc};
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

/// A repository under evaluation and the outcomes recorded for it so far.
#[derive(Debug)]
pub struct Repository {
    id: RepoId,
    outcomes: Vec<(Arc<str>, Outcome)>,
    score: u64,
    created_at: DateTime<Utc>,
    started: Instant,
    duration: Option<Duration>,
    cache: Option<RepositoryCache>,
}

impl Repository {
    #[must_use]
    pub fn new(cache: RepositoryCache, created_at: DateTime<Utc>) -> Self {
        Self {
            id: cache.id().clone(),
            outcomes: Vec::new(),
            score: 0,
            created_at,
            started: Instant::now(),
            duration: None,
            cache: Some(cache),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &RepoId {
        &self.id
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        self.id.owner()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Record the outcome of `rule`, replacing an earlier one for the same rule.
    pub fn save_outcome(&mut self, rule: &str, outcome: Outcome) {
        match self.outcomes.iter_mut().find(|(name, _)| &**name == rule) {
            Some((_, existing)) => *existing = outcome,
            None => self.outcomes.push((Arc::from(rule), outcome)),
        }

        self.score = total_score(self.outcomes.iter().map(|(_, o)| o));
    }

    #[must_use]
    pub fn outcome(&self, rule: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|(name, _)| &**name == rule).map(|(_, o)| o)
    }

    /// Outcomes in the order they were first recorded.
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, &Outcome)> {
        self.outcomes.iter().map(|(name, outcome)| (&**name, outcome))
    }

    /// Sum of the points of all recorded outcomes.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Data access for rules; `None` once the evaluation has finished.
    pub const fn cache_mut(&mut self) -> Option<&mut RepositoryCache> {
        self.cache.as_mut()
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.cache.is_none()
    }

    /// End the evaluation: release cached data, delete the clone, and stop the clock.
    pub async fn finish(&mut self) {
        if let Some(mut cache) = self.cache.take() {
            cache.finish().await;
            self.duration = Some(self.started.elapsed());
        }
    }

    /// Evaluation time, final once [`Repository::finish`] has run.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration.unwrap_or_else(|| self.started.elapsed())
    }
}
