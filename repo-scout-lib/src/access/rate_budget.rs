//! Per-category bookkeeping of the remote API quota.

use chrono::{DateTime, Utc};
use core::time::Duration;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use strum::{Display, EnumString};

const LOG_TARGET: &str = "    budget";

/// Quota category reported by the remote API in the `x-ratelimit-resource` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RateCategory {
    Core,
    Search,
    CodeSearch,
    Graphql,
}

/// Last known quota for one [`RateCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    pub max: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Shared, thread-safe record of the remaining quota per category.
///
/// A category that has never been observed, or whose reset time has passed, is
/// treated as having its full quota available.
#[derive(Debug)]
pub struct RateBudgetTracker {
    threshold: f64,
    budgets: Mutex<HashMap<RateCategory, RateBudget>>,
}

impl RateBudgetTracker {
    /// Create a tracker with the given comfort threshold, a fraction in `0.0..=1.0`.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            budgets: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Record the quota reported by a response.
    pub fn record(&self, category: RateCategory, max: u32, remaining: u32, reset_at: DateTime<Utc>) {
        let remaining = remaining.min(max);
        log::trace!(target: LOG_TARGET, "{category} budget: {remaining}/{max}, resets at {reset_at}");

        let _ = self
            .budgets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(category, RateBudget { max, remaining, reset_at });
    }

    /// The last recorded quota for `category`, regardless of whether it has reset since.
    #[must_use]
    pub fn budget(&self, category: RateCategory) -> Option<RateBudget> {
        self.budgets.lock().unwrap_or_else(PoisonError::into_inner).get(&category).copied()
    }

    fn current(&self, category: RateCategory, now: DateTime<Utc>) -> Option<RateBudget> {
        self.budget(category).filter(|b| now < b.reset_at)
    }

    /// Whether at least the threshold fraction of the quota is still available.
    #[must_use]
    pub fn is_comfortable(&self, category: RateCategory, now: DateTime<Utc>) -> bool {
        self.current(category, now)
            .is_none_or(|b| f64::from(b.remaining) >= self.threshold * f64::from(b.max))
    }

    /// Whether no requests remain until the next reset.
    #[must_use]
    pub fn is_exhausted(&self, category: RateCategory, now: DateTime<Utc>) -> bool {
        self.current(category, now).is_some_and(|b| b.remaining == 0)
    }

    /// Time left until the quota of `category` resets, zero if unknown or already past.
    #[must_use]
    pub fn time_until_reset(&self, category: RateCategory, now: DateTime<Utc>) -> Duration {
        self.budget(category)
            .and_then(|b| (b.reset_at - now).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }
}
