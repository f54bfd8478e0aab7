//! Waiting for an exhausted rate budget to reset.

use super::{Clock, RateBudgetTracker, RateCategory};
use core::time::Duration;

const LOG_TARGET: &str = "   backoff";

/// Shortest single wait, so a reset time that is already due does not spin.
const MIN_WAIT: Duration = Duration::from_secs(1);

/// Wait until `category` is no longer exhausted, or until `max_wait` has elapsed.
///
/// Returns the total time spent waiting.
pub async fn wait_for_budget(
    budget: &RateBudgetTracker,
    category: RateCategory,
    clock: &dyn Clock,
    max_wait: Duration,
) -> Duration {
    let mut waited = Duration::ZERO;

    while budget.is_exhausted(category, clock.now()) {
        if waited >= max_wait {
            log::warn!(target: LOG_TARGET, "Gave up waiting for the {category} rate budget after {}s", waited.as_secs());
            break;
        }

        let step = budget
            .time_until_reset(category, clock.now())
            .max(MIN_WAIT)
            .min(max_wait.saturating_sub(waited));

        log::info!(target: LOG_TARGET, "The {category} rate budget is exhausted, waiting {}s for it to reset", step.as_secs());
        clock.sleep(step).await;
        waited += step;
    }

    waited
}
