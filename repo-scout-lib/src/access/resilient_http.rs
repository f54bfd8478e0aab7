//! HTTP GET with timeout and retry of transient failures.
//!
//! Requests go through a [`seatbelt`] retry and timeout stack. Network errors and
//! 5xx responses are retried with exponential backoff. Quota responses (403, 429)
//! are returned to the caller, which owns rate-limit handling.

use core::time::Duration;
use layered::{Execute, Service, Stack};
use ohno::app_err;
use reqwest::header::ACCEPT;
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use tick::Clock;

const LOG_TARGET: &str = "      http";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Retries on top of the original request.
const MAX_RETRY_ATTEMPTS: u32 = 3;

const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Classify a response for retry purposes.
fn recovery_for(result: &crate::Result<reqwest::Response>) -> RecoveryInfo {
    match result {
        Err(_) => RecoveryInfo::retry(),
        Ok(resp) if resp.status().is_server_error() => RecoveryInfo::retry(),

        // quota responses included, those are judged by the GitHub client
        Ok(_) => RecoveryInfo::never(),
    }
}

/// Send a GET request for `url` with the given `Accept` header.
pub async fn resilient_get(client: &reqwest::Client, url: &str, accept: &str) -> crate::Result<reqwest::Response> {
    let clock = Clock::new_tokio();
    let context = ResilienceContext::new(&clock).name("github_get");

    let client = client.clone();
    let accept = accept.to_string();
    let service = (
        Retry::layer("retry", &context)
            .clone_input()
            .recovery_with(|result: &crate::Result<reqwest::Response>, _| recovery_for(result))
            .max_retry_attempts(MAX_RETRY_ATTEMPTS)
            .base_delay(RETRY_BASE_DELAY)
            .backoff(Backoff::Exponential)
            .on_retry(|_output, args| {
                log::debug!(
                    target: LOG_TARGET,
                    "retrying HTTP GET (attempt {}, delay {}ms)",
                    args.attempt().index() + 1,
                    args.retry_delay().as_millis(),
                );
            }),
        Timeout::layer("timeout", &context)
            .timeout_error(|_| app_err!("HTTP request timed out"))
            .timeout(DEFAULT_REQUEST_TIMEOUT),
        Execute::new(move |url: String| {
            let client = client.clone();
            let accept = accept.clone();
            async move { client.get(&url).header(ACCEPT, accept).send().await.map_err(ohno::AppError::from) }
        }),
    )
        .into_service();

    service.execute(url.to_string()).await
}
