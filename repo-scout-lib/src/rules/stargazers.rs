use crate::engine::{RuleCategory, RuleDef, RuleInstance};
use crate::repo::{Outcome, RepositoryCache};
use futures_util::future::BoxFuture;

pub const STARGAZERS: &str = "stargazers";

/// Star counts at which another point is awarded.
const STEPS: [u32; 5] = [100, 5_000, 10_000, 25_000, 100_000];

pub fn definition() -> RuleDef {
    RuleDef::new(STARGAZERS, RuleCategory::Quality, |_| Ok(Box::new(Stargazers) as Box<dyn RuleInstance>))
}

/// Scores popularity by the number of stars.
struct Stargazers;

fn points(stars: u32) -> u32 {
    STEPS.iter().map(|&step| u32::from(stars >= step)).sum()
}

impl RuleInstance for Stargazers {
    fn execute<'a>(&'a mut self, cache: &'a mut RepositoryCache) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            match cache.metadata().await {
                Ok(metadata) => Outcome::Points(points(metadata.stargazers)),
                Err(e) => e.into(),
            }
        })
    }
}
