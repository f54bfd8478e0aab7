use crate::Result;
use crate::repo::{Outcome, RepoId, RepositoryCache};
use core::fmt::{Debug, Formatter};
use core::sync::atomic::{AtomicBool, Ordering};
use futures_util::future::BoxFuture;
use std::sync::Arc;
use strum::{Display, EnumString};

const LOG_TARGET: &str = "     rules";

/// Whether a rule gates the others or only adds to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RuleCategory {
    /// Applied to every repository; their points decide whether quality rules run.
    Mandatory,

    /// Applied only when the mandatory rules awarded any points.
    Quality,
}

/// A rule prepared for one repository.
pub trait RuleInstance: Send {
    fn execute<'a>(&'a mut self, cache: &'a mut RepositoryCache) -> BoxFuture<'a, Outcome>;
}

type RuleFactory = dyn Fn(&RepoId) -> Result<Box<dyn RuleInstance>> + Send + Sync;

/// A named rule and how to instantiate it per repository.
///
/// A rule whose instantiation fails is disabled for the rest of the run.
pub struct RuleDef {
    name: Arc<str>,
    category: RuleCategory,
    factory: Box<RuleFactory>,
    disabled: AtomicBool,
}

impl RuleDef {
    pub fn new<F>(name: &str, category: RuleCategory, factory: F) -> Self
    where
        F: Fn(&RepoId) -> Result<Box<dyn RuleInstance>> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            category,
            factory: Box::new(factory),
            disabled: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn category(&self) -> RuleCategory {
        self.category
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    /// Prepare the rule for `id`, or `None` if the rule is disabled.
    pub fn instantiate(&self, id: &RepoId) -> Option<Box<dyn RuleInstance>> {
        if self.is_disabled() {
            return None;
        }

        match (self.factory)(id) {
            Ok(instance) => Some(instance),
            Err(e) => {
                if !self.disabled.swap(true, Ordering::AcqRel) {
                    log::error!(target: LOG_TARGET, "Could not set up rule '{}', skipping it from now on: {e:#}", self.name);
                }
                None
            }
        }
    }
}

impl Debug for RuleDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RuleDef")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("disabled", &self.is_disabled())
            .finish_non_exhaustive()
    }
}

/// The rules of a run, in registration order.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<RuleDef>,
}

impl RuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule; a rule with the same name replaces the earlier one.
    pub fn register(&mut self, rule: RuleDef) -> &mut Self {
        match self.rules.iter_mut().find(|r| r.name() == rule.name()) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        self
    }

    #[must_use]
    pub fn with(mut self, rule: RuleDef) -> Self {
        let _ = self.register(rule);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDef> {
        self.rules.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(RuleDef::name)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
