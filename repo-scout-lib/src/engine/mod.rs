//! Rule registry and scheduling
//!
//! A [`RuleRegistry`] holds the [`RuleDef`]s of a run. The [`Scheduler`] pulls
//! repositories from the queue, applies every mandatory rule, applies the quality
//! rules only when the mandatory ones scored, and hands each finished repository
//! to a result recorder.

mod rule;
mod scheduler;

pub use rule::{RuleCategory, RuleDef, RuleInstance, RuleRegistry};
pub use scheduler::{MANDATORY_NOT_MET, RunSummary, Scheduler};
