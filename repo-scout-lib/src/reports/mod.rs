//! Persistence of evaluation results
//!
//! The scheduler hands every finished repository to a [`ResultRecorder`]. The
//! [`CsvRecorder`] appends one row per repository and flushes it immediately, so a
//! run that is interrupted keeps every result recorded up to that point. Once a run
//! finishes, [`sort_results`] writes a copy ordered by total score.

mod csv_recorder;
mod sorted;

pub use csv_recorder::CsvRecorder;
pub use sorted::{sort_results, sorted_path};

use crate::Result;
use crate::repo::Repository;
use core::fmt::Debug;

/// Receives every finished repository.
///
/// Called concurrently from all workers.
pub trait ResultRecorder: Send + Sync + Debug {
    fn record(&self, repository: &Repository) -> Result<()>;
}
