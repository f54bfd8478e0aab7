use super::ResultRecorder;
use crate::Result;
use crate::repo::Repository;
use camino::Utf8Path;
use ohno::IntoAppError;
use std::fs::File;
use std::sync::{Arc, Mutex, PoisonError};

const LOG_TARGET: &str = "   reports";

/// Writes one CSV row per repository: name, owner, one column per rule, total score and
/// evaluation time in milliseconds.
#[derive(Debug)]
pub struct CsvRecorder {
    writer: Mutex<csv::Writer<File>>,
    rules: Vec<Arc<str>>,
}

impl CsvRecorder {
    /// Create `path`, truncating an existing file, and write the header row.
    pub fn create<'a>(path: &Utf8Path, rules: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let rules: Vec<Arc<str>> = rules.into_iter().map(Arc::from).collect();
        let mut writer = csv::Writer::from_path(path).into_app_err_with(|| format!("could not create '{path}'"))?;

        let header = ["repo_name", "repo_owner"]
            .into_iter()
            .chain(rules.iter().map(|r| &**r))
            .chain(["total_score", "duration_ms"]);
        writer.write_record(header).into_app_err_with(|| format!("could not write to '{path}'"))?;
        writer.flush().into_app_err_with(|| format!("could not write to '{path}'"))?;

        log::debug!(target: LOG_TARGET, "Recording results to '{path}'");

        Ok(Self {
            writer: Mutex::new(writer),
            rules,
        })
    }

    fn row(&self, repository: &Repository) -> Vec<String> {
        let mut row = Vec::with_capacity(self.rules.len() + 4);
        row.push(repository.name().to_string());
        row.push(repository.owner().to_string());
        for rule in &self.rules {
            row.push(repository.outcome(rule).map(ToString::to_string).unwrap_or_default());
        }
        row.push(repository.score().to_string());
        row.push(repository.duration().as_millis().to_string());
        row
    }
}

impl ResultRecorder for CsvRecorder {
    fn record(&self, repository: &Repository) -> Result<()> {
        let row = self.row(repository);

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_record(&row).into_app_err("could not write result row")?;
        writer.flush().into_app_err("could not flush results")?;
        Ok(())
    }
}
