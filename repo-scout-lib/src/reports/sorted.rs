use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use core::cmp::Reverse;
use ohno::{IntoAppError, app_err};

const LOG_TARGET: &str = "   reports";

const TOTAL_SCORE: &str = "total_score";

/// Where the sorted copy of `results` goes: `results.csv` becomes `results_sorted.csv`.
#[must_use]
pub fn sorted_path(results: &Utf8Path) -> Utf8PathBuf {
    let stem = results.file_stem().unwrap_or("results");
    let name = results.extension().map_or_else(|| format!("{stem}_sorted"), |ext| format!("{stem}_sorted.{ext}"));
    results.with_file_name(name)
}

/// Copy the results CSV at `input` to `output`, rows ordered by descending total score.
///
/// Rows keep their relative order on equal scores. Rows whose score is not a number go
/// last. Returns the number of rows written.
pub fn sort_results(input: &Utf8Path, output: &Utf8Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(input).into_app_err_with(|| format!("could not open '{input}'"))?;
    let header = reader.headers().into_app_err_with(|| format!("could not read '{input}'"))?.clone();
    let column = header
        .iter()
        .position(|h| h == TOTAL_SCORE)
        .ok_or_else(|| app_err!("'{input}' has no {TOTAL_SCORE} column"))?;

    let mut rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .into_app_err_with(|| format!("could not read '{input}'"))?;
    rows.sort_by_key(|row| Reverse(row.get(column).and_then(|score| score.trim().parse::<u64>().ok())));

    let mut writer = csv::Writer::from_path(output).into_app_err_with(|| format!("could not create '{output}'"))?;
    writer.write_record(&header).into_app_err_with(|| format!("could not write to '{output}'"))?;
    for row in &rows {
        writer.write_record(row).into_app_err_with(|| format!("could not write to '{output}'"))?;
    }
    writer.flush().into_app_err_with(|| format!("could not write to '{output}'"))?;

    log::debug!(target: LOG_TARGET, "Wrote {} sorted results to '{output}'", rows.len());
    Ok(rows.len())
}
