pub mod csv;
pub mod text;

use crate::signal::RecordedSample;
use anyhow::Result;
use std::path::Path;

/// Reads a recording, choosing the CSV reader for `.csv` files and the
/// plain-text reader otherwise.
pub fn read_samples(path: &Path) -> Result<Vec<RecordedSample>> {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => csv::read_samples_csv(path),
        _ => text::read_sample_pairs(path),
    }
}
