use crate::signal::RecordedSample;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse newline-delimited sample pairs, ignoring blank/comment lines.
///
/// Each line holds `ir red` or `timestamp ir red`, separated by commas
/// and/or whitespace.
pub fn parse_sample_pairs(text: &str) -> Result<Vec<RecordedSample>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        let (timestamp, ir, red) = match fields.as_slice() {
            [ir, red] => (None, *ir, *red),
            [ts, ir, red] => {
                let ts: f64 = ts
                    .parse()
                    .with_context(|| format!("line {} timestamp is not f64: {}", idx + 1, ts))?;
                (Some(ts), *ir, *red)
            }
            _ => anyhow::bail!(
                "line {} must hold 2 or 3 fields, found {}: {}",
                idx + 1,
                fields.len(),
                trimmed
            ),
        };
        let ir: u32 = ir
            .parse()
            .with_context(|| format!("line {} ir is not an unsigned integer: {}", idx + 1, ir))?;
        let red: u32 = red
            .parse()
            .with_context(|| format!("line {} red is not an unsigned integer: {}", idx + 1, red))?;
        out.push(RecordedSample { timestamp, ir, red });
    }
    if out.is_empty() {
        anyhow::bail!("no sample pairs found");
    }
    Ok(out)
}

/// Read newline-delimited sample pairs from disk.
pub fn read_sample_pairs(path: &Path) -> Result<Vec<RecordedSample>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_sample_pairs(&text)
}
