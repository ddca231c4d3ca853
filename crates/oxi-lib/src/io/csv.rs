use crate::signal::RecordedSample;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Read a recording with `ir` and `red` columns and an optional `timestamp` column.
pub fn read_samples_csv(path: &Path) -> Result<Vec<RecordedSample>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_samples_csv(file).with_context(|| format!("in {}", path.display()))
}

/// Parse CSV sample pairs from any reader; the header row is required.
pub fn parse_samples_csv<R: Read>(input: R) -> Result<Vec<RecordedSample>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(input);
    let headers = reader.headers().context("reading header")?.clone();

    let ir_idx = locate_column(&headers, "ir")?;
    let red_idx = locate_column(&headers, "red")?;
    let ts_idx = locate_column(&headers, "timestamp").ok();

    let mut samples = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.context("reading record")?;
        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .ok_or_else(|| anyhow::anyhow!("row {} is missing {}", row + 1, name))
        };
        let ir = field(ir_idx, "ir")?
            .parse::<u32>()
            .with_context(|| format!("row {}: parsing ir", row + 1))?;
        let red = field(red_idx, "red")?
            .parse::<u32>()
            .with_context(|| format!("row {}: parsing red", row + 1))?;
        let timestamp = match ts_idx.and_then(|idx| record.get(idx)) {
            Some(v) if !v.is_empty() => Some(
                v.parse::<f64>()
                    .with_context(|| format!("row {}: parsing timestamp", row + 1))?,
            ),
            _ => None,
        };
        samples.push(RecordedSample { timestamp, ir, red });
    }
    if samples.is_empty() {
        anyhow::bail!("no sample rows found");
    }
    Ok(samples)
}

/// Write samples as `timestamp,ir,red` rows with a header.
pub fn write_samples_csv<W: Write>(output: W, samples: &[RecordedSample]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(output);
    writer.write_record(["timestamp", "ir", "red"])?;
    for sample in samples {
        let timestamp = sample.timestamp.map(|t| format!("{t:.6}")).unwrap_or_default();
        writer.write_record([timestamp, sample.ir.to_string(), sample.red.to_string()])?;
    }
    writer.flush().context("flushing csv output")?;
    Ok(())
}

fn locate_column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow::anyhow!("missing {} column", name))
}
