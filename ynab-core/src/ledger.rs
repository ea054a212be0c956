//! Ledger writer: serializes canonical records or a normalized grid to the
//! comma-delimited import format.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use tracing::info;

use crate::grid::Grid;
use crate::record::{CanonicalRecord, CANONICAL_HEADER};

/// Serialize records under the canonical header.
pub fn records_to_csv(records: &[CanonicalRecord]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .from_writer(Vec::new());

    wtr.write_record(CANONICAL_HEADER)?;
    for record in records {
        wtr.serialize(record)?;
    }

    let bytes = wtr.into_inner().context("flush csv writer")?;
    Ok(String::from_utf8(bytes)?)
}

/// Serialize the first four columns of every grid row, then apply
/// [`unquote_leading_field`]. Row 1 is expected to already hold the header.
pub fn grid_to_csv(grid: &Grid) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .from_writer(Vec::new());

    for row in 1..=grid.row_count() {
        let fields: Vec<String> = (1..=CANONICAL_HEADER.len())
            .map(|col| grid.cell(row, col).to_string())
            .collect();
        wtr.write_record(&fields)?;
    }

    let bytes = wtr.into_inner().context("flush csv writer")?;
    unquote_leading_field(&String::from_utf8(bytes)?)
}

/// Rewrite `"field",` at the start of a line to `field,`.
///
/// Only a quoted first field with no embedded quote is touched.
pub fn unquote_leading_field(csv_text: &str) -> Result<String> {
    let re = Regex::new(r#"(?m)^"([^"\r\n]*)","#)?;
    Ok(re.replace_all(csv_text, "$1,").into_owned())
}

pub async fn write_records(path: &Path, records: &[CanonicalRecord]) -> Result<()> {
    let text = records_to_csv(records)?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "ledger written");
    Ok(())
}

pub async fn write_grid(path: &Path, grid: &Grid) -> Result<()> {
    let text = grid_to_csv(grid)?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("write {}", path.display()))?;
    info!(
        path = %path.display(),
        records = grid.row_count().saturating_sub(1),
        "ledger written"
    );
    Ok(())
}
