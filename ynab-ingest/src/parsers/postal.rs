//! Postal bank CSV export
//!
//! Expected layout after a preamble of account details:
//!   Date;Texte de notification;Crédit en CHF;Débit en CHF;Valeur;Solde en CHF
//!   24.03.2019;Achat Coop;;-12.50;24.03.2019;1000.00
//! followed by a few disclaimer lines.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use ynab_core::{write_grid, Cell, Grid, RawRow};

use crate::normalize::{normalize, NormalizeSummary};
use crate::preprocess::preprocess_file;
use crate::types::StatementProfile;

/// Split cleaned export text into a grid, coercing the profile's numeric columns.
pub fn parse_grid(text: &str, profile: &StatementProfile) -> Result<Grid> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(profile.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: RawRow = record
            .iter()
            .enumerate()
            .map(|(i, field)| Cell::parse(field, profile.is_numeric(i + 1)))
            .collect();
        rows.push(row);
    }

    Ok(Grid::new(rows))
}

/// Convert one export file into the canonical ledger at `output`.
///
/// The cleaned intermediate file is removed once the ledger is written.
pub async fn convert_export(
    input: &Path,
    output: &Path,
    profile: &StatementProfile,
) -> Result<NormalizeSummary> {
    let cleaned = preprocess_file(input, profile.encoding).await?;

    let text = tokio::fs::read_to_string(&cleaned)
        .await
        .with_context(|| format!("read {}", cleaned.display()))?;
    let mut grid = parse_grid(&text, profile)
        .with_context(|| format!("parse {}", cleaned.display()))?;

    let summary = normalize(&mut grid, profile)?;
    write_grid(output, &grid).await?;

    tokio::fs::remove_file(&cleaned)
        .await
        .with_context(|| format!("remove {}", cleaned.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        rows = summary.data_rows,
        invalid_dates = summary.invalid_dates,
        "converted statement"
    );
    Ok(summary)
}
