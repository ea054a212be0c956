//! Tabular normalizer: turns a parsed bank export grid into the canonical
//! `Memo, Inflow, Outflow, Date` table.
//!
//! Each step is a small idempotent transform over the grid and is exposed on
//! its own; [`normalize`] runs them in the fixed order the export layout needs:
//!
//! 1. outflow column to absolute values
//! 2. running-balance column blanked (cells cleared, column kept)
//! 3. leading booking-date column removed
//! 4. header row located (last marker occurrence wins)
//! 5. rows above the header dropped
//! 6. header cells renamed
//! 7. trailing boilerplate rows dropped
//! 8. value dates rewritten as `YYYY-MM-DD`

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, warn};
use ynab_core::{Cell, Grid, RawRow, CANONICAL_HEADER};

use crate::types::{StatementProfile, INVALID_DATE};

/// Column of each canonical field once the leading column is gone
pub const INFLOW_COL: usize = 2;
pub const OUTFLOW_COL: usize = 3;
pub const DATE_COL: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    /// 1-based row of the marker before trimming, 0 when absent
    pub header_row: usize,
    pub prefix_rows_removed: usize,
    pub footer_rows_removed: usize,
    pub data_rows: usize,
    pub invalid_dates: usize,
}

pub fn absolute_outflows(grid: &mut Grid, col: usize) {
    grid.map_column(col, |cell| match cell {
        Cell::Number(n) => Cell::Number(n.abs()),
        other => other.clone(),
    });
}

pub fn clear_column(grid: &mut Grid, col: usize) {
    grid.map_column(col, |_| Cell::Empty);
}

/// Position (1-based) of the last row whose first cell is one of `markers`,
/// or 0 when none is.
pub fn find_header<S: AsRef<str>>(grid: &Grid, markers: &[S]) -> usize {
    let mut position = 0;
    for row in 1..=grid.row_count() {
        let first = grid.cell(row, 1).as_text().map(str::trim);
        if let Some(first) = first {
            if markers.iter().any(|m| m.as_ref() == first) {
                position = row;
            }
        }
    }
    position
}

/// Drop every row above `header_row`. Returns how many were removed.
pub fn trim_prefix(grid: &mut Grid, header_row: usize) -> usize {
    let count = header_row.saturating_sub(1);
    grid.remove_leading_rows(count);
    count
}

/// Rename row 1 to the canonical header, adding the row to an empty grid.
pub fn rewrite_header(grid: &mut Grid) {
    if grid.row_count() == 0 {
        grid.push_row(RawRow::new());
    }
    for (i, name) in CANONICAL_HEADER.iter().enumerate() {
        grid.set_cell(1, i + 1, Cell::text(*name));
    }
}

/// Drop trailing rows with no inflow, outflow or date (disclaimers, blank lines).
pub fn trim_footer(grid: &mut Grid) -> usize {
    let mut len = grid.row_count();
    while len > 1
        && [INFLOW_COL, OUTFLOW_COL, DATE_COL]
            .iter()
            .all(|&col| grid.cell(len, col).is_empty())
    {
        len -= 1;
    }
    let removed = grid.row_count() - len;
    grid.truncate_rows(len);
    removed
}

/// Parses `D.M.YYYY` value dates into ISO form.
pub struct DateReformatter {
    dotted: Regex,
    iso: Regex,
}

impl DateReformatter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dotted: Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$")?,
            iso: Regex::new(r"^\d{4}-\d{2}-\d{2}$")?,
        })
    }

    /// `24.03.2019` -> `2019-03-24`. ISO input is returned as-is; anything
    /// else yields [`INVALID_DATE`].
    pub fn reformat(&self, raw: &str) -> String {
        let raw = raw.trim();
        if self.iso.is_match(raw) && NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok() {
            return raw.to_string();
        }
        self.dotted
            .captures(raw)
            .and_then(|caps| {
                let d: u32 = caps[1].parse().ok()?;
                let m: u32 = caps[2].parse().ok()?;
                let y: i32 = caps[3].parse().ok()?;
                NaiveDate::from_ymd_opt(y, m, d)
            })
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| INVALID_DATE.to_string())
    }

    /// Rewrite `col` of every row below the header. Returns the number of
    /// cells that became [`INVALID_DATE`].
    pub fn reformat_column(&self, grid: &mut Grid, col: usize) -> usize {
        let mut invalid = 0;
        for row in 2..=grid.row_count() {
            let formatted = self.reformat(&grid.cell(row, col).to_string());
            if formatted == INVALID_DATE {
                invalid += 1;
            }
            grid.set_cell(row, col, Cell::Text(formatted));
        }
        invalid
    }
}

/// Run the full normalization over a grid parsed with `profile`.
pub fn normalize(grid: &mut Grid, profile: &StatementProfile) -> Result<NormalizeSummary> {
    let dates = DateReformatter::new()?;

    absolute_outflows(grid, profile.outflow_column);
    clear_column(grid, profile.balance_column);
    grid.remove_column(profile.leading_column);

    let header_row = find_header(grid, &profile.header_markers);
    if header_row == 0 {
        warn!(profile = %profile.name, "no header marker found; keeping all rows");
    }
    let prefix_rows_removed = trim_prefix(grid, header_row);
    rewrite_header(grid);
    let footer_rows_removed = trim_footer(grid);
    let invalid_dates = dates.reformat_column(grid, DATE_COL);

    let summary = NormalizeSummary {
        header_row,
        prefix_rows_removed,
        footer_rows_removed,
        data_rows: grid.row_count().saturating_sub(1),
        invalid_dates,
    };
    debug!(?summary, "normalized statement grid");
    Ok(summary)
}
