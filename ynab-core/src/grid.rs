//! Position-addressed grid of cells parsed from a delimited statement export.
//!
//! Rows and columns are 1-based, matching how statement layouts are described
//! ("column 4 is the debit column"). Reads past the end of a row yield an
//! empty cell; writes past the end extend the row.

use rust_decimal::Decimal;
use std::fmt;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(Decimal),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Build a cell from raw field text. With `numeric`, text that parses as a
    /// decimal becomes a `Number`; anything else stays text.
    pub fn parse(raw: &str, numeric: bool) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        if numeric {
            if let Ok(n) = trimmed.parse::<Decimal>() {
                return Cell::Number(n);
            }
        }
        Cell::Text(trimmed.to_string())
    }

    pub fn text(s: impl Into<String>) -> Cell {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

/// One parsed line of the export
pub type RawRow = Vec<Cell>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    rows: Vec<RawRow>,
}

impl Grid {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    pub fn push_row(&mut self, row: RawRow) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Row `n` (1-based)
    pub fn row(&self, n: usize) -> Option<&RawRow> {
        n.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    /// Cell at (`row`, `col`), both 1-based. Missing cells read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.row(row)
            .and_then(|r| col.checked_sub(1).and_then(|c| r.get(c)))
            .unwrap_or(&EMPTY)
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: Cell) {
        let (Some(r), Some(c)) = (row.checked_sub(1), col.checked_sub(1)) else {
            return;
        };
        let Some(cells) = self.rows.get_mut(r) else {
            return;
        };
        if cells.len() <= c {
            cells.resize(c + 1, Cell::Empty);
        }
        cells[c] = value;
    }

    /// Replace every existing cell of column `col` with `f(cell)`.
    pub fn map_column(&mut self, col: usize, mut f: impl FnMut(&Cell) -> Cell) {
        let Some(c) = col.checked_sub(1) else {
            return;
        };
        for cells in &mut self.rows {
            if let Some(cell) = cells.get_mut(c) {
                *cell = f(cell);
            }
        }
    }

    /// Delete column `col`; later columns shift left by one.
    pub fn remove_column(&mut self, col: usize) {
        let Some(c) = col.checked_sub(1) else {
            return;
        };
        for cells in &mut self.rows {
            if c < cells.len() {
                cells.remove(c);
            }
        }
    }

    /// Delete the first `count` rows (clamped to the row count).
    pub fn remove_leading_rows(&mut self, count: usize) {
        let count = count.min(self.rows.len());
        self.rows.drain(..count);
    }

    pub fn truncate_rows(&mut self, len: usize) {
        self.rows.truncate(len);
    }
}
