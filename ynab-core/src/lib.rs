//! ynab-core: canonical ledger schema, statement grid model and the ledger writer

pub mod grid;
pub mod ledger;
pub mod record;

pub use grid::{Cell, Grid, RawRow};
pub use ledger::{grid_to_csv, records_to_csv, unquote_leading_field, write_grid, write_records};
pub use record::{CanonicalRecord, Flow, CANONICAL_HEADER, format_amount, sanitize_memo};
