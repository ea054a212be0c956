//! ynab-ingest: bank export preprocessing, tabular normalization and file conversion.

pub mod normalize;
pub mod parsers;
pub mod preprocess;
pub mod types;

pub use normalize::{normalize, NormalizeSummary};
pub use parsers::postal::{convert_export, parse_grid};
pub use preprocess::preprocess_file;
pub use types::{StatementProfile, TextEncoding};
