use serde::{Deserialize, Serialize};

/// Text encoding of a raw export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    /// ISO-8859-1: every byte is the code point of the same value
    Latin1,
    Utf8,
}

/// First-cell text of the row that starts the transaction table (French export)
pub const MARKER_FR: &str = "Texte de notification";
/// English export
pub const MARKER_EN: &str = "Notification text";
/// German export
pub const MARKER_DE: &str = "Avisierungstext";

/// Value written in place of a date that doesn't parse
pub const INVALID_DATE: &str = "Invalid date";

/// Layout of a bank's CSV export. Column numbers are 1-based and refer to the
/// raw export, before the leading column is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementProfile {
    pub name: String,
    pub encoding: TextEncoding,
    pub delimiter: u8,
    /// Columns coerced to numbers while parsing
    pub numeric_columns: Vec<usize>,
    /// Debit column; negative amounts become positive outflows
    pub outflow_column: usize,
    /// Running balance, blanked out
    pub balance_column: usize,
    /// Booking-date column, dropped entirely
    pub leading_column: usize,
    pub header_markers: Vec<String>,
}

impl StatementProfile {
    /// Postal bank export:
    /// `Date;Texte de notification;Crédit;Débit;Valeur;Solde`
    pub fn postal() -> Self {
        Self {
            name: "postal".to_string(),
            encoding: TextEncoding::Latin1,
            delimiter: b';',
            numeric_columns: vec![3, 4],
            outflow_column: 4,
            balance_column: 6,
            leading_column: 1,
            header_markers: vec![
                MARKER_FR.to_string(),
                MARKER_EN.to_string(),
                MARKER_DE.to_string(),
            ],
        }
    }

    pub fn is_numeric(&self, col: usize) -> bool {
        self.numeric_columns.contains(&col)
    }
}
