//! Canonical ledger record accepted by the budgeting app import
//! (Memo, Inflow, Outflow, Date).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Header row of every file we write
pub const CANONICAL_HEADER: [&str; 4] = ["Memo", "Inflow", "Outflow", "Date"];

/// Direction of money movement for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    Inflow,
    Outflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(rename = "Memo")]
    pub memo: String,
    /// Empty unless money came in
    #[serde(rename = "Inflow")]
    pub inflow: String,
    /// Empty unless money went out; never negative
    #[serde(rename = "Outflow")]
    pub outflow: String,
    /// YYYY-MM-DD
    #[serde(rename = "Date")]
    pub date: String,
}

impl CanonicalRecord {
    /// Build a record; the amount's sign is dropped, `flow` decides the column.
    pub fn new(memo: &str, flow: Flow, amount: Decimal, date: NaiveDate) -> Self {
        let amount = format_amount(amount);
        let (inflow, outflow) = match flow {
            Flow::Inflow => (amount, String::new()),
            Flow::Outflow => (String::new(), amount),
        };
        Self {
            memo: sanitize_memo(memo),
            inflow,
            outflow,
            date: date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Absolute value in shortest form: `-40.00` -> `40`, `1.20` -> `1.2`.
pub fn format_amount(amount: Decimal) -> String {
    amount.abs().normalize().to_string()
}

/// Drop commas and line breaks, then collapse runs of whitespace.
pub fn sanitize_memo(memo: &str) -> String {
    memo.replace([',', '\r', '\n'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 3, 24).unwrap()
    }

    #[test]
    fn test_outflow_is_positive() {
        let r = CanonicalRecord::new("Rent", Flow::Outflow, "-40.00".parse().unwrap(), day());
        assert_eq!(r.outflow, "40");
        assert_eq!(r.inflow, "");
        assert_eq!(r.date, "2019-03-24");
    }

    #[test]
    fn test_inflow_column() {
        let r = CanonicalRecord::new("Salary", Flow::Inflow, "2500.50".parse().unwrap(), day());
        assert_eq!(r.inflow, "2500.5");
        assert_eq!(r.outflow, "");
    }

    #[test]
    fn test_sanitize_memo() {
        assert_eq!(sanitize_memo("Rent, March"), "Rent March");
        assert_eq!(sanitize_memo("line one\r\nline,two"), "line one line two");
        assert_eq!(sanitize_memo("  plain  "), "plain");
    }
}
