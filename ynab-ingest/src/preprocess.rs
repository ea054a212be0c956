//! Raw text cleanup run before the export is split into columns.
//!
//! Bank exports carry CRLF line endings and free-text commas that would
//! otherwise produce spurious fields further down the line.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::types::TextEncoding;

pub fn decode(bytes: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        TextEncoding::Utf8 => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Strip trailing carriage returns from every line and replace commas with a space.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&line.trim_end_matches('\r').replace(',', " "));
    }
    out
}

/// `exports/statement.csv` -> `exports/statementLatin1.csv`
pub fn cleaned_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}Latin1.csv"))
}

/// Decode, clean and write the export next to itself. Returns the cleaned path.
pub async fn preprocess_file(input: &Path, encoding: TextEncoding) -> Result<PathBuf> {
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("read {}", input.display()))?;

    let cleaned = clean_text(&decode(&bytes, encoding));
    let out = cleaned_path(input);
    tokio::fs::write(&out, cleaned)
        .await
        .with_context(|| format!("write {}", out.display()))?;

    debug!(input = %input.display(), cleaned = %out.display(), "preprocessed export");
    Ok(out)
}
