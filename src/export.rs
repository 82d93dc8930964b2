//! Output artifacts written after all accounts have been processed.
//!
//! Both exporters only read the records. Each one opens, writes and flushes
//! its own file, so a failure in one never touches the other.

use crate::account::AccountRecord;
use crate::diagnostics::Diagnostics;
use crate::error::{BatchError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use uuid::Uuid;

/// One successfully registered account in the token export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportEntry {
    /// Endpoint the token was issued by.
    pub link: String,

    /// Issued application token.
    pub token: String,

    /// Random identifier minted for this export only.
    pub subject_id: String,
}

impl ExportEntry {
    /// Builds an entry for a succeeded record with a fresh subject id.
    fn mint(record: &AccountRecord) -> Self {
        ExportEntry {
            link: record.endpoint.clone(),
            token: record.token().to_string(),
            subject_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Maps the succeeded records, in input order, to export entries.
///
/// Every call mints new subject ids.
pub fn export_entries(records: &[AccountRecord]) -> Vec<ExportEntry> {
    records
        .iter()
        .filter(|r| r.succeeded())
        .map(ExportEntry::mint)
        .collect()
}

/// Serializes entries as a compact JSON array.
pub fn write_token_export<W: Write>(
    entries: &[ExportEntry],
    writer: W,
) -> serde_json::Result<()> {
    serde_json::to_writer(writer, entries)
}

/// Formats the report line for one processed record.
pub fn report_line(record: &AccountRecord) -> String {
    if record.succeeded() {
        format!("SUCCESS {} ", record.endpoint)
    } else {
        format!("FAIL    {} ({})", record.endpoint, record.failure_reason())
    }
}

/// Writes one report line per record, each terminated by `\n`.
pub fn write_report<W: Write>(records: &[AccountRecord], mut writer: W) -> io::Result<()> {
    for record in records {
        writeln!(writer, "{}", report_line(record))?;
    }
    writer.flush()
}

/// Writes the token export for all succeeded records to `path`,
/// replacing any existing file.
///
/// Returns the number of exported entries. No successes still yields `[]`.
pub fn export_tokens(
    records: &[AccountRecord],
    path: &Path,
    diagnostics: &dyn Diagnostics,
) -> Result<usize> {
    diagnostics.info(&format!("saving token export to file '{}'", path.display()));
    let entries = export_entries(records);

    let write_err = |source: io::Error| BatchError::ExportWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(write_err)?);
    write_token_export(&entries, &mut writer).map_err(|source| {
        if source.is_io() {
            BatchError::ExportWrite {
                path: path.to_path_buf(),
                source: source.into(),
            }
        } else {
            BatchError::ExportEncode {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    writer.flush().map_err(write_err)?;

    Ok(entries.len())
}

/// Writes the success/failure report for every record to `path`,
/// replacing any existing file.
pub fn export_report(
    records: &[AccountRecord],
    path: &Path,
    diagnostics: &dyn Diagnostics,
) -> Result<()> {
    diagnostics.info(&format!("saving report to file '{}'", path.display()));

    let write_err = |source: io::Error| BatchError::ExportWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    write_report(records, BufWriter::new(file)).map_err(write_err)
}
