//! CSV serialization of merged records
//!
//! Every row has six columns. Password-store rows are
//! `path, name, login, password, url, comment`; password-safe rows are
//! `login, password, url, email, notes, version`. No header row is written.
//! Quoting of embedded delimiters, quotes and newlines is left to the `csv`
//! writer.

use std::io::Write;

use csv::{Terminator, WriterBuilder};

use crate::error::{BackupError, BackupResult};
use crate::models::{PassRecord, SafeRecord};

use super::OutputBuffer;

/// Writes records as CSV rows
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        let writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(inner);
        Self { writer, rows: 0 }
    }

    /// Write one password-store entry
    pub fn write_pass_record(&mut self, record: &PassRecord) -> BackupResult<()> {
        let comment = record.comment();
        self.writer.write_record([
            record.full_path().as_str(),
            record.name(),
            record.login.as_str(),
            record.password.as_str(),
            record.url.as_str(),
            comment.as_str(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    /// Write one password-safe record
    pub fn write_safe_record(&mut self, record: &SafeRecord) -> BackupResult<()> {
        let version = record.version.to_string();
        self.writer.write_record([
            &record.login,
            &record.password,
            &record.url,
            &record.email,
            &record.notes,
            &version,
        ])?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> BackupResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| BackupError::Csv(format!("Failed to flush CSV: {}", e)))
    }
}

/// Serialize password-store records followed by password-safe records
///
/// Order is preserved exactly; nothing is sorted or deduplicated.
pub fn serialize_records(
    pass_records: &[PassRecord],
    safe_records: &[SafeRecord],
) -> BackupResult<OutputBuffer> {
    let mut writer = RecordWriter::new(OutputBuffer::new());

    for record in pass_records {
        writer.write_pass_record(record)?;
    }
    for record in safe_records {
        writer.write_safe_record(record)?;
    }

    writer.into_inner()
}
