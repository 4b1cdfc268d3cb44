//! Reader for password-safe text exports
//!
//! The export is delimited text with a header row. Tab-delimited exports
//! (the password-safe application's own format, notes with `\n` escapes)
//! are detected from the header; anything else is read as comma-separated
//! CSV and taken verbatim. Columns are matched by header name, so column
//! order and extra columns don't matter.

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::error::{BackupError, BackupResult};
use crate::models::SafeRecord;

use super::SafeSource;

/// Positions of the recognised columns in the header
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    pub group_title: Option<usize>,
    pub title: Option<usize>,
    pub group: Option<usize>,
    pub login: Option<usize>,
    pub password: usize,
    pub url: Option<usize>,
    pub email: Option<usize>,
    pub notes: Option<usize>,
    pub version: Option<usize>,
    /// Notes carry newlines as a literal `\n` (tab-delimited exports)
    pub escaped_newlines: bool,
}

impl ColumnMapping {
    /// Build the mapping from a header row
    pub fn from_header(header: &StringRecord) -> BackupResult<Self> {
        let mut mapping = Self::default();
        let mut password = None;

        for (idx, name) in header.iter().enumerate() {
            let slot = match name.trim().to_ascii_lowercase().as_str() {
                "group/title" => &mut mapping.group_title,
                "title" | "name" => &mut mapping.title,
                "group" => &mut mapping.group,
                "username" | "user name" | "user" | "login" => &mut mapping.login,
                "password" => &mut password,
                "url" => &mut mapping.url,
                "email" | "e-mail" => &mut mapping.email,
                "notes" => &mut mapping.notes,
                "version" | "revision" => &mut mapping.version,
                _ => continue,
            };
            slot.get_or_insert(idx);
        }

        mapping.password = password.ok_or_else(|| {
            BackupError::SafeExport("Export header has no Password column".to_string())
        })?;
        Ok(mapping)
    }

    fn field<'r>(record: &'r StringRecord, idx: Option<usize>) -> &'r str {
        idx.and_then(|i| record.get(i)).unwrap_or("")
    }

    /// Convert one data row into a record
    pub fn parse_record(&self, record: &StringRecord, row_number: usize) -> SafeRecord {
        let mut safe = SafeRecord {
            login: Self::field(record, self.login).to_string(),
            password: Self::field(record, Some(self.password)).to_string(),
            url: Self::field(record, self.url).to_string(),
            email: Self::field(record, self.email).to_string(),
            notes: Self::field(record, self.notes).to_string(),
            title: Self::field(record, self.title).to_string(),
            group: Self::field(record, self.group).to_string(),
            version: 0,
        };

        if self.escaped_newlines {
            safe.notes = unescape_notes(&safe.notes);
        }

        let group_title = Self::field(record, self.group_title);
        if !group_title.is_empty() {
            match group_title.rsplit_once('.') {
                Some((group, title)) => {
                    safe.group = group.to_string();
                    safe.title = title.to_string();
                }
                None => safe.title = group_title.to_string(),
            }
        }

        let version = Self::field(record, self.version).trim();
        if !version.is_empty() {
            match version.parse() {
                Ok(v) => safe.version = v,
                Err(_) => warn!(
                    row = row_number,
                    entry = %safe.label(),
                    value = version,
                    "invalid version in password-safe export, using 0"
                ),
            }
        }

        safe
    }
}

/// The password-safe export reader
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordSafeExport;

impl PasswordSafeExport {
    pub fn new() -> Self {
        Self
    }

    /// Parse export text already in memory
    pub fn parse_str(&self, contents: &str) -> BackupResult<Vec<SafeRecord>> {
        let header_line = contents.lines().next().unwrap_or("");
        let delimiter = if header_line.contains('\t') { b'\t' } else { b',' };

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .quoting(delimiter == b',')
            .flexible(true)
            .from_reader(contents.as_bytes());

        let header = reader
            .headers()
            .map_err(|e| BackupError::SafeExport(format!("Cannot read header: {}", e)))?
            .clone();
        let mut mapping = ColumnMapping::from_header(&header)?;
        mapping.escaped_newlines = delimiter == b'\t';

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                BackupError::SafeExport(format!("Malformed row {}: {}", idx + 1, e))
            })?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let safe = mapping.parse_record(&record, idx + 1);
            debug!(row = idx + 1, entry = %safe.label(), "parsed password-safe record");
            records.push(safe);
        }

        Ok(records)
    }
}

impl SafeSource for PasswordSafeExport {
    fn read_records(&self, path: &Path) -> BackupResult<Vec<SafeRecord>> {
        let contents = fs::read_to_string(path).map_err(|e| {
            BackupError::SafeExport(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let records = self.parse_str(&contents)?;
        info!(count = records.len(), path = %path.display(), "read password-safe export");
        Ok(records)
    }
}

/// Notes are exported with newlines escaped as `\n`
fn unescape_notes(notes: &str) -> String {
    notes.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_tab_export() {
        let contents = "Group/Title\tUsername\tPassword\tURL\tEmail\tNotes\n\
                        Finance.Bank\tbob\thunter2\thttps://bank.example\tbob@example.com\tpin 1234\\nbranch 5\n";

        let records = PasswordSafeExport::new().parse_str(contents).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.group, "Finance");
        assert_eq!(record.title, "Bank");
        assert_eq!(record.login, "bob");
        assert_eq!(record.password, "hunter2");
        assert_eq!(record.url, "https://bank.example");
        assert_eq!(record.email, "bob@example.com");
        assert_eq!(record.notes, "pin 1234\nbranch 5");
        assert_eq!(record.version, 0);
    }

    #[test]
    fn test_parse_csv_export_any_column_order() {
        let contents = "version,notes,password,login,url,email\n\
                        3,\"multi\nline\",\"p,w\",carol,,carol@example.com\n\
                        ,,pw2,dave,https://d.example,\n";

        let records = PasswordSafeExport::new().parse_str(contents).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].login, "carol");
        assert_eq!(records[0].password, "p,w");
        assert_eq!(records[0].notes, "multi\nline");
        assert_eq!(records[0].version, 3);

        assert_eq!(records[1].login, "dave");
        assert_eq!(records[1].url, "https://d.example");
        assert_eq!(records[1].version, 0);
    }

    #[test]
    fn test_csv_notes_keep_literal_backslashes() {
        let contents = "login,password,notes\nx,y,C:\\new\\notes.txt\n";
        let records = PasswordSafeExport::new().parse_str(contents).unwrap();
        assert_eq!(records[0].notes, "C:\\new\\notes.txt");
    }

    #[test]
    fn test_order_preserved_and_blank_rows_skipped() {
        let contents = "Username,Password\nz,1\n,\na,2\n";
        let records = PasswordSafeExport::new().parse_str(contents).unwrap();
        let logins: Vec<&str> = records.iter().map(|r| r.login.as_str()).collect();
        assert_eq!(logins, vec!["z", "a"]);
    }

    #[test]
    fn test_invalid_version_defaults_to_zero() {
        let contents = "login,password,version\nx,y,abc\n";
        let records = PasswordSafeExport::new().parse_str(contents).unwrap();
        assert_eq!(records[0].version, 0);
    }

    #[test]
    fn test_short_rows_have_empty_fields() {
        let contents = "login\tpassword\tnotes\nx\ty\n";
        let records = PasswordSafeExport::new().parse_str(contents).unwrap();
        assert_eq!(records[0].password, "y");
        assert_eq!(records[0].notes, "");
    }

    #[test]
    fn test_missing_password_column() {
        let result = PasswordSafeExport::new().parse_str("login,url\nx,y\n");
        assert!(matches!(result, Err(BackupError::SafeExport(_))));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = PasswordSafeExport::new().read_records(&temp_dir.path().join("absent.txt"));
        assert!(matches!(result, Err(BackupError::SafeExport(_))));
    }

    #[test]
    fn test_read_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("safe.txt");
        fs::write(&path, "Username\tPassword\nbob\tpw\n").unwrap();

        let records = PasswordSafeExport::new().read_records(&path).unwrap();
        assert_eq!(records, vec![SafeRecord::new("bob", "pw")]);
    }
}
