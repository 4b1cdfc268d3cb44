//! Record sources for the backup
//!
//! Both sources are read through a trait so the pipeline can be driven
//! with in-memory or failing sources in tests.

pub mod pass_store;
pub mod password_safe;

use std::path::Path;

use crate::crypto::SecureString;
use crate::error::BackupResult;
use crate::models::{PassRecord, SafeRecord};

pub use pass_store::PassStore;
pub use password_safe::PasswordSafeExport;

/// Identity and passphrase used to decrypt the password store
#[derive(Debug, Clone, Copy)]
pub struct Credential<'a> {
    pub identity: &'a str,
    pub passphrase: &'a SecureString,
}

impl<'a> Credential<'a> {
    pub fn new(identity: &'a str, passphrase: &'a SecureString) -> Self {
        Self {
            identity,
            passphrase,
        }
    }
}

/// The encrypted password store
pub trait PassSource {
    /// Decrypt every entry under `prefix`, in store order
    fn read_records(
        &self,
        prefix: &str,
        credential: Credential<'_>,
    ) -> BackupResult<Vec<PassRecord>>;
}

/// The password-safe export
pub trait SafeSource {
    /// Parse every record in the export at `path`, in file order
    fn read_records(&self, path: &Path) -> BackupResult<Vec<SafeRecord>>;
}
