//! Custom error types for pass-enc-bkp
//!
//! This module defines the error hierarchy for the backup pipeline using
//! thiserror for ergonomic error definitions.

use thiserror::Error;

/// The main error type for backup operations
#[derive(Error, Debug)]
pub enum BackupError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The passphrase could not be obtained
    #[error("Passphrase error: {0}")]
    Passphrase(String),

    /// Key lookup or unlock failures
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// Password store read/decrypt failures
    #[error("Password store error: {0}")]
    Store(String),

    /// Password-safe export read failures
    #[error("Password-safe export error: {0}")]
    SafeExport(String),

    /// CSV serialization/deserialization errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Encryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Output file errors
    #[error("Output error: {0}")]
    Output(String),

    /// A named key was not present in the keyring
    #[error("{kind} key not found for '{identity}'")]
    KeyNotFound {
        kind: &'static str,
        identity: String,
    },
}

impl BackupError {
    /// Create a "not found" error for a recipient public key
    pub fn recipient_not_found(identity: impl Into<String>) -> Self {
        Self::KeyNotFound {
            kind: "Public",
            identity: identity.into(),
        }
    }

    /// Create a "not found" error for a secret identity
    pub fn identity_not_found(identity: impl Into<String>) -> Self {
        Self::KeyNotFound {
            kind: "Secret",
            identity: identity.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for BackupError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for backup operations
pub type BackupResult<T> = Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackupError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = BackupError::recipient_not_found("bob@example.com");
        assert_eq!(
            err.to_string(),
            "Public key not found for 'bob@example.com'"
        );
        assert!(err.is_not_found());
        assert!(!BackupError::Store("x".into()).is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BackupError = io_err.into();
        assert!(matches!(err, BackupError::Io(_)));
    }
}
