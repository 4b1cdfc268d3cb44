//! The backup pipeline
//!
//! One run moves strictly forward through
//! `ReadPassStore -> ReadSafeExport -> Serialize -> [Encrypt] -> Flush`
//! (configuration is resolved before the pipeline starts). Source failures
//! are logged and contribute zero records. Only output-file failures and,
//! unless plaintext fallback is enabled, encryption failures end the run.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use crate::config::EffectiveConfig;
use crate::crypto::{encode_base64, RecipientCipher};
use crate::error::{BackupError, BackupResult};
use crate::export::{serialize_records, OutputBuffer};
use crate::models::{PassRecord, SafeRecord};
use crate::sources::{Credential, PassSource, SafeSource};

/// Result of the encryption stage
#[derive(Debug)]
pub enum SealedOutput {
    /// No recipient configured; the buffer is the CSV
    Plaintext(OutputBuffer),
    /// The buffer holds ciphertext (raw or base64 text)
    Encrypted(OutputBuffer),
    /// A recipient was configured but encryption failed
    EncryptionFailed {
        plaintext: OutputBuffer,
        error: BackupError,
    },
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub pass_records: usize,
    pub safe_records: usize,
    pub bytes_written: usize,
    pub encrypted: bool,
}

impl RunSummary {
    /// Rows in the CSV before any encryption
    pub fn rows(&self) -> usize {
        self.pass_records + self.safe_records
    }
}

/// Read the password store, treating failure as zero records
pub fn read_pass_store(source: &dyn PassSource, config: &EffectiveConfig) -> Vec<PassRecord> {
    let credential = Credential::new(&config.decryption_identity, &config.passphrase);
    match source.read_records(&config.store_prefix, credential) {
        Ok(records) => records,
        Err(e) => {
            warn!(
                source = "password store",
                prefix = %config.store_prefix,
                error = %e,
                "cannot read password store records"
            );
            Vec::new()
        }
    }
}

/// Read the password-safe export if one is configured, treating failure as zero records
pub fn read_safe_export(source: &dyn SafeSource, config: &EffectiveConfig) -> Vec<SafeRecord> {
    let Some(path) = config.safe_export_path.as_deref() else {
        return Vec::new();
    };

    match source.read_records(path) {
        Ok(records) => records,
        Err(e) => {
            warn!(
                source = "password-safe export",
                path = %path.display(),
                error = %e,
                "cannot read password-safe records"
            );
            Vec::new()
        }
    }
}

/// Encrypt the buffer for the configured recipient, if any
pub fn seal_output(
    mut buffer: OutputBuffer,
    config: &EffectiveConfig,
    cipher: &dyn RecipientCipher,
) -> SealedOutput {
    if !config.encrypts() {
        return SealedOutput::Plaintext(buffer);
    }
    let recipient = config.encryption_recipient.as_deref().unwrap_or_default();

    match cipher.encrypt(buffer.as_bytes(), recipient) {
        Ok(ciphertext) => {
            if config.use_base64 {
                buffer.replace(encode_base64(&ciphertext).into_bytes());
            } else {
                buffer.replace(ciphertext);
            }
            info!(recipient, base64 = config.use_base64, "encrypted output");
            SealedOutput::Encrypted(buffer)
        }
        Err(error) => SealedOutput::EncryptionFailed {
            plaintext: buffer,
            error,
        },
    }
}

/// Create (or truncate) the output file
///
/// On Unix the file ends up readable by the owner only, including when an
/// existing file is reused.
pub fn create_output(path: &Path) -> BackupResult<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let file = options.open(path).map_err(|e| {
        BackupError::Output(format!("Cannot create {}: {}", path.display(), e))
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                BackupError::Output(format!("Cannot restrict {}: {}", path.display(), e))
            })?;
    }

    Ok(file)
}

/// Write the final buffer and flush it to disk
pub fn flush_output(file: &mut File, buffer: &OutputBuffer, path: &Path) -> BackupResult<usize> {
    file.write_all(buffer.as_bytes())
        .and_then(|_| file.flush())
        .and_then(|_| file.sync_all())
        .map_err(|e| BackupError::Output(format!("Cannot write {}: {}", path.display(), e)))?;

    Ok(buffer.len())
}

/// A configured backup run
pub struct Backup<'a> {
    config: &'a EffectiveConfig,
    pass_source: &'a dyn PassSource,
    safe_source: &'a dyn SafeSource,
    cipher: &'a dyn RecipientCipher,
}

impl<'a> Backup<'a> {
    pub fn new(
        config: &'a EffectiveConfig,
        pass_source: &'a dyn PassSource,
        safe_source: &'a dyn SafeSource,
        cipher: &'a dyn RecipientCipher,
    ) -> Self {
        Self {
            config,
            pass_source,
            safe_source,
            cipher,
        }
    }

    /// Run every stage once, in order
    pub fn run(&self) -> BackupResult<RunSummary> {
        let output_path = self.config.output_path.as_path();
        let mut file = create_output(output_path)?;

        let pass_records = read_pass_store(self.pass_source, self.config);
        let safe_records = read_safe_export(self.safe_source, self.config);

        let buffer = serialize_records(&pass_records, &safe_records)?;
        info!(
            pass_records = pass_records.len(),
            safe_records = safe_records.len(),
            bytes = buffer.len(),
            "serialized records"
        );

        let (buffer, encrypted) = match seal_output(buffer, self.config, self.cipher) {
            SealedOutput::Plaintext(buffer) => (buffer, false),
            SealedOutput::Encrypted(buffer) => (buffer, true),
            SealedOutput::EncryptionFailed { plaintext, error } => {
                if !self.config.allow_plaintext_fallback {
                    drop(file);
                    if let Err(e) = fs::remove_file(output_path) {
                        warn!(
                            path = %output_path.display(),
                            error = %e,
                            "cannot remove empty output file"
                        );
                    }
                    return Err(error);
                }
                warn!(error = %error, "cannot encrypt data, writing UNENCRYPTED output");
                (plaintext, false)
            }
        };

        let bytes_written = flush_output(&mut file, &buffer, output_path)?;
        info!(bytes = bytes_written, path = %output_path.display(), "wrote backup");

        Ok(RunSummary {
            pass_records: pass_records.len(),
            safe_records: safe_records.len(),
            bytes_written,
            encrypted,
        })
    }
}
