//! Configuration file for pass-enc-bkp
//!
//! Key/value settings mirroring the command-line flags. The file is TOML;
//! a file whose first non-blank character is `{` is read as JSON instead.
//!
//! ```toml
//! gpg_id = "alice@example.com"
//! gpg_password = "correct horse battery staple"
//! prefix = "/web"
//! password_safe_file = "safe-export.txt"
//! output = "backup.csv"
//! enc_gpg_id = "offsite@example.com"
//! base64 = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::crypto::SecureString;
use crate::error::{BackupError, BackupResult};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "PassEncBkp.conf";

/// Settings read from the configuration file
///
/// Every field is optional; empty strings count as unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Identity whose secret key decrypts the password store
    #[serde(alias = "email")]
    pub gpg_id: Option<String>,

    /// Passphrase protecting that secret key
    #[serde(alias = "passphrase", deserialize_with = "deserialize_secret")]
    pub gpg_password: Option<SecureString>,

    /// Store entry point
    pub prefix: Option<String>,

    /// Password-safe export to merge
    #[serde(alias = "password_safe")]
    pub password_safe_file: Option<PathBuf>,

    /// Output file
    pub output: Option<PathBuf>,

    /// Recipient to encrypt the output for
    #[serde(alias = "recipient")]
    pub enc_gpg_id: Option<String>,

    /// Base64-encode encrypted output
    pub base64: Option<bool>,

    /// Password store root
    pub store_dir: Option<PathBuf>,

    /// Keyring directory
    pub keyring_dir: Option<PathBuf>,

    /// Write plaintext when encryption fails instead of aborting
    pub allow_plaintext_fallback: Option<bool>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecureString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(SecureString::from))
}

impl ConfigFile {
    /// Parse configuration text (TOML, or JSON when it starts with `{`)
    pub fn parse(contents: &str) -> BackupResult<Self> {
        if contents.trim_start().starts_with('{') {
            serde_json::from_str(contents)
                .map_err(|e| BackupError::Config(format!("Invalid JSON: {}", e)))
        } else {
            toml::from_str(contents)
                .map_err(|e| BackupError::Config(format!("Invalid TOML: {}", e)))
        }
    }

    /// Load a configuration file
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load(path: &Path) -> BackupResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            BackupError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&contents)
            .map(Some)
            .map_err(|e| BackupError::Config(format!("Cannot parse {}: {}", path.display(), e)))
    }

    /// Load a configuration file, treating every failure as "no file"
    ///
    /// A missing file is normal; unreadable or malformed files are logged as
    /// warnings and the run proceeds on flags and defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(Some(config)) => {
                info!(path = %path.display(), "loaded configuration");
                config
            }
            Ok(None) => {
                debug!(path = %path.display(), "no configuration file");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring configuration file");
                Self::default()
            }
        }
    }
}
