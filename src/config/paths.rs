//! Default locations for pass-enc-bkp
//!
//! ## Path Resolution Order
//!
//! Password store:
//! 1. `PASSAGE_DIR` environment variable (if set)
//! 2. `~/.passage/store`
//!
//! Keyring:
//! 1. `PASS_ENC_BKP_KEYRING` environment variable (if set)
//! 2. Unix: `$XDG_CONFIG_HOME/pass-enc-bkp/keyring` or `~/.config/pass-enc-bkp/keyring`
//! 3. Windows: `%APPDATA%\pass-enc-bkp\config\keyring`
//!
//! Both can be overridden by the configuration file or command-line flags.

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};

use crate::error::BackupError;

/// Environment variable naming the password store root
pub const STORE_DIR_ENV: &str = "PASSAGE_DIR";

/// Environment variable naming the keyring directory
pub const KEYRING_DIR_ENV: &str = "PASS_ENC_BKP_KEYRING";

/// Default locations used when neither config nor flags name them
#[derive(Debug, Clone)]
pub struct BackupPaths {
    store_dir: PathBuf,
    keyring_dir: PathBuf,
}

impl BackupPaths {
    /// Resolve defaults from the environment and platform directories
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined and no
    /// environment override is set.
    pub fn new() -> Result<Self, BackupError> {
        let store_dir = match std::env::var_os(STORE_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(".passage").join("store"))
                .ok_or_else(|| {
                    BackupError::Config("Could not determine home directory".into())
                })?,
        };

        let keyring_dir = match std::env::var_os(KEYRING_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from("", "", "pass-enc-bkp")
                .map(|dirs| dirs.config_dir().join("keyring"))
                .ok_or_else(|| {
                    BackupError::Config("Could not determine config directory".into())
                })?,
        };

        Ok(Self {
            store_dir,
            keyring_dir,
        })
    }

    /// Create BackupPaths with explicit directories (useful for testing)
    pub fn with_dirs(store_dir: impl Into<PathBuf>, keyring_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
            keyring_dir: keyring_dir.into(),
        }
    }

    /// Root of the encrypted password store
    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// Directory holding `<identity>.pub` and `<identity>.key` files
    pub fn keyring_dir(&self) -> &Path {
        &self.keyring_dir
    }
}
