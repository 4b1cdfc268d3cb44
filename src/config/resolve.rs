//! Effective configuration for one run
//!
//! Merges command-line flags, the configuration file and built-in defaults
//! into an immutable [`EffectiveConfig`]. An explicitly given flag always
//! wins over the file, and the file wins over defaults.

use std::path::PathBuf;

use tracing::debug;

use super::paths::BackupPaths;
use super::settings::ConfigFile;
use crate::crypto::SecureString;
use crate::error::{BackupError, BackupResult};

/// Store entry point used when neither flag nor file sets one
pub const DEFAULT_PREFIX: &str = "/";

/// Values given on the command line
///
/// `None` means the flag was not given; boolean flags can only switch a
/// setting on.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub email: Option<String>,
    pub prefix: Option<String>,
    pub password_safe: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub recipient: Option<String>,
    pub base64: bool,
    pub store_dir: Option<PathBuf>,
    pub keyring_dir: Option<PathBuf>,
    pub allow_plaintext_fallback: bool,
}

/// Source of the passphrase when the configuration file has none
pub trait PassphrasePrompt {
    /// Ask for a passphrase; failing to read one is fatal for the run
    fn prompt(&self, message: &str) -> BackupResult<SecureString>;
}

/// Reads the passphrase from the controlling terminal without echo
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl PassphrasePrompt for TerminalPrompt {
    fn prompt(&self, message: &str) -> BackupResult<SecureString> {
        rpassword::prompt_password(message)
            .map(SecureString::from)
            .map_err(|e| BackupError::Passphrase(format!("Failed to read passphrase: {}", e)))
    }
}

/// The resolved settings for one run
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    /// Identity whose secret key decrypts the store
    pub decryption_identity: String,
    /// Passphrase for that secret key
    pub passphrase: SecureString,
    /// Directory inside the store to export
    pub store_prefix: String,
    /// Password-safe export to merge, if any
    pub safe_export_path: Option<PathBuf>,
    /// Where the backup is written
    pub output_path: PathBuf,
    /// Recipient to encrypt the backup for, if any
    pub encryption_recipient: Option<String>,
    /// Base64-encode the ciphertext
    pub use_base64: bool,
    /// Password store root
    pub store_dir: PathBuf,
    /// Keyring directory
    pub keyring_dir: PathBuf,
    /// Write plaintext if encryption fails instead of aborting
    pub allow_plaintext_fallback: bool,
}

impl EffectiveConfig {
    /// Merge flags, file and defaults, prompting for the passphrase if needed
    pub fn resolve(
        cli: CliOverrides,
        file: ConfigFile,
        defaults: &BackupPaths,
        prompt: &dyn PassphrasePrompt,
    ) -> BackupResult<Self> {
        let passphrase = match file.gpg_password.filter(|p| !p.is_empty()) {
            Some(passphrase) => {
                debug!("using passphrase from configuration file");
                passphrase
            }
            None => prompt.prompt("Input the passphrase: ")?,
        };

        let config = Self {
            decryption_identity: pick(text(cli.email), text(file.gpg_id)).unwrap_or_default(),
            passphrase,
            store_prefix: pick(text(cli.prefix), text(file.prefix))
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            safe_export_path: pick(path(cli.password_safe), path(file.password_safe_file)),
            output_path: pick(path(cli.output), path(file.output)).unwrap_or_default(),
            encryption_recipient: pick(text(cli.recipient), text(file.enc_gpg_id)),
            use_base64: cli.base64 || file.base64.unwrap_or(false),
            store_dir: pick(path(cli.store_dir), path(file.store_dir))
                .unwrap_or_else(|| defaults.store_dir().to_path_buf()),
            keyring_dir: pick(path(cli.keyring_dir), path(file.keyring_dir))
                .unwrap_or_else(|| defaults.keyring_dir().to_path_buf()),
            allow_plaintext_fallback: cli.allow_plaintext_fallback
                || file.allow_plaintext_fallback.unwrap_or(false),
        };

        debug!(
            identity = %config.decryption_identity,
            prefix = %config.store_prefix,
            output = %config.output_path.display(),
            recipient = config.encryption_recipient.as_deref().unwrap_or(""),
            base64 = config.use_base64,
            "resolved configuration"
        );

        Ok(config)
    }

    /// Whether the output is to be encrypted
    pub fn encrypts(&self) -> bool {
        self.encryption_recipient
            .as_deref()
            .is_some_and(|r| !r.is_empty())
    }
}

fn pick<T>(flag: Option<T>, file: Option<T>) -> Option<T> {
    flag.or(file)
}

fn text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn path(value: Option<PathBuf>) -> Option<PathBuf> {
    value.filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Prompt that answers with a fixed passphrase and counts calls
    struct FixedPrompt {
        answer: &'static str,
        calls: Cell<usize>,
    }

    impl FixedPrompt {
        fn new(answer: &'static str) -> Self {
            Self {
                answer,
                calls: Cell::new(0),
            }
        }
    }

    impl PassphrasePrompt for FixedPrompt {
        fn prompt(&self, _message: &str) -> BackupResult<SecureString> {
            self.calls.set(self.calls.get() + 1);
            Ok(SecureString::new(self.answer))
        }
    }

    struct NoTerminal;

    impl PassphrasePrompt for NoTerminal {
        fn prompt(&self, _message: &str) -> BackupResult<SecureString> {
            Err(BackupError::Passphrase("no terminal".into()))
        }
    }

    fn defaults() -> BackupPaths {
        BackupPaths::with_dirs("/default/store", "/default/keyring")
    }

    #[test]
    fn test_flag_overrides_file() {
        let cli = CliOverrides {
            prefix: Some("/bar".into()),
            ..Default::default()
        };
        let file = ConfigFile {
            prefix: Some("/foo".into()),
            gpg_password: Some("pw".into()),
            ..Default::default()
        };

        let config = EffectiveConfig::resolve(cli, file, &defaults(), &NoTerminal).unwrap();
        assert_eq!(config.store_prefix, "/bar");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = ConfigFile {
            gpg_id: Some("alice@example.com".into()),
            gpg_password: Some("pw".into()),
            prefix: Some("/foo".into()),
            output: Some("out.csv".into()),
            enc_gpg_id: Some("bob@example.com".into()),
            store_dir: Some("/custom/store".into()),
            ..Default::default()
        };

        let config =
            EffectiveConfig::resolve(CliOverrides::default(), file, &defaults(), &NoTerminal)
                .unwrap();
        assert_eq!(config.decryption_identity, "alice@example.com");
        assert_eq!(config.store_prefix, "/foo");
        assert_eq!(config.output_path, PathBuf::from("out.csv"));
        assert_eq!(config.encryption_recipient.as_deref(), Some("bob@example.com"));
        assert_eq!(config.store_dir, PathBuf::from("/custom/store"));
        assert_eq!(config.keyring_dir, PathBuf::from("/default/keyring"));
        assert!(config.encrypts());
    }

    #[test]
    fn test_missing_file_uses_flags_and_defaults() {
        let cli = CliOverrides {
            email: Some("alice@example.com".into()),
            output: Some("backup.csv".into()),
            ..Default::default()
        };
        let prompt = FixedPrompt::new("typed");

        let config =
            EffectiveConfig::resolve(cli, ConfigFile::default(), &defaults(), &prompt).unwrap();
        assert_eq!(config.decryption_identity, "alice@example.com");
        assert_eq!(config.store_prefix, DEFAULT_PREFIX);
        assert_eq!(config.output_path, PathBuf::from("backup.csv"));
        assert_eq!(config.safe_export_path, None);
        assert_eq!(config.encryption_recipient, None);
        assert!(!config.use_base64);
        assert!(!config.allow_plaintext_fallback);
        assert_eq!(config.store_dir, PathBuf::from("/default/store"));
        assert_eq!(config.passphrase.as_str(), "typed");
        assert_eq!(prompt.calls.get(), 1);
    }

    #[test]
    fn test_file_passphrase_skips_prompt() {
        let file = ConfigFile {
            gpg_password: Some("from-file".into()),
            ..Default::default()
        };
        let prompt = FixedPrompt::new("typed");

        let config =
            EffectiveConfig::resolve(CliOverrides::default(), file, &defaults(), &prompt).unwrap();
        assert_eq!(config.passphrase.as_str(), "from-file");
        assert_eq!(prompt.calls.get(), 0);
    }

    #[test]
    fn test_empty_file_passphrase_prompts() {
        let file = ConfigFile {
            gpg_password: Some("".into()),
            ..Default::default()
        };
        let prompt = FixedPrompt::new("typed");

        let config =
            EffectiveConfig::resolve(CliOverrides::default(), file, &defaults(), &prompt).unwrap();
        assert_eq!(config.passphrase.as_str(), "typed");
    }

    #[test]
    fn test_prompt_failure_is_fatal() {
        let result = EffectiveConfig::resolve(
            CliOverrides::default(),
            ConfigFile::default(),
            &defaults(),
            &NoTerminal,
        );
        assert!(matches!(result, Err(BackupError::Passphrase(_))));
    }

    #[test]
    fn test_base64_is_or_of_flag_and_file() {
        let file = ConfigFile {
            gpg_password: Some("pw".into()),
            base64: Some(true),
            ..Default::default()
        };
        let config =
            EffectiveConfig::resolve(CliOverrides::default(), file, &defaults(), &NoTerminal)
                .unwrap();
        assert!(config.use_base64);

        let cli = CliOverrides {
            base64: true,
            ..Default::default()
        };
        let file = ConfigFile {
            gpg_password: Some("pw".into()),
            base64: Some(false),
            ..Default::default()
        };
        let config = EffectiveConfig::resolve(cli, file, &defaults(), &NoTerminal).unwrap();
        assert!(config.use_base64);
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let cli = CliOverrides {
            recipient: Some("".into()),
            password_safe: Some(PathBuf::new()),
            ..Default::default()
        };
        let file = ConfigFile {
            gpg_password: Some("pw".into()),
            enc_gpg_id: Some("bob@example.com".into()),
            password_safe_file: Some("safe.txt".into()),
            ..Default::default()
        };

        let config = EffectiveConfig::resolve(cli, file, &defaults(), &NoTerminal).unwrap();
        assert_eq!(config.encryption_recipient.as_deref(), Some("bob@example.com"));
        assert_eq!(config.safe_export_path, Some(PathBuf::from("safe.txt")));
    }
}
