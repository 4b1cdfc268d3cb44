//! On-disk keyring of age keys addressed by identity
//!
//! Layout of the keyring directory:
//!
//! - `<identity>.pub`: the x25519 recipient (`age1...`) used to encrypt for
//!   that identity
//! - `<identity>.key`: the x25519 secret key, itself age-encrypted with the
//!   owner's passphrase
//!
//! Identities are email-like strings such as `alice@example.com`.

use std::fs;
use std::path::PathBuf;

use age::secrecy::ExposeSecret;
use age::x25519;
use tracing::debug;

use crate::error::{BackupError, BackupResult};

use super::encryption::{
    decrypt_with_passphrase, encrypt_to_recipient, encrypt_with_passphrase, RecipientCipher,
};
use super::SecureString;

const PUBLIC_EXT: &str = "pub";
const SECRET_EXT: &str = "key";

/// A directory of public recipients and passphrase-protected identities
#[derive(Debug, Clone)]
pub struct Keyring {
    dir: PathBuf,
}

impl Keyring {
    /// Open a keyring rooted at `dir` (the directory need not exist yet)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, identity: &str, ext: &str) -> BackupResult<PathBuf> {
        validate_identity(identity)?;
        Ok(self.dir.join(format!("{}.{}", identity, ext)))
    }

    /// Look up the public recipient for `identity`
    pub fn recipient(&self, identity: &str) -> BackupResult<x25519::Recipient> {
        let path = self.key_path(identity, PUBLIC_EXT)?;
        if !path.exists() {
            return Err(BackupError::recipient_not_found(identity));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            BackupError::Keyring(format!("Failed to read {}: {}", path.display(), e))
        })?;

        // Allow comment lines, as age-keygen writes them
        let line = contents
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'))
            .ok_or_else(|| {
                BackupError::Keyring(format!("No recipient in {}", path.display()))
            })?;

        line.parse::<x25519::Recipient>().map_err(|e| {
            BackupError::Keyring(format!("Invalid recipient in {}: {}", path.display(), e))
        })
    }

    /// Decrypt the secret identity for `identity` with its passphrase
    pub fn unlock_identity(
        &self,
        identity: &str,
        passphrase: &SecureString,
    ) -> BackupResult<x25519::Identity> {
        let path = self.key_path(identity, SECRET_EXT)?;
        if !path.exists() {
            return Err(BackupError::identity_not_found(identity));
        }

        let sealed = fs::read(&path).map_err(|e| {
            BackupError::Keyring(format!("Failed to read {}: {}", path.display(), e))
        })?;

        debug!(identity, "unlocking secret key");
        let plain = SecureString::new(
            String::from_utf8(decrypt_with_passphrase(&sealed, passphrase).map_err(|_| {
                BackupError::Keyring(format!(
                    "Cannot unlock secret key for '{}': wrong passphrase or corrupted key",
                    identity
                ))
            })?)
            .map_err(|_| BackupError::Keyring("Secret key is not valid UTF-8".to_string()))?,
        );

        let key = plain
            .lines()
            .map(str::trim)
            .find(|l| l.starts_with("AGE-SECRET-KEY-"))
            .ok_or_else(|| BackupError::Keyring(format!("No secret key in {}", path.display())))?
            .parse::<x25519::Identity>()
            .map_err(|e| BackupError::Keyring(format!("Invalid secret key: {}", e)))?;

        Ok(key)
    }

    /// Generate a fresh key pair for `identity` and store it in the keyring
    ///
    /// Provisioning helper for new keyrings and test fixtures; a backup run
    /// only reads keys. Refuses to overwrite an existing secret key.
    pub fn generate(
        &self,
        identity: &str,
        passphrase: &SecureString,
    ) -> BackupResult<x25519::Recipient> {
        let secret_path = self.key_path(identity, SECRET_EXT)?;
        let public_path = self.key_path(identity, PUBLIC_EXT)?;
        if secret_path.exists() {
            return Err(BackupError::Keyring(format!(
                "Secret key already exists: {}",
                secret_path.display()
            )));
        }

        fs::create_dir_all(&self.dir).map_err(|e| {
            BackupError::Keyring(format!(
                "Failed to create keyring {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let key = x25519::Identity::generate();
        let recipient = key.to_public();
        let secret = SecureString::new(key.to_string().expose_secret());
        let sealed = encrypt_with_passphrase(secret.as_bytes(), passphrase)?;

        fs::write(&secret_path, sealed)?;
        fs::write(&public_path, format!("{}\n", recipient))?;

        Ok(recipient)
    }
}

impl RecipientCipher for Keyring {
    fn encrypt(&self, plaintext: &[u8], recipient: &str) -> BackupResult<Vec<u8>> {
        let key = self.recipient(recipient)?;
        encrypt_to_recipient(plaintext, &key)
    }
}

/// Identities name files, so they must not contain path syntax
fn validate_identity(identity: &str) -> BackupResult<()> {
    if identity.trim().is_empty() {
        return Err(BackupError::Keyring("Empty key identity".to_string()));
    }
    if identity.contains(['/', '\\']) || identity.starts_with('.') {
        return Err(BackupError::Keyring(format!(
            "Invalid key identity: '{}'",
            identity
        )));
    }
    Ok(())
}
