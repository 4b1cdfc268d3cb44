//! age public-key and passphrase encryption
//!
//! Backups are sealed for an x25519 recipient; secret identities in the
//! keyring are sealed with the user's passphrase (scrypt).

use std::io::{Read, Write};
use std::iter;

use age::x25519;
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{BackupError, BackupResult};

use super::SecureString;

/// Anything that can seal bytes for a named recipient
///
/// The keyring is the production implementation; tests substitute
/// failing or recording backends.
pub trait RecipientCipher {
    /// Encrypt `plaintext` so that only `recipient` can read it
    fn encrypt(&self, plaintext: &[u8], recipient: &str) -> BackupResult<Vec<u8>>;
}

/// Encrypt plaintext for a single x25519 recipient
pub fn encrypt_to_recipient(
    plaintext: &[u8],
    recipient: &x25519::Recipient,
) -> BackupResult<Vec<u8>> {
    let encryptor =
        age::Encryptor::with_recipients(iter::once(recipient as &dyn age::Recipient))
            .map_err(|e| BackupError::Encryption(format!("Failed to create encryptor: {}", e)))?;

    seal(encryptor, plaintext)
}

/// Encrypt plaintext with a passphrase
pub fn encrypt_with_passphrase(
    plaintext: &[u8],
    passphrase: &SecureString,
) -> BackupResult<Vec<u8>> {
    seal(
        age::Encryptor::with_user_passphrase(passphrase.to_secret()),
        plaintext,
    )
}

fn seal(encryptor: age::Encryptor, plaintext: &[u8]) -> BackupResult<Vec<u8>> {
    let mut ciphertext = Vec::with_capacity(plaintext.len() + 256);
    let mut writer = encryptor
        .wrap_output(&mut ciphertext)
        .map_err(|e| BackupError::Encryption(format!("Failed to start encryption: {}", e)))?;

    writer
        .write_all(plaintext)
        .map_err(|e| BackupError::Encryption(format!("Encryption failed: {}", e)))?;
    writer
        .finish()
        .map_err(|e| BackupError::Encryption(format!("Failed to finish encryption: {}", e)))?;

    Ok(ciphertext)
}

/// Decrypt ciphertext with an age identity
pub fn decrypt_with_identity(
    ciphertext: &[u8],
    identity: &dyn age::Identity,
) -> BackupResult<Vec<u8>> {
    let decryptor = age::Decryptor::new(ciphertext)
        .map_err(|e| BackupError::Encryption(format!("Invalid age header: {}", e)))?;

    let mut reader = decryptor
        .decrypt(iter::once(identity))
        .map_err(|e| BackupError::Encryption(format!("Decryption failed: {}", e)))?;

    let mut plaintext = Vec::new();
    reader
        .read_to_end(&mut plaintext)
        .map_err(|e| BackupError::Encryption(format!("Decryption failed: {}", e)))?;

    Ok(plaintext)
}

/// Decrypt passphrase-sealed ciphertext
pub fn decrypt_with_passphrase(
    ciphertext: &[u8],
    passphrase: &SecureString,
) -> BackupResult<Vec<u8>> {
    let identity = age::scrypt::Identity::new(passphrase.to_secret());
    decrypt_with_identity(ciphertext, &identity)
}

/// Encode ciphertext as standard base64 text
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard base64 text, ignoring surrounding whitespace
pub fn decode_base64(text: &str) -> BackupResult<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| BackupError::Encryption(format!("Invalid base64 encoding: {}", e)))
}
