//! Cryptographic functions for pass-enc-bkp
//!
//! Provides age (x25519) encryption of the finished backup, a keyring of
//! passphrase-protected identities, and zero-on-drop secret strings.

pub mod encryption;
pub mod keyring;
pub mod secure_memory;

pub use encryption::{
    decode_base64, decrypt_with_identity, decrypt_with_passphrase, encode_base64,
    encrypt_to_recipient, encrypt_with_passphrase, RecipientCipher,
};
pub use keyring::Keyring;
pub use secure_memory::SecureString;
