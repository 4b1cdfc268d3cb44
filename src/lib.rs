//! pass-enc-bkp - merge password sources into one encrypted backup
//!
//! This library provides the pipeline behind the `passencbkp` binary: it
//! decrypts an age-encrypted password store, reads a password-safe text
//! export, writes both as one CSV and optionally encrypts the result for a
//! recipient from the keyring.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration file, defaults and flag precedence
//! - `error`: Custom error types
//! - `models`: The two record shapes
//! - `crypto`: age encryption, keyring and secret strings
//! - `sources`: Password store and password-safe readers
//! - `export`: CSV serialization into the output buffer
//! - `pipeline`: The stages of one run
//! - `cli`: Command-line flags
//!
//! # Example
//!
//! ```rust,ignore
//! use passbkp::config::{BackupPaths, ConfigFile, EffectiveConfig, TerminalPrompt};
//! use passbkp::crypto::Keyring;
//! use passbkp::pipeline::Backup;
//! use passbkp::sources::{PassStore, PasswordSafeExport};
//!
//! let file = ConfigFile::load_or_default("PassEncBkp.conf".as_ref());
//! let config = EffectiveConfig::resolve(overrides, file, &BackupPaths::new()?, &TerminalPrompt)?;
//! let keyring = Keyring::new(&config.keyring_dir);
//! let store = PassStore::new(&config.store_dir, keyring.clone());
//! Backup::new(&config, &store, &PasswordSafeExport::new(), &keyring).run()?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod sources;

pub use error::{BackupError, BackupResult};
