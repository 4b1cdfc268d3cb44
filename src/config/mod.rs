//! Configuration module for pass-enc-bkp
//!
//! This module provides configuration management including:
//! - Default store and keyring locations
//! - The configuration file
//! - Flag/file/default precedence and passphrase prompting

pub mod paths;
pub mod resolve;
pub mod settings;

pub use paths::BackupPaths;
pub use resolve::{CliOverrides, EffectiveConfig, PassphrasePrompt, TerminalPrompt};
pub use settings::{ConfigFile, DEFAULT_CONFIG_FILE};
