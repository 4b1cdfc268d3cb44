//! Command-line interface
//!
//! Flag names follow the original tool (`--PasswordSafe`, `--gpgId`) so
//! existing scripts keep working.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::{CliOverrides, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(
    name = "passencbkp",
    version,
    about = "Merge a password store and a password-safe export into one CSV backup",
    long_about = "Decrypts every entry under a prefix of the age-encrypted password store, \
                  appends the records of a password-safe text export, and writes them as \
                  one CSV file. With --gpgId the file is encrypted for that recipient.",
    disable_help_flag = true
)]
pub struct Cli {
    /// Identity whose key decrypts the password store
    #[arg(short = 'e', long = "email", value_name = "ID")]
    pub email: Option<String>,

    /// Directory in the password store to use as entry point [default: /]
    #[arg(short = 'p', long = "prefix", value_name = "DIR")]
    pub prefix: Option<String>,

    /// Exported CSV/TSV file with password-safe data
    #[arg(short = 'P', long = "PasswordSafe", value_name = "FILE")]
    pub password_safe: Option<PathBuf>,

    /// Configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Identity to encrypt the output file for
    #[arg(short = 'g', long = "gpgId", value_name = "ID")]
    pub recipient: Option<String>,

    /// Use base64 when encrypting
    #[arg(short = 'b', long = "base64")]
    pub base64: bool,

    /// Output file to save merged passwords
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Password store root
    #[arg(long = "store-dir", value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Keyring directory with <id>.pub and <id>.key files
    #[arg(long = "keyring", value_name = "DIR")]
    pub keyring_dir: Option<PathBuf>,

    /// Write the unencrypted CSV if encryption fails instead of aborting
    #[arg(long)]
    pub allow_plaintext_fallback: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Display help
    #[arg(short = '?', short_alias = 'h', long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Cli {
    /// The flags that take part in configuration precedence
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            email: self.email.clone(),
            prefix: self.prefix.clone(),
            password_safe: self.password_safe.clone(),
            output: self.output.clone(),
            recipient: self.recipient.clone(),
            base64: self.base64,
            store_dir: self.store_dir.clone(),
            keyring_dir: self.keyring_dir.clone(),
            allow_plaintext_fallback: self.allow_plaintext_fallback,
        }
    }

    /// Default log filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
