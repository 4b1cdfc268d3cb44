use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use passbkp::cli::Cli;
use passbkp::config::{BackupPaths, ConfigFile, EffectiveConfig, TerminalPrompt};
use passbkp::crypto::Keyring;
use passbkp::pipeline::Backup;
use passbkp::sources::{PassStore, PasswordSafeExport};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let file = ConfigFile::load_or_default(&cli.config);
    let defaults = BackupPaths::new()?;
    let config = EffectiveConfig::resolve(cli.overrides(), file, &defaults, &TerminalPrompt)
        .context("Cannot obtain the passphrase")?;

    let keyring = Keyring::new(&config.keyring_dir);
    let store = PassStore::new(&config.store_dir, keyring.clone());
    let export = PasswordSafeExport::new();

    let summary = Backup::new(&config, &store, &export, &keyring)
        .run()
        .with_context(|| format!("Backup to '{}' failed", config.output_path.display()))?;

    info!(
        rows = summary.rows(),
        bytes = summary.bytes_written,
        encrypted = summary.encrypted,
        "End of program"
    );

    Ok(())
}
