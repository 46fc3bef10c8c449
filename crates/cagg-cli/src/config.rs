//! # Config Subcommand
//!
//! `cagg config check <path>` loads and validates a ledger configuration
//! and prints it back in normalized YAML. `cagg config default` prints the
//! defaults.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};

use cagg_ledger::LedgerConfig;

/// Arguments for the config subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config operations.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Load, validate, and print a configuration file.
    Check {
        /// Path to the YAML file.
        path: PathBuf,
    },
    /// Print the default configuration.
    Default,
}

/// Run the config subcommand.
pub fn run(args: &ConfigArgs) -> anyhow::Result<String> {
    let config = match &args.command {
        ConfigCommand::Check { path } => LedgerConfig::load(path)
            .with_context(|| format!("config check failed for {}", path.display()))?,
        ConfigCommand::Default => LedgerConfig::default(),
    };
    tracing::debug!(principal = %config.ledger_principal, "configuration loaded");
    Ok(config.to_yaml()?)
}
