//! # cagg CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Confidential aggregation ledger toolchain.
///
/// Checks ledger configurations and simulates encrypted contributions
/// against an in-process ledger.
#[derive(Parser, Debug)]
#[command(name = "cagg", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Inspect ledger configuration files.
    Config(cagg_cli::config::ConfigArgs),
    /// Run contributions through a ledger backed by the mock capability.
    Simulate(cagg_cli::simulate::SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Config(args) => cagg_cli::config::run(&args)?,
        Commands::Simulate(args) => cagg_cli::simulate::run(&args)?,
    };
    println!("{output}");

    Ok(())
}
