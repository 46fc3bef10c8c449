//! # Simulate Subcommand
//!
//! Encrypts each `--value` with the mock capability as `--caller`, submits
//! it to bucket `--bucket`, optionally discloses the sum, and reports the
//! resulting bucket state as JSON.
//!
//! The mock capability is transparent. The report only includes a
//! plaintext total when the bucket was disclosed, mirroring what a real
//! public-decrypt would reveal.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use cagg_core::{BucketId, Principal};
use cagg_fhe::MockCapability;
use cagg_ledger::{AccumulatorEngine, BucketSummary, LedgerConfig, LedgerEvent};

/// Arguments for the simulate subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Bucket identifier: a label of up to 32 bytes or 0x-prefixed hex.
    #[arg(long, default_value = "cert-A")]
    pub bucket: String,

    /// Plaintext contribution. Repeat for several.
    #[arg(long = "value", required = true)]
    pub values: Vec<u64>,

    /// Name of the contributing principal.
    #[arg(long, default_value = "contributor")]
    pub caller: String,

    /// Disclose the sum after the last contribution.
    #[arg(long)]
    pub disclose: bool,

    /// Ledger configuration file (YAML).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Outcome of a simulation.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    /// Final bucket state.
    pub summary: BucketSummary,
    /// Notifications the ledger published.
    pub events: Vec<LedgerEvent>,
    /// Publicly decrypted sum, when disclosed.
    pub public_total: Option<u64>,
}

/// Run the simulate subcommand.
pub fn run(args: &SimulateArgs) -> anyhow::Result<String> {
    let config = match &args.config {
        Some(path) => LedgerConfig::load(path)?,
        None => LedgerConfig::default(),
    };
    let report = simulate(args, config)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Drive an in-process ledger through the requested contributions.
pub fn simulate(args: &SimulateArgs, config: LedgerConfig) -> anyhow::Result<SimulationReport> {
    let id: BucketId = args
        .bucket
        .parse()
        .with_context(|| format!("invalid bucket id {:?}", args.bucket))?;
    let caller = Principal::new(&args.caller);

    let cap = MockCapability::new(config.ledger_principal.clone());
    let engine = AccumulatorEngine::new(cap.clone(), config)?;
    let mut rx = engine.subscribe();

    engine.init(&id)?;
    for value in &args.values {
        let blob = cap.encrypt(*value, &caller, engine.principal());
        engine.submit(&caller, &id, &blob)?;
    }
    if args.disclose {
        engine.make_public(&id)?;
    }

    let summary = engine.summary(&id)?;
    let public_total = if args.disclose {
        Some(cap.public_decrypt(&summary.handle)?)
    } else {
        None
    };

    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(tokio::sync::broadcast::error::TryRecvError::Lagged(missed)) => {
                tracing::warn!(missed, "event buffer overflowed; report is incomplete");
            }
            Err(_) => break,
        }
    }

    tracing::info!(bucket = %id, submissions = summary.submission_count, "simulation complete");
    Ok(SimulationReport {
        summary,
        events,
        public_total,
    })
}
