//! # cagg-cli: Ledger Command-Line Interface
//!
//! ## Subcommands
//!
//! - `config`: check a YAML ledger configuration or print the default
//! - `simulate`: fold plaintext contributions (encrypted with the mock
//!   capability) into a bucket and print a JSON report
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to `cagg-ledger`; no ledger logic lives here.
//! - Handlers return their output as a string; `main` prints it.

pub mod config;
pub mod simulate;
