//! # cagg-ledger: Encrypted-Accumulator Ledger
//!
//! Parties contribute encrypted values into named buckets. The ledger keeps
//! a running homomorphic sum per bucket that nobody, the operator included,
//! can read until the sum is disclosed. Individual contributions are never
//! materialized in plaintext.
//!
//! ## Components
//!
//! - **Engine** (`engine.rs`): `init`, `submit`, `make_public`,
//!   `grant_access`. The only writer of accumulators.
//! - **Query** (`query.rs`): `accumulator_handle`, `submission_count`,
//!   `is_disclosed`, `summary`, `summaries`.
//! - **Config** (`config.rs`): YAML-loadable `LedgerConfig`, including the
//!   post-disclosure submission policy.
//! - **Events** (`events.rs`): `Created`, `Submitted`, `Disclosed` and
//!   `AccessGranted` notifications over a broadcast channel.
//!
//! ## Concurrency
//!
//! One engine is shared by many concurrent callers (`&self` methods only).
//! Mutations of a single bucket are serialized by that bucket's lock;
//! different buckets proceed independently. There are no cross-bucket
//! operations.
//!
//! ## Example
//!
//! ```
//! use cagg_core::{BucketId, Principal};
//! use cagg_fhe::MockCapability;
//! use cagg_ledger::{AccumulatorEngine, LedgerConfig};
//!
//! let config = LedgerConfig::default();
//! let cap = MockCapability::new(config.ledger_principal.clone());
//! let ledger = AccumulatorEngine::new(cap.clone(), config).unwrap();
//!
//! let id = BucketId::from_label("cert-A").unwrap();
//! let alice = Principal::new("alice");
//! ledger.init(&id).unwrap();
//! ledger.submit(&alice, &id, &cap.encrypt(10, &alice, ledger.principal())).unwrap();
//! ledger.make_public(&id).unwrap();
//!
//! let handle = ledger.accumulator_handle(&id).unwrap();
//! assert_eq!(cap.public_decrypt(&handle).unwrap(), 10);
//! ```

pub mod config;
pub mod engine;
pub mod events;
pub mod query;

pub use config::{ConfigError, LedgerConfig};
pub use engine::AccumulatorEngine;
pub use events::{EventBus, LedgerEvent};
pub use query::BucketSummary;
