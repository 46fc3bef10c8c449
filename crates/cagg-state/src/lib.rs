//! # cagg-state: Bucket State
//!
//! Owns every piece of per-bucket lifecycle state the ledger keeps.
//!
//! ## Lifecycle
//!
//! ```text
//! (absent) ──init / first submit──▶ Active ──make_public──▶ Disclosed
//! ```
//!
//! There is no transition back to absent and none from `Disclosed` to
//! `Active`. A bucket "exists" exactly when the store holds it, so an
//! existing bucket always has an accumulator.
//!
//! ## Modules
//!
//! - **Bucket** (`bucket.rs`): the record, its phase, and its access list.
//! - **Store** (`store.rs`): the concurrent, append-only map from bucket id
//!   to record, with one lock per bucket.

pub mod bucket;
pub mod store;

pub use bucket::{AccessList, Bucket, BucketPhase};
pub use store::{BucketSlot, BucketStore};
