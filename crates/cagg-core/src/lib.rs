//! # cagg-core: Foundational Types for the Confidential Aggregation Ledger
//!
//! Defines the identifier newtypes and the error taxonomy shared by every
//! other crate in the workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Fixed-width newtypes.** `BucketId` and `Handle` are 32-byte values
//!    with validated constructors. A ciphertext handle can never be passed
//!    where a bucket identifier is expected.
//!
//! 2. **One error taxonomy.** `LedgerError` carries every failure a public
//!    ledger operation can surface. Capability and codec errors from
//!    `cagg-fhe` are mapped into it at the engine boundary.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cagg-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;

pub use error::{IdentityError, LedgerError};
pub use identity::{BucketId, Handle, Principal, BUCKET_ID_LEN, HANDLE_LEN};
