//! # cagg-fhe: Ciphertext Capability
//!
//! Defines the boundary between the ledger and the encryption scheme it
//! aggregates under. The ledger never inspects plaintext; everything it
//! does to a contribution goes through [`CiphertextCapability`].
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): `CiphertextCapability` with the six
//!   operations the ledger needs (`zero`, `add`, `verify_and_import`,
//!   `grant_access`, `make_public`, `export_handle`). Mock and real schemes
//!   are interchangeable at compile time.
//!
//! - **Input** (`input.rs`): the wire codec for contributions. A blob is a
//!   fixed-width handle followed by a variable-length proof.
//!
//! - **Mock** (`mock.rs`): `MockCapability`, a deterministic and transparent
//!   stand-in with a decrypt oracle for tests and simulation.
//!
//! ## Feature Flags
//!
//! - `mock` (default): builds `MockCapability`.

pub mod input;
#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;

pub use input::{EncryptedInput, InputError};
#[cfg(feature = "mock")]
pub use mock::{MockCapability, MockCiphertext};
pub use traits::{CapabilityError, CiphertextCapability, ImportContext};
