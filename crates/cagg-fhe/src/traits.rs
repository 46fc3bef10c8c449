//! # Ciphertext Capability Trait
//!
//! The abstract interface for the additively homomorphic scheme the
//! ledger accumulates under.
//!
//! ## Security Invariant
//!
//! The trait requires `Send + Sync` so one capability instance can serve
//! concurrent callers. Every operation is synchronous and deterministic
//! with no side effects beyond its declared contract (access grants and
//! the public flag are the only state a capability keeps).

use cagg_core::{Handle, Principal};
use thiserror::Error;

/// Error raised by a capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The proof does not verify for this handle and context.
    #[error("proof rejected: {0}")]
    InvalidProof(String),

    /// The handle does not name a ciphertext this capability knows.
    #[error("unknown handle {0}")]
    UnknownHandle(Handle),

    /// The principal may not decrypt or compute on this value.
    #[error("principal {principal} has no access to {handle}")]
    AccessDenied {
        /// Value that was requested.
        handle: Handle,
        /// Principal that asked.
        principal: Principal,
    },

    /// Public decryption was requested for a value that was never made
    /// public.
    #[error("value {0} is not publicly decryptable")]
    NotPublic(Handle),
}

/// Who is importing an encrypted input, and into which ledger.
///
/// A proof is bound to both: a contribution produced for one caller or one
/// ledger instance must not verify for another.
#[derive(Debug, Clone, Copy)]
pub struct ImportContext<'a> {
    /// The principal submitting the contribution.
    pub caller: &'a Principal,
    /// The ledger principal that will compute on the imported value.
    pub ledger: &'a Principal,
}

/// Abstract interface to an additively homomorphic encryption scheme.
///
/// `Value` is the scheme's in-ledger ciphertext representation. Handles
/// exported from it are opaque and may change on every operation: a scheme
/// is free to mint a fresh handle for each `add`, which is why callers
/// re-grant access after every mutation.
pub trait CiphertextCapability: Send + Sync {
    /// The encrypted value type.
    type Value: Clone + Send + Sync + std::fmt::Debug;

    /// An encryption of zero.
    fn zero(&self) -> Self::Value;

    /// Homomorphic addition.
    fn add(&self, lhs: &Self::Value, rhs: &Self::Value) -> Self::Value;

    /// Verify `proof` for `handle` in `ctx` and import the referenced value.
    fn verify_and_import(
        &self,
        handle: &Handle,
        proof: &[u8],
        ctx: &ImportContext<'_>,
    ) -> Result<Self::Value, CapabilityError>;

    /// Allow `principal` to decrypt and compute on `value`.
    fn grant_access(&self, value: &Self::Value, principal: &Principal);

    /// Mark `value` as decryptable through the public disclosure path.
    fn make_public(&self, value: &Self::Value);

    /// The opaque handle naming `value`.
    fn export_handle(&self, value: &Self::Value) -> Handle;
}
