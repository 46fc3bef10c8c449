//! # Mock Ciphertext Capability
//!
//! A deterministic, transparent stand-in for an additively homomorphic
//! scheme. Plaintexts are kept in a table keyed by handle; handles are
//! SHA-256 digests of a per-instance counter.
//!
//! ## How It Works
//!
//! - `encrypt()` (client side) registers a plaintext under a fresh input
//!   handle and returns `handle || proof` where
//!   `proof = SHA256(domain || handle || caller || ledger)`.
//! - `verify_and_import()` recomputes the proof and, on a match, mints a
//!   new computed handle carrying the same plaintext. The ledger principal
//!   gets access to the imported value.
//! - `add()` mints a new handle holding the wrapping `u64` sum. The new
//!   value starts with an empty access list, so the caller has to grant
//!   access again before computing on it.
//!
//! The mock also counts proof verifications and "access faults" (an `add`
//! on an operand the compute principal was never granted) so tests can
//! observe both.
//!
//! ## Security Warning
//!
//! **NOT PRIVATE.** Anyone holding the capability can read every plaintext
//! through [`MockCapability::decrypt`]. It exists for tests and local
//! simulation only.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cagg_core::{Handle, Principal};
use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::input::encode;
use crate::traits::{CapabilityError, CiphertextCapability, ImportContext};

const HANDLE_DOMAIN: &[u8] = b"cagg-mock/handle/v1";
const PROOF_DOMAIN: &[u8] = b"cagg-mock/proof/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Produced by a client via `encrypt`, importable once proven.
    Input,
    /// Produced inside the capability (`zero`, `add`, import).
    Computed,
}

#[derive(Debug, Clone)]
struct Cell {
    plaintext: u64,
    origin: Origin,
    acl: BTreeSet<Principal>,
    public: bool,
}

#[derive(Debug)]
struct Inner {
    compute_principal: Principal,
    cells: DashMap<Handle, Cell>,
    minted: AtomicU64,
    verify_calls: AtomicU64,
    access_faults: AtomicU64,
}

/// A ciphertext inside the mock capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockCiphertext {
    handle: Handle,
}

impl MockCiphertext {
    /// The handle naming this ciphertext.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

/// Deterministic mock capability with a decrypt oracle.
///
/// Cheaply cloneable; all clones share the same ciphertext table, so a
/// test can hand one clone to the ledger and keep another for decryption.
#[derive(Debug, Clone)]
pub struct MockCapability {
    inner: Arc<Inner>,
}

impl MockCapability {
    /// Create a capability whose `add` expects `compute_principal` to hold
    /// access on its left operand.
    pub fn new(compute_principal: Principal) -> Self {
        Self {
            inner: Arc::new(Inner {
                compute_principal,
                cells: DashMap::new(),
                minted: AtomicU64::new(0),
                verify_calls: AtomicU64::new(0),
                access_faults: AtomicU64::new(0),
            }),
        }
    }

    /// The principal `add` checks access for.
    pub fn compute_principal(&self) -> &Principal {
        &self.inner.compute_principal
    }

    /// Encrypt `plaintext` as a contribution from `caller` to `ledger`,
    /// returning the `handle || proof` blob.
    pub fn encrypt(&self, plaintext: u64, caller: &Principal, ledger: &Principal) -> Vec<u8> {
        let handle = self.mint(plaintext, Origin::Input, BTreeSet::new());
        encode(&handle, &proof_for(&handle, caller, ledger))
    }

    /// Decrypt a value on behalf of `principal`.
    ///
    /// Succeeds when the principal was granted access or the value is
    /// public.
    pub fn decrypt(&self, handle: &Handle, principal: &Principal) -> Result<u64, CapabilityError> {
        let cell = self
            .inner
            .cells
            .get(handle)
            .ok_or(CapabilityError::UnknownHandle(*handle))?;
        if cell.public || cell.acl.contains(principal) {
            Ok(cell.plaintext)
        } else {
            Err(CapabilityError::AccessDenied {
                handle: *handle,
                principal: principal.clone(),
            })
        }
    }

    /// Decrypt through the public disclosure path.
    pub fn public_decrypt(&self, handle: &Handle) -> Result<u64, CapabilityError> {
        let cell = self
            .inner
            .cells
            .get(handle)
            .ok_or(CapabilityError::UnknownHandle(*handle))?;
        if cell.public {
            Ok(cell.plaintext)
        } else {
            Err(CapabilityError::NotPublic(*handle))
        }
    }

    /// Whether `principal` holds access on `handle`.
    pub fn has_access(&self, handle: &Handle, principal: &Principal) -> bool {
        self.inner
            .cells
            .get(handle)
            .is_some_and(|cell| cell.acl.contains(principal))
    }

    /// Whether `handle` was made public.
    pub fn is_public(&self, handle: &Handle) -> bool {
        self.inner.cells.get(handle).is_some_and(|cell| cell.public)
    }

    /// Number of `verify_and_import` calls so far.
    pub fn verify_calls(&self) -> u64 {
        self.inner.verify_calls.load(Ordering::SeqCst)
    }

    /// Number of `add` operands the compute principal had no access to.
    pub fn access_faults(&self) -> u64 {
        self.inner.access_faults.load(Ordering::SeqCst)
    }

    fn mint(&self, plaintext: u64, origin: Origin, acl: BTreeSet<Principal>) -> Handle {
        let serial = self.inner.minted.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(HANDLE_DOMAIN);
        hasher.update(serial.to_le_bytes());
        let handle = Handle::from_bytes(hasher.finalize().into());
        self.inner.cells.insert(
            handle,
            Cell {
                plaintext,
                origin,
                acl,
                public: false,
            },
        );
        handle
    }

    /// Plaintext of a computed operand, noting an access fault when the
    /// compute principal may not use it.
    fn operand(&self, value: &MockCiphertext) -> u64 {
        match self.inner.cells.get(&value.handle) {
            Some(cell) => {
                if !cell.acl.contains(&self.inner.compute_principal) {
                    self.inner.access_faults.fetch_add(1, Ordering::SeqCst);
                }
                cell.plaintext
            }
            None => {
                // Values are only minted here; a missing cell is a fault.
                self.inner.access_faults.fetch_add(1, Ordering::SeqCst);
                0
            }
        }
    }
}

impl CiphertextCapability for MockCapability {
    type Value = MockCiphertext;

    fn zero(&self) -> MockCiphertext {
        MockCiphertext {
            handle: self.mint(0, Origin::Computed, BTreeSet::new()),
        }
    }

    fn add(&self, lhs: &MockCiphertext, rhs: &MockCiphertext) -> MockCiphertext {
        let sum = self.operand(lhs).wrapping_add(self.operand(rhs));
        MockCiphertext {
            handle: self.mint(sum, Origin::Computed, BTreeSet::new()),
        }
    }

    fn verify_and_import(
        &self,
        handle: &Handle,
        proof: &[u8],
        ctx: &ImportContext<'_>,
    ) -> Result<MockCiphertext, CapabilityError> {
        self.inner.verify_calls.fetch_add(1, Ordering::SeqCst);

        let (plaintext, origin) = {
            let cell = self
                .inner
                .cells
                .get(handle)
                .ok_or(CapabilityError::UnknownHandle(*handle))?;
            (cell.plaintext, cell.origin)
        };
        if origin != Origin::Input {
            return Err(CapabilityError::InvalidProof(
                "handle does not name an encrypted input".to_string(),
            ));
        }
        if proof != proof_for(handle, ctx.caller, ctx.ledger).as_slice() {
            return Err(CapabilityError::InvalidProof(
                "proof does not bind handle to caller and ledger".to_string(),
            ));
        }

        let acl = BTreeSet::from([ctx.ledger.clone()]);
        Ok(MockCiphertext {
            handle: self.mint(plaintext, Origin::Computed, acl),
        })
    }

    fn grant_access(&self, value: &MockCiphertext, principal: &Principal) {
        if let Some(mut cell) = self.inner.cells.get_mut(&value.handle) {
            cell.acl.insert(principal.clone());
        }
    }

    fn make_public(&self, value: &MockCiphertext) {
        if let Some(mut cell) = self.inner.cells.get_mut(&value.handle) {
            cell.public = true;
        }
    }

    fn export_handle(&self, value: &MockCiphertext) -> Handle {
        value.handle
    }
}

/// `SHA256(domain || handle || len(caller) || caller || len(ledger) || ledger)`.
fn proof_for(handle: &Handle, caller: &Principal, ledger: &Principal) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(PROOF_DOMAIN);
    hasher.update(handle.as_bytes());
    for party in [caller, ledger] {
        let name = party.as_str().as_bytes();
        hasher.update((name.len() as u64).to_le_bytes());
        hasher.update(name);
    }
    hasher.finalize().into()
}
