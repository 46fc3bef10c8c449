//! # Encrypted Input Codec
//!
//! A contribution travels as a single blob:
//!
//! ```text
//! ┌──────────────── 32 bytes ───────────────┬──── remaining bytes ────┐
//! │ handle                                  │ proof                   │
//! └─────────────────────────────────────────┴─────────────────────────┘
//! ```
//!
//! Parsing only splits the blob. It never touches the capability, so a
//! short blob is rejected before any cryptographic work happens.

use cagg_core::{Handle, HANDLE_LEN};
use thiserror::Error;

/// Error splitting a contribution blob.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The blob cannot even hold a handle.
    #[error("input is {len} bytes, a handle needs {min}")]
    TooShort {
        /// Blob length.
        len: usize,
        /// Handle width.
        min: usize,
    },
}

/// A contribution split into its handle and proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptedInput<'a> {
    handle: Handle,
    proof: &'a [u8],
}

impl<'a> EncryptedInput<'a> {
    /// Split `blob` into handle and proof.
    pub fn parse(blob: &'a [u8]) -> Result<Self, InputError> {
        let too_short = || InputError::TooShort {
            len: blob.len(),
            min: HANDLE_LEN,
        };
        if blob.len() < HANDLE_LEN {
            return Err(too_short());
        }
        let (head, proof) = blob.split_at(HANDLE_LEN);
        let handle = Handle::from_slice(head).ok_or_else(too_short)?;
        Ok(Self { handle, proof })
    }

    /// The referenced ciphertext handle.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// The proof bytes (possibly empty).
    pub fn proof(&self) -> &'a [u8] {
        self.proof
    }
}

/// Pack a handle and proof into one blob.
pub fn encode(handle: &Handle, proof: &[u8]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(HANDLE_LEN + proof.len());
    blob.extend_from_slice(handle.as_bytes());
    blob.extend_from_slice(proof);
    blob
}
