//! # Error Types
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! Every `LedgerError` is terminal for the call that produced it. None is
//! retried internally, and none leaves a bucket partially updated.

use thiserror::Error;

use crate::identity::{BucketId, Principal};

/// Failure of a public ledger operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// `init` was called for a bucket that already exists.
    #[error("bucket {bucket} already exists")]
    AlreadyExists {
        /// The bucket that was already initialized.
        bucket: BucketId,
    },

    /// The operation referenced a bucket that was never created.
    #[error("bucket {bucket} not found")]
    NotFound {
        /// The unknown bucket.
        bucket: BucketId,
    },

    /// The submission blob is shorter than a ciphertext handle.
    #[error("malformed input: {len} bytes, expected at least {min}")]
    MalformedInput {
        /// Length of the rejected blob.
        len: usize,
        /// Minimum accepted length (the handle width).
        min: usize,
    },

    /// The contribution's proof failed verification.
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// The bucket is disclosed and the ledger is configured to freeze
    /// disclosed sums.
    #[error("bucket {bucket} is disclosed and accepts no further submissions")]
    Disclosed {
        /// The disclosed bucket.
        bucket: BucketId,
    },

    /// The caller may not extend a bucket's access list.
    #[error("principal {principal} is not authorized to grant access")]
    Unauthorized {
        /// The rejected caller.
        principal: Principal,
    },
}

impl LedgerError {
    /// Whether the error rejected a contribution (as opposed to a lookup or
    /// lifecycle precondition). Rejected contributions may be re-sent with
    /// a corrected or regenerated proof.
    pub fn is_rejected_contribution(&self) -> bool {
        matches!(self, Self::MalformedInput { .. } | Self::InvalidProof(_))
    }
}

/// Error parsing or constructing an identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Bucket labels must not be empty.
    #[error("bucket label must not be empty")]
    EmptyLabel,

    /// The label does not fit in a fixed-width identifier.
    #[error("label is {len} bytes, maximum is {max}")]
    LabelTooLong {
        /// Label length in bytes.
        len: usize,
        /// Maximum permitted length.
        max: usize,
    },

    /// A `0x`-prefixed value was not valid hex of the expected width.
    #[error("invalid hex identifier: {0}")]
    InvalidHex(String),
}
