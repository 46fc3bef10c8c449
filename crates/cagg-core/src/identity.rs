//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers the ledger deals in. These prevent
//! identifier confusion: a ciphertext `Handle` cannot be passed where a
//! `BucketId` is expected, even though both are 32 bytes wide.
//!
//! `BucketId` and `Handle` serialize as `0x`-prefixed lowercase hex.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IdentityError;

/// Width of a bucket identifier in bytes.
pub const BUCKET_ID_LEN: usize = 32;

/// Width of a ciphertext handle in bytes. Also the minimum length of a
/// submission blob, whose first segment is the handle.
pub const HANDLE_LEN: usize = 32;

// ─── BucketId ────────────────────────────────────────────────────────

/// Caller-supplied identifier of an accumulation bucket.
///
/// Usually built from a short label such as a certificate name, which is
/// left-aligned and zero-padded the way a `bytes32` literal is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketId([u8; BUCKET_ID_LEN]);

impl BucketId {
    /// Wrap raw identifier bytes.
    pub fn from_bytes(bytes: [u8; BUCKET_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an identifier from a UTF-8 label, zero-padded on the right.
    pub fn from_label(label: &str) -> Result<Self, IdentityError> {
        if label.is_empty() {
            return Err(IdentityError::EmptyLabel);
        }
        let raw = label.as_bytes();
        if raw.len() > BUCKET_ID_LEN {
            return Err(IdentityError::LabelTooLong {
                len: raw.len(),
                max: BUCKET_ID_LEN,
            });
        }
        let mut bytes = [0u8; BUCKET_ID_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    /// The raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; BUCKET_ID_LEN] {
        &self.0
    }

    /// The label this identifier was built from, if it is a padded
    /// printable ASCII label.
    pub fn label(&self) -> Option<&str> {
        let end = self
            .0
            .iter()
            .rposition(|b| *b != 0)
            .map_or(0, |last| last + 1);
        let prefix = &self.0[..end];
        if prefix.is_empty() || !prefix.iter().all(|b| b.is_ascii_graphic()) {
            return None;
        }
        std::str::from_utf8(prefix).ok()
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        to_prefixed_hex(&self.0)
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => f.write_str(&self.to_hex()),
        }
    }
}

impl FromStr for BucketId {
    type Err = IdentityError;

    /// Accepts `0x` followed by 64 hex digits, or a label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") {
            parse_prefixed_hex(s).map(Self)
        } else {
            Self::from_label(s)
        }
    }
}

impl Serialize for BucketId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BucketId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ─── Handle ──────────────────────────────────────────────────────────

/// Opaque fixed-width reference to an encrypted value.
///
/// Names a ciphertext without exposing anything about its plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle([u8; HANDLE_LEN]);

impl Handle {
    /// Wrap raw handle bytes.
    pub fn from_bytes(bytes: [u8; HANDLE_LEN]) -> Self {
        Self(bytes)
    }

    /// Copy a handle out of a slice of exactly `HANDLE_LEN` bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; HANDLE_LEN]>::try_from(slice).ok().map(Self)
    }

    /// The raw handle bytes.
    pub fn as_bytes(&self) -> &[u8; HANDLE_LEN] {
        &self.0
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        to_prefixed_hex(&self.0)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Handle {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_prefixed_hex(s).map(Self)
    }
}

impl Serialize for Handle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Handle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ─── Principal ───────────────────────────────────────────────────────

/// A named party: a contributor, an administrator, or the ledger itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Create a principal from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The principal's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

// ─── Hex helpers ─────────────────────────────────────────────────────

fn to_prefixed_hex(bytes: &[u8]) -> String {
    let digits: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("0x{digits}")
}

fn parse_prefixed_hex<const N: usize>(s: &str) -> Result<[u8; N], IdentityError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| IdentityError::InvalidHex(format!("missing 0x prefix: {s:?}")))?;
    if digits.len() != N * 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(IdentityError::InvalidHex(format!(
            "expected {} hex digits, got {s:?}",
            N * 2
        )));
    }
    let mut out = [0u8; N];
    for (slot, pair) in out.iter_mut().zip(digits.as_bytes().chunks(2)) {
        let text = std::str::from_utf8(pair).map_err(|e| IdentityError::InvalidHex(e.to_string()))?;
        *slot = u8::from_str_radix(text, 16).map_err(|e| IdentityError::InvalidHex(e.to_string()))?;
    }
    Ok(out)
}
