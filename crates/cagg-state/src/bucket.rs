//! # Bucket Record
//!
//! A bucket is one named accumulation context: a running encrypted sum,
//! the number of contributions folded into it, and whether the sum has
//! been disclosed.
//!
//! ## Design Decision
//!
//! The record is generic over the accumulator type so it stays independent
//! of any particular encryption scheme. It never interprets the
//! accumulator; the engine replaces it wholesale on every fold.
//!
//! ## Invariants
//!
//! - `submission_count` only grows, by exactly one per fold.
//! - The phase moves `Active → Disclosed` once and never back.
//! - The access list only grows and always contains the ledger principal.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cagg_core::{BucketId, Principal};

// ─── Phase ───────────────────────────────────────────────────────────

/// Disclosure phase of a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BucketPhase {
    /// Accumulating; the sum is decryptable only by the access list.
    Active,
    /// The sum is publicly decryptable (terminal).
    Disclosed,
}

impl BucketPhase {
    /// Whether the sum has been disclosed.
    pub fn is_disclosed(&self) -> bool {
        matches!(self, Self::Disclosed)
    }
}

impl std::fmt::Display for BucketPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Disclosed => "DISCLOSED",
        };
        f.write_str(s)
    }
}

// ─── Access List ─────────────────────────────────────────────────────

/// Principals entitled to decrypt and compute on a bucket's accumulator.
///
/// The list belongs to the bucket rather than to any single ciphertext:
/// each time the accumulator is replaced, every member is granted access
/// on the new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessList(BTreeSet<Principal>);

impl AccessList {
    /// A list holding only `owner`.
    pub fn with_owner(owner: Principal) -> Self {
        Self(BTreeSet::from([owner]))
    }

    /// Add a principal. Returns `false` if it was already present.
    pub fn insert(&mut self, principal: Principal) -> bool {
        self.0.insert(principal)
    }

    /// Whether `principal` is on the list.
    pub fn contains(&self, principal: &Principal) -> bool {
        self.0.contains(principal)
    }

    /// Members in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Principal> {
        self.0.iter()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ─── Bucket ──────────────────────────────────────────────────────────

/// One accumulation bucket.
#[derive(Debug, Clone)]
pub struct Bucket<V> {
    id: BucketId,
    accumulator: V,
    submission_count: u64,
    phase: BucketPhase,
    access: AccessList,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    disclosed_at: Option<DateTime<Utc>>,
}

impl<V> Bucket<V> {
    /// A fresh active bucket around a zero accumulator that `owner` already
    /// has access to.
    pub fn new(id: BucketId, zero: V, owner: Principal) -> Self {
        let now = Utc::now();
        Self {
            id,
            accumulator: zero,
            submission_count: 0,
            phase: BucketPhase::Active,
            access: AccessList::with_owner(owner),
            created_at: now,
            updated_at: now,
            disclosed_at: None,
        }
    }

    /// The bucket identifier.
    pub fn id(&self) -> &BucketId {
        &self.id
    }

    /// The current encrypted sum.
    pub fn accumulator(&self) -> &V {
        &self.accumulator
    }

    /// Number of contributions folded in since creation.
    pub fn submission_count(&self) -> u64 {
        self.submission_count
    }

    /// Current disclosure phase.
    pub fn phase(&self) -> BucketPhase {
        self.phase
    }

    /// Whether the sum has been disclosed.
    pub fn is_disclosed(&self) -> bool {
        self.phase.is_disclosed()
    }

    /// Principals with access to the accumulator.
    pub fn access_list(&self) -> &AccessList {
        &self.access
    }

    /// When the bucket was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the bucket last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// When the bucket was first disclosed.
    pub fn disclosed_at(&self) -> Option<DateTime<Utc>> {
        self.disclosed_at
    }

    /// Replace the accumulator with `total` and count one contribution.
    ///
    /// Returns the new submission count.
    pub fn fold(&mut self, total: V) -> u64 {
        self.accumulator = total;
        self.submission_count = self.submission_count.saturating_add(1);
        self.updated_at = Utc::now();
        self.submission_count
    }

    /// Move to `Disclosed`. Returns `true` only on the first call.
    pub fn disclose(&mut self) -> bool {
        if self.phase.is_disclosed() {
            return false;
        }
        let now = Utc::now();
        self.phase = BucketPhase::Disclosed;
        self.disclosed_at = Some(now);
        self.updated_at = now;
        true
    }

    /// Add `principal` to the access list. Returns `false` if it was
    /// already a member.
    pub fn grant(&mut self, principal: Principal) -> bool {
        let added = self.access.insert(principal);
        if added {
            self.updated_at = Utc::now();
        }
        added
    }
}
