//! # Bucket Store
//!
//! Append-only map from bucket identifier to bucket record, backed by
//! `DashMap`. Buckets are never removed.
//!
//! Each record sits behind its own `parking_lot::Mutex`. Callers look a
//! bucket up (a brief shard lock), clone its slot, release the map, and
//! then lock the bucket. Mutations of one bucket are therefore serialized
//! while different buckets proceed in parallel.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use cagg_core::{BucketId, LedgerError};

use crate::bucket::Bucket;

/// A shared, lockable bucket record.
pub type BucketSlot<V> = Arc<Mutex<Bucket<V>>>;

/// Concurrent bucket store.
#[derive(Debug)]
pub struct BucketStore<V> {
    buckets: DashMap<BucketId, BucketSlot<V>>,
}

impl<V> BucketStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Whether `id` was ever created.
    pub fn exists(&self, id: &BucketId) -> bool {
        self.buckets.contains_key(id)
    }

    /// Look up an existing bucket. Never creates one.
    pub fn get(&self, id: &BucketId) -> Result<BucketSlot<V>, LedgerError> {
        self.buckets
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::NotFound { bucket: *id })
    }

    /// Create a bucket with `make`, failing if `id` already exists.
    ///
    /// The existence check and the insert happen under one shard lock, so
    /// two racing creators cannot both succeed.
    pub fn create(
        &self,
        id: BucketId,
        make: impl FnOnce() -> Bucket<V>,
    ) -> Result<BucketSlot<V>, LedgerError> {
        match self.buckets.entry(id) {
            Entry::Occupied(_) => Err(LedgerError::AlreadyExists { bucket: id }),
            Entry::Vacant(vacant) => {
                let slot = Arc::new(Mutex::new(make()));
                vacant.insert(Arc::clone(&slot));
                Ok(slot)
            }
        }
    }

    /// Return the bucket for `id`, creating it with `make` if absent.
    ///
    /// The flag is `true` when this call created the bucket.
    pub fn get_or_create(
        &self,
        id: BucketId,
        make: impl FnOnce() -> Bucket<V>,
    ) -> (BucketSlot<V>, bool) {
        match self.buckets.entry(id) {
            Entry::Occupied(occupied) => (Arc::clone(occupied.get()), false),
            Entry::Vacant(vacant) => {
                let slot = Arc::new(Mutex::new(make()));
                vacant.insert(Arc::clone(&slot));
                (slot, true)
            }
        }
    }

    /// All bucket identifiers, sorted.
    pub fn ids(&self) -> Vec<BucketId> {
        let mut ids: Vec<BucketId> = self.buckets.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no bucket was ever created.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl<V> Default for BucketStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
