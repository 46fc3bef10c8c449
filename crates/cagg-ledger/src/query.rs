//! # Query Surface
//!
//! Read-only accessors over the engine's buckets. Nothing here mutates
//! state or creates buckets, and nothing exposes an accumulator other
//! than through its opaque handle.
//!
//! Lookups of unknown buckets fail with `NotFound`, with one exception:
//! `submission_count` answers `0`, meaning "no data yet".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cagg_core::{BucketId, Handle, LedgerError};
use cagg_fhe::CiphertextCapability;
use cagg_state::{AccessList, BucketPhase};

use crate::engine::AccumulatorEngine;

/// Serializable snapshot of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    /// Bucket identifier.
    pub bucket: BucketId,
    /// Handle of the current accumulator.
    pub handle: Handle,
    /// Accepted contributions.
    pub submission_count: u64,
    /// Disclosure phase.
    pub phase: BucketPhase,
    /// Principals with access to the accumulator.
    pub access_list: AccessList,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
    /// First disclosure, if any.
    pub disclosed_at: Option<DateTime<Utc>>,
}

impl<C: CiphertextCapability> AccumulatorEngine<C> {
    /// Export the handle of bucket `id`'s current accumulator.
    ///
    /// Always available; the handle only becomes publicly decryptable once
    /// the bucket is disclosed.
    pub fn accumulator_handle(&self, id: &BucketId) -> Result<Handle, LedgerError> {
        let slot = self.store.get(id)?;
        let bucket = slot.lock();
        Ok(self.capability.export_handle(bucket.accumulator()))
    }

    /// Accepted contributions to bucket `id`; `0` for an unknown bucket.
    pub fn submission_count(&self, id: &BucketId) -> u64 {
        self.store
            .get(id)
            .map_or(0, |slot| slot.lock().submission_count())
    }

    /// Whether bucket `id` was ever created.
    pub fn exists(&self, id: &BucketId) -> bool {
        self.store.exists(id)
    }

    /// Whether bucket `id` has been disclosed.
    pub fn is_disclosed(&self, id: &BucketId) -> Result<bool, LedgerError> {
        let slot = self.store.get(id)?;
        let disclosed = slot.lock().is_disclosed();
        Ok(disclosed)
    }

    /// Snapshot of bucket `id`.
    pub fn summary(&self, id: &BucketId) -> Result<BucketSummary, LedgerError> {
        let slot = self.store.get(id)?;
        let bucket = slot.lock();
        Ok(BucketSummary {
            bucket: *bucket.id(),
            handle: self.capability.export_handle(bucket.accumulator()),
            submission_count: bucket.submission_count(),
            phase: bucket.phase(),
            access_list: bucket.access_list().clone(),
            created_at: bucket.created_at(),
            updated_at: bucket.updated_at(),
            disclosed_at: bucket.disclosed_at(),
        })
    }

    /// Snapshots of every bucket, ordered by identifier.
    pub fn summaries(&self) -> Vec<BucketSummary> {
        self.store
            .ids()
            .iter()
            .filter_map(|id| self.summary(id).ok())
            .collect()
    }
}
