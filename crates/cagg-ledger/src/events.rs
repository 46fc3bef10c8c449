//! # Ledger Notifications
//!
//! Events published for external observers over a
//! `tokio::sync::broadcast` channel. Publishing is synchronous and never
//! blocks; a ledger with no subscribers simply drops its events.
//!
//! Events carry identifiers, counts and principals only. Nothing derived
//! from a plaintext is ever published.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use cagg_core::{BucketId, Principal};

/// Something observable happened to a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A bucket was created with a zero accumulator.
    Created {
        /// The new bucket.
        bucket: BucketId,
        /// Creation time.
        at: DateTime<Utc>,
    },
    /// A contribution was accepted.
    Submitted {
        /// The bucket it was folded into.
        bucket: BucketId,
        /// Submission count after the fold.
        submission_count: u64,
        /// Acceptance time.
        at: DateTime<Utc>,
    },
    /// `make_public` ran on the bucket (emitted on every call).
    Disclosed {
        /// The disclosed bucket.
        bucket: BucketId,
        /// Call time.
        at: DateTime<Utc>,
    },
    /// A principal joined the bucket's access list.
    AccessGranted {
        /// The bucket.
        bucket: BucketId,
        /// The new member.
        principal: Principal,
        /// Grant time.
        at: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// The bucket the event concerns.
    pub fn bucket(&self) -> &BucketId {
        match self {
            Self::Created { bucket, .. }
            | Self::Submitted { bucket, .. }
            | Self::Disclosed { bucket, .. }
            | Self::AccessGranted { bucket, .. } => bucket,
        }
    }
}

/// Fan-out channel for [`LedgerEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    ///
    /// `capacity` must be non-zero; `LedgerConfig::validate` enforces it.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    /// Publish to all current subscribers.
    pub fn publish(&self, event: LedgerEvent) {
        // An error only means there are no subscribers.
        let _ = self.sender.send(event);
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
