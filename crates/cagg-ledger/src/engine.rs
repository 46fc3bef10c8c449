//! # Accumulator Engine
//!
//! The only component that writes accumulators. It creates buckets,
//! validates and folds contributions, extends access lists, and discloses
//! sums.
//!
//! ## Submission Path
//!
//! ```text
//! blob ──split──▶ (handle, proof) ──verify_and_import──▶ value
//!                     │                      │
//!              MalformedInput           InvalidProof
//!
//! value ──lock bucket──▶ add(accumulator, value) ──re-grant access list──▶ fold
//! ```
//!
//! Nothing is mutated until the proof has verified, so every rejection
//! leaves the store exactly as it was (a rejected first submission does
//! not even create the bucket). The fold itself runs under the bucket's
//! lock: each accepted submission reads the accumulator written by the
//! previous one.
//!
//! ## Access Re-Grant
//!
//! A scheme may mint a fresh handle for every `add`. After each mutation
//! the engine grants every member of the bucket's access list (itself
//! included) access to the new value, so it can always compute on its own
//! accumulator.

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use cagg_core::{BucketId, LedgerError, Principal};
use cagg_fhe::{CiphertextCapability, EncryptedInput, ImportContext, InputError};
use cagg_state::{Bucket, BucketStore};

use crate::config::{ConfigError, LedgerConfig};
use crate::events::{EventBus, LedgerEvent};

/// Encrypted-accumulator engine over a ciphertext capability `C`.
#[derive(Debug)]
pub struct AccumulatorEngine<C: CiphertextCapability> {
    pub(crate) capability: C,
    pub(crate) store: BucketStore<C::Value>,
    pub(crate) config: LedgerConfig,
    pub(crate) events: EventBus,
}

impl<C: CiphertextCapability> AccumulatorEngine<C> {
    /// Build an engine with an empty store.
    pub fn new(capability: C, config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            capability,
            store: BucketStore::new(),
            events: EventBus::new(config.event_capacity),
            config,
        })
    }

    /// The principal the engine computes as.
    pub fn principal(&self) -> &Principal {
        &self.config.ledger_principal
    }

    /// The engine's configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The underlying capability.
    pub fn capability(&self) -> &C {
        &self.capability
    }

    /// Receive notifications published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Explicitly create bucket `id`.
    ///
    /// Fails with `AlreadyExists` if the bucket exists, leaving it
    /// untouched. Re-initializing can never wipe an accumulated total.
    pub fn init(&self, id: &BucketId) -> Result<(), LedgerError> {
        self.store
            .create(*id, || self.open_bucket(*id))
            .map(|_| ())
            .map_err(|err| {
                warn!(bucket = %id, error = %err, "init rejected");
                err
            })
    }

    /// Verify a `handle || proof` contribution from `caller` and fold it
    /// into bucket `id`, creating the bucket if needed.
    ///
    /// Returns the submission count after the fold.
    pub fn submit(
        &self,
        caller: &Principal,
        id: &BucketId,
        blob: &[u8],
    ) -> Result<u64, LedgerError> {
        let input = EncryptedInput::parse(blob).map_err(|err| {
            let InputError::TooShort { len, min } = err;
            self.reject(id, caller, LedgerError::MalformedInput { len, min })
        })?;

        let ctx = ImportContext {
            caller,
            ledger: self.principal(),
        };
        let imported = self
            .capability
            .verify_and_import(input.handle(), input.proof(), &ctx)
            .map_err(|err| self.reject(id, caller, LedgerError::InvalidProof(err.to_string())))?;

        let (slot, _) = self.store.get_or_create(*id, || self.open_bucket(*id));
        let mut bucket = slot.lock();

        let disclosed = bucket.is_disclosed();
        if disclosed && !self.config.allow_post_disclosure_submit {
            return Err(self.reject(id, caller, LedgerError::Disclosed { bucket: *id }));
        }

        let total = self.capability.add(bucket.accumulator(), &imported);
        for principal in bucket.access_list().iter() {
            self.capability.grant_access(&total, principal);
        }
        if disclosed {
            self.capability.make_public(&total);
        }
        let submission_count = bucket.fold(total);

        self.events.publish(LedgerEvent::Submitted {
            bucket: *id,
            submission_count,
            at: bucket.updated_at(),
        });
        info!(bucket = %id, caller = %caller, submission_count, "contribution accepted");
        Ok(submission_count)
    }

    /// Make bucket `id`'s sum publicly decryptable.
    ///
    /// Irreversible. Calling it again is harmless and emits another
    /// `Disclosed` notification.
    pub fn make_public(&self, id: &BucketId) -> Result<(), LedgerError> {
        let slot = self.store.get(id).map_err(|err| {
            warn!(bucket = %id, error = %err, "disclosure rejected");
            err
        })?;
        let mut bucket = slot.lock();
        self.capability.make_public(bucket.accumulator());
        let first = bucket.disclose();

        self.events.publish(LedgerEvent::Disclosed {
            bucket: *id,
            at: Utc::now(),
        });
        info!(bucket = %id, first, submission_count = bucket.submission_count(), "accumulator disclosed");
        Ok(())
    }

    /// Let `principal` decrypt bucket `id`'s sum, now and after every
    /// future contribution.
    ///
    /// Only the ledger principal and configured admins may grant.
    pub fn grant_access(
        &self,
        caller: &Principal,
        id: &BucketId,
        principal: Principal,
    ) -> Result<(), LedgerError> {
        if !self.config.may_grant(caller) {
            warn!(bucket = %id, caller = %caller, "access grant rejected");
            return Err(LedgerError::Unauthorized {
                principal: caller.clone(),
            });
        }
        let slot = self.store.get(id)?;
        let mut bucket = slot.lock();
        self.capability.grant_access(bucket.accumulator(), &principal);
        if bucket.grant(principal.clone()) {
            self.events.publish(LedgerEvent::AccessGranted {
                bucket: *id,
                principal: principal.clone(),
                at: bucket.updated_at(),
            });
            info!(bucket = %id, principal = %principal, "access granted");
        }
        Ok(())
    }

    /// A new bucket around a zero accumulator the engine can compute on.
    fn open_bucket(&self, id: BucketId) -> Bucket<C::Value> {
        let zero = self.capability.zero();
        self.capability.grant_access(&zero, self.principal());
        let bucket = Bucket::new(id, zero, self.principal().clone());
        self.events.publish(LedgerEvent::Created {
            bucket: id,
            at: bucket.created_at(),
        });
        info!(bucket = %id, "bucket created");
        bucket
    }

    fn reject(&self, id: &BucketId, caller: &Principal, err: LedgerError) -> LedgerError {
        warn!(bucket = %id, caller = %caller, error = %err, "submission rejected");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cagg_fhe::MockCapability;

    fn engine_with(config: LedgerConfig) -> (AccumulatorEngine<MockCapability>, MockCapability) {
        let cap = MockCapability::new(config.ledger_principal.clone());
        let engine = AccumulatorEngine::new(cap.clone(), config).unwrap();
        (engine, cap)
    }

    fn engine() -> (AccumulatorEngine<MockCapability>, MockCapability) {
        engine_with(LedgerConfig::default())
    }

    fn bucket(label: &str) -> BucketId {
        BucketId::from_label(label).unwrap()
    }

    fn alice() -> Principal {
        Principal::new("alice")
    }

    fn contribute(
        engine: &AccumulatorEngine<MockCapability>,
        cap: &MockCapability,
        id: &BucketId,
        value: u64,
    ) -> Result<u64, LedgerError> {
        let blob = cap.encrypt(value, &alice(), engine.principal());
        engine.submit(&alice(), id, &blob)
    }

    fn total(engine: &AccumulatorEngine<MockCapability>, cap: &MockCapability, id: &BucketId) -> u64 {
        let handle = engine.accumulator_handle(id).unwrap();
        cap.decrypt(&handle, engine.principal()).unwrap()
    }

    // ── init ─────────────────────────────────────────────────────────

    #[test]
    fn test_init_creates_zero_bucket() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        engine.init(&id).unwrap();
        assert_eq!(engine.submission_count(&id), 0);
        assert_eq!(total(&engine, &cap, &id), 0);
        assert!(!engine.is_disclosed(&id).unwrap());
    }

    #[test]
    fn test_init_twice_fails_and_keeps_state() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        engine.init(&id).unwrap();
        let handle = engine.accumulator_handle(&id).unwrap();

        let err = engine.init(&id).unwrap_err();
        assert_eq!(err, LedgerError::AlreadyExists { bucket: id });
        assert_eq!(engine.accumulator_handle(&id).unwrap(), handle);
        assert_eq!(engine.submission_count(&id), 0);
        assert_eq!(total(&engine, &cap, &id), 0);
    }

    #[test]
    fn test_failed_init_does_not_reset_total() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        engine.init(&id).unwrap();
        for value in [4, 8, 15] {
            contribute(&engine, &cap, &id, value).unwrap();
        }
        assert!(engine.init(&id).is_err());
        assert_eq!(engine.submission_count(&id), 3);
        assert_eq!(total(&engine, &cap, &id), 27);
    }

    // ── submit ───────────────────────────────────────────────────────

    #[test]
    fn test_submit_creates_bucket_implicitly() {
        let (engine, cap) = engine();
        let id = bucket("cert-B");
        assert_eq!(contribute(&engine, &cap, &id, 6).unwrap(), 1);
        assert_eq!(total(&engine, &cap, &id), 6);
        assert_eq!(
            engine.init(&id).unwrap_err(),
            LedgerError::AlreadyExists { bucket: id }
        );
    }

    #[test]
    fn test_submit_returns_running_count() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        let counts: Vec<u64> = (1..=4)
            .map(|v| contribute(&engine, &cap, &id, v).unwrap())
            .collect();
        assert_eq!(counts, vec![1, 2, 3, 4]);
        assert_eq!(total(&engine, &cap, &id), 10);
    }

    #[test]
    fn test_engine_keeps_access_after_every_fold() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        engine.init(&id).unwrap();
        let mut seen = Vec::new();
        for value in 1..=5 {
            contribute(&engine, &cap, &id, value).unwrap();
            let handle = engine.accumulator_handle(&id).unwrap();
            assert!(cap.has_access(&handle, engine.principal()));
            seen.push(handle);
        }
        seen.dedup();
        assert_eq!(seen.len(), 5, "every fold mints a new handle");
        assert_eq!(cap.access_faults(), 0);
    }

    #[test]
    fn test_tampered_proof_rejected_atomically() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        contribute(&engine, &cap, &id, 10).unwrap();
        let handle = engine.accumulator_handle(&id).unwrap();

        let mut blob = cap.encrypt(99, &alice(), engine.principal());
        if let Some(byte) = blob.last_mut() {
            *byte ^= 0xff;
        }
        let err = engine.submit(&alice(), &id, &blob).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidProof(_)));
        assert_eq!(engine.submission_count(&id), 1);
        assert_eq!(engine.accumulator_handle(&id).unwrap(), handle);
        assert_eq!(total(&engine, &cap, &id), 10);
    }

    #[test]
    fn test_contribution_for_other_caller_rejected() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        let blob = cap.encrypt(3, &alice(), engine.principal());
        let err = engine.submit(&Principal::new("bob"), &id, &blob).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidProof(_)));
    }

    #[test]
    fn test_rejected_first_submission_creates_nothing() {
        let (engine, cap) = engine();
        let id = bucket("cert-C");
        let mut blob = cap.encrypt(3, &alice(), engine.principal());
        blob.truncate(40);
        assert!(engine.submit(&alice(), &id, &blob).is_err());
        assert!(!engine.exists(&id));
        assert_eq!(
            engine.accumulator_handle(&id).unwrap_err(),
            LedgerError::NotFound { bucket: id }
        );
    }

    #[test]
    fn test_short_blob_skips_verification() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        engine.init(&id).unwrap();
        for len in [0, 1, 31] {
            let err = engine.submit(&alice(), &id, &vec![0u8; len]).unwrap_err();
            assert_eq!(err, LedgerError::MalformedInput { len, min: 32 });
        }
        assert_eq!(cap.verify_calls(), 0);
        assert_eq!(engine.submission_count(&id), 0);
    }

    #[test]
    fn test_handle_only_blob_reaches_verification() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        let blob = cap.encrypt(3, &alice(), engine.principal());
        let err = engine.submit(&alice(), &id, &blob[..32]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidProof(_)));
        assert_eq!(cap.verify_calls(), 1);
    }

    #[test]
    fn test_retry_after_rejection_succeeds() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        let good = cap.encrypt(5, &alice(), engine.principal());
        let mut bad = good.clone();
        if let Some(byte) = bad.last_mut() {
            *byte ^= 0x01;
        }
        assert!(engine.submit(&alice(), &id, &bad).is_err());
        assert_eq!(engine.submit(&alice(), &id, &good).unwrap(), 1);
        assert_eq!(total(&engine, &cap, &id), 5);
    }

    // ── make_public ──────────────────────────────────────────────────

    #[test]
    fn test_make_public_unknown_bucket() {
        let (engine, _) = engine();
        let id = bucket("nope");
        assert_eq!(
            engine.make_public(&id).unwrap_err(),
            LedgerError::NotFound { bucket: id }
        );
        assert!(!engine.exists(&id));
    }

    #[test]
    fn test_disclosure_is_one_way_and_idempotent() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        contribute(&engine, &cap, &id, 7).unwrap();
        engine.make_public(&id).unwrap();
        let handle = engine.accumulator_handle(&id).unwrap();
        assert_eq!(cap.public_decrypt(&handle).unwrap(), 7);

        engine.make_public(&id).unwrap();
        assert!(engine.is_disclosed(&id).unwrap());
        assert_eq!(engine.accumulator_handle(&id).unwrap(), handle);
        assert_eq!(cap.public_decrypt(&handle).unwrap(), 7);
    }

    #[test]
    fn test_every_disclosure_call_notifies() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        contribute(&engine, &cap, &id, 1).unwrap();
        let mut rx = engine.subscribe();
        engine.make_public(&id).unwrap();
        engine.make_public(&id).unwrap();
        for _ in 0..2 {
            assert!(matches!(rx.try_recv().unwrap(), LedgerEvent::Disclosed { .. }));
        }
    }

    #[test]
    fn test_post_disclosure_submit_rejected_by_default() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        contribute(&engine, &cap, &id, 10).unwrap();
        engine.make_public(&id).unwrap();
        let handle = engine.accumulator_handle(&id).unwrap();

        let err = contribute(&engine, &cap, &id, 5).unwrap_err();
        assert_eq!(err, LedgerError::Disclosed { bucket: id });
        assert_eq!(engine.submission_count(&id), 1);
        assert_eq!(engine.accumulator_handle(&id).unwrap(), handle);
        assert_eq!(cap.public_decrypt(&handle).unwrap(), 10);
    }

    #[test]
    fn test_post_disclosure_submit_allowed_stays_public() {
        let config = LedgerConfig {
            allow_post_disclosure_submit: true,
            ..LedgerConfig::default()
        };
        let (engine, cap) = engine_with(config);
        let id = bucket("cert-A");
        contribute(&engine, &cap, &id, 10).unwrap();
        engine.make_public(&id).unwrap();

        assert_eq!(contribute(&engine, &cap, &id, 5).unwrap(), 2);
        let handle = engine.accumulator_handle(&id).unwrap();
        assert!(engine.is_disclosed(&id).unwrap());
        assert_eq!(cap.public_decrypt(&handle).unwrap(), 15);
        assert_eq!(cap.access_faults(), 0);
    }

    // ── grant_access ─────────────────────────────────────────────────

    #[test]
    fn test_grant_requires_authority() {
        let (engine, _) = engine();
        let id = bucket("cert-A");
        engine.init(&id).unwrap();
        let err = engine
            .grant_access(&alice(), &id, Principal::new("auditor"))
            .unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized { principal: alice() });
    }

    #[test]
    fn test_grant_unknown_bucket() {
        let (engine, _) = engine();
        let id = bucket("nope");
        let ledger = engine.principal().clone();
        assert_eq!(
            engine
                .grant_access(&ledger, &id, Principal::new("auditor"))
                .unwrap_err(),
            LedgerError::NotFound { bucket: id }
        );
    }

    #[test]
    fn test_granted_reader_follows_the_accumulator() {
        let config = LedgerConfig {
            access_admins: vec![Principal::new("registrar")],
            ..LedgerConfig::default()
        };
        let (engine, cap) = engine_with(config);
        let id = bucket("cert-A");
        let auditor = Principal::new("auditor");
        contribute(&engine, &cap, &id, 2).unwrap();

        engine
            .grant_access(&Principal::new("registrar"), &id, auditor.clone())
            .unwrap();
        let handle = engine.accumulator_handle(&id).unwrap();
        assert_eq!(cap.decrypt(&handle, &auditor).unwrap(), 2);

        contribute(&engine, &cap, &id, 3).unwrap();
        let handle = engine.accumulator_handle(&id).unwrap();
        assert_eq!(cap.decrypt(&handle, &auditor).unwrap(), 5);
        assert!(cap.decrypt(&handle, &alice()).is_err());
    }

    // ── notifications ────────────────────────────────────────────────

    #[test]
    fn test_lifecycle_notifications() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        let mut rx = engine.subscribe();
        engine.init(&id).unwrap();
        contribute(&engine, &cap, &id, 1).unwrap();
        contribute(&engine, &cap, &id, 1).unwrap();
        engine.make_public(&id).unwrap();

        assert!(matches!(rx.try_recv().unwrap(), LedgerEvent::Created { bucket, .. } if bucket == id));
        for expected in 1..=2 {
            match rx.try_recv().unwrap() {
                LedgerEvent::Submitted {
                    bucket,
                    submission_count,
                    ..
                } => {
                    assert_eq!(bucket, id);
                    assert_eq!(submission_count, expected);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(matches!(rx.try_recv().unwrap(), LedgerEvent::Disclosed { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_rejections_publish_nothing() {
        let (engine, cap) = engine();
        let id = bucket("cert-A");
        engine.init(&id).unwrap();
        let mut rx = engine.subscribe();
        assert!(engine.init(&id).is_err());
        assert!(engine.submit(&alice(), &id, &[0u8; 4]).is_err());
        let mut blob = cap.encrypt(1, &alice(), engine.principal());
        blob.push(0);
        assert!(engine.submit(&alice(), &id, &blob).is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LedgerConfig {
            event_capacity: 0,
            ..LedgerConfig::default()
        };
        let cap = MockCapability::new(config.ledger_principal.clone());
        assert!(AccumulatorEngine::new(cap, config).is_err());
    }
}
