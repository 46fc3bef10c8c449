//! Concurrent submitters sharing one engine.

use std::collections::BTreeSet;

use cagg_core::{BucketId, Principal};
use cagg_fhe::MockCapability;
use cagg_ledger::{AccumulatorEngine, LedgerConfig};

const THREADS: u64 = 8;
const PER_THREAD: u64 = 25;

fn ledger() -> (AccumulatorEngine<MockCapability>, MockCapability) {
    let config = LedgerConfig::default();
    let cap = MockCapability::new(config.ledger_principal.clone());
    let engine = AccumulatorEngine::new(cap.clone(), config).unwrap();
    (engine, cap)
}

#[test]
fn same_bucket_submissions_are_linearizable() {
    let (engine, cap) = ledger();
    let id = BucketId::from_label("shared").unwrap();

    let counts: Vec<u64> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS)
            .map(|t| {
                let engine = &engine;
                let cap = &cap;
                let id = &id;
                scope.spawn(move || {
                    let caller = Principal::new(format!("worker-{t}"));
                    (0..PER_THREAD)
                        .map(|i| {
                            let blob = cap.encrypt(t * 1000 + i, &caller, engine.principal());
                            engine.submit(&caller, id, &blob).unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect()
    });

    let total_submissions = THREADS * PER_THREAD;
    let distinct: BTreeSet<u64> = counts.iter().copied().collect();
    assert_eq!(distinct.len() as u64, total_submissions, "no two folds saw the same count");
    assert_eq!(distinct.first(), Some(&1));
    assert_eq!(distinct.last(), Some(&total_submissions));
    assert_eq!(engine.submission_count(&id), total_submissions);

    let expected: u64 = (0..THREADS)
        .flat_map(|t| (0..PER_THREAD).map(move |i| t * 1000 + i))
        .sum();
    let handle = engine.accumulator_handle(&id).unwrap();
    assert_eq!(cap.decrypt(&handle, engine.principal()).unwrap(), expected);
    assert_eq!(cap.access_faults(), 0);
}

#[test]
fn racing_implicit_creation_yields_one_bucket() {
    let (engine, cap) = ledger();
    let id = BucketId::from_label("fresh").unwrap();
    let mut rx = engine.subscribe();

    std::thread::scope(|scope| {
        for t in 0..THREADS {
            let engine = &engine;
            let cap = &cap;
            let id = &id;
            scope.spawn(move || {
                let caller = Principal::new(format!("racer-{t}"));
                let blob = cap.encrypt(1, &caller, engine.principal());
                engine.submit(&caller, id, &blob).unwrap();
            });
        }
    });

    assert_eq!(engine.submission_count(&id), THREADS);
    assert_eq!(engine.summaries().len(), 1);

    let mut created = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, cagg_ledger::LedgerEvent::Created { .. }) {
            created += 1;
        }
    }
    assert_eq!(created, 1);
}

#[test]
fn disclosure_races_with_submissions() {
    let (engine, cap) = ledger();
    let id = BucketId::from_label("racy").unwrap();
    engine.init(&id).unwrap();

    let accepted: u64 = std::thread::scope(|scope| {
        let submitter = scope.spawn(|| {
            let caller = Principal::new("steady");
            (0..50)
                .filter(|_| {
                    let blob = cap.encrypt(1, &caller, engine.principal());
                    engine.submit(&caller, &id, &blob).is_ok()
                })
                .count() as u64
        });
        scope.spawn(|| engine.make_public(&id).unwrap());
        submitter.join().unwrap()
    });

    // Submissions after disclosure are refused, so the public sum is the
    // count of accepted ones.
    let handle = engine.accumulator_handle(&id).unwrap();
    assert_eq!(engine.submission_count(&id), accepted);
    assert_eq!(cap.public_decrypt(&handle).unwrap(), accepted);
}
