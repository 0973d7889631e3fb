//! Engine regression tests
//!
//! End-to-end scenarios over the durable sled store: record, auto-retrain,
//! predict, and survive a restart.

use std::sync::Arc;

use fitadvisor::config::MlConfig;
use fitadvisor::ml_engine::CoachEngine;
use fitadvisor::storage::{RuleStore, SledMlStore};
use fitadvisor::{train_kmeans, Sample};

fn make_engine(store: Arc<SledMlStore>, retrain_every: u64) -> CoachEngine {
    CoachEngine::new(
        store.clone(),
        store,
        MlConfig {
            retrain_every,
            ..MlConfig::default()
        },
    )
}

/// Two well-separated activity populations, 10 samples each.
fn feed_two_populations(engine: &CoachEngine) -> Vec<bool> {
    let mut retrains = Vec::new();
    for i in 0..10u32 {
        let outcome = engine
            .record_sample(1000.0 + f64::from(i) * 50.0, 70.0 + f64::from(i % 3))
            .unwrap();
        retrains.push(outcome.retrained);
    }
    for i in 0..10u32 {
        let outcome = engine
            .record_sample(12000.0 + f64::from(i) * 100.0, 150.0 + f64::from(i % 4))
            .unwrap();
        retrains.push(outcome.retrained);
    }
    retrains
}

#[test]
fn test_auto_retrain_on_twentieth_sample_and_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SledMlStore::open(dir.path()).unwrap());
    let engine = make_engine(store.clone(), 20);

    let default_steps: Vec<f64> = store
        .read()
        .unwrap()
        .clusters
        .iter()
        .map(|r| r.steps)
        .collect();

    let retrains = feed_two_populations(&engine);
    let fired: Vec<usize> = retrains
        .iter()
        .enumerate()
        .filter_map(|(i, &r)| r.then_some(i + 1))
        .collect();
    assert_eq!(fired, vec![20]);

    // Learned centroids replaced the defaults
    let learned = store.read().unwrap();
    let learned_steps: Vec<f64> = learned.clusters.iter().map(|r| r.steps).collect();
    assert_ne!(default_steps, learned_steps);
    assert!(learned_steps.windows(2).all(|w| w[0] < w[1]));
    for rule in &learned.clusters {
        assert!((rule.target_steps - (rule.steps + 1000.0)).abs() < 1e-9);
        assert!(rule.steps.is_finite() && rule.avg_hr.is_finite());
    }

    // Survives a restart
    drop(engine);
    drop(store);
    let reopened = SledMlStore::open(dir.path()).unwrap();
    let table = reopened.read().unwrap();
    let reopened_steps: Vec<f64> = table.clusters.iter().map(|r| r.steps).collect();
    assert_eq!(learned_steps, reopened_steps);
    assert_eq!(fitadvisor::SampleStore::count(&reopened).unwrap(), 20);
}

#[test]
fn test_prediction_tracks_retrained_centroids() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SledMlStore::open(dir.path()).unwrap());
    let engine = make_engine(store, 0);

    feed_two_populations(&engine);
    engine.retrain_now().unwrap();

    // Low-activity observation lands in the lowest cluster, the most
    // extreme observation in the highest
    let low = engine.predict(1100.0, 71.0).unwrap();
    let high = engine.predict(12900.0, 153.0).unwrap();
    assert_eq!(low, 1);
    assert_eq!(high, 3);
}

#[test]
fn test_trainer_is_deterministic_across_calls() {
    let samples: Vec<Sample> = [
        (1000.0, 70.0),
        (1000.0, 72.0),
        (9000.0, 140.0),
        (9500.0, 145.0),
        (15000.0, 160.0),
    ]
    .iter()
    .map(|&(steps, hr)| Sample::new(steps, hr))
    .collect();

    let a = train_kmeans(&samples, 3, 30, 42).unwrap();
    let b = train_kmeans(&samples, 3, 30, 42).unwrap();
    assert_eq!(a.len(), 3);
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.steps.to_bits(), y.steps.to_bits());
        assert_eq!(x.avg_hr.to_bits(), y.avg_hr.to_bits());
    }
}

#[test]
fn test_manual_retrain_error_surfaces_with_sparse_log() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SledMlStore::open(dir.path()).unwrap());
    let engine = make_engine(store, 0);

    engine.record_sample(5000.0, 100.0).unwrap();
    let err = engine.retrain_now().unwrap_err();
    assert!(matches!(
        err,
        fitadvisor::EngineError::InsufficientData { needed: 3, got: 1 }
    ));
}
