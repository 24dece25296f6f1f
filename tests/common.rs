//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use naive_bayes_ttt::{Dataset, InferenceConfig, Posterior, PosteriorEstimator};

/// A short, seeded run that still leaves enough draws for moment checks.
pub fn quick_config(seed: u64) -> InferenceConfig {
    InferenceConfig::default()
        .with_seed(seed)
        .with_samples(1_500)
        .with_burn_in(300)
}

pub fn fit(dataset: &Dataset, seed: u64) -> Posterior {
    PosteriorEstimator::new(quick_config(seed))
        .expect("valid config")
        .fit(dataset)
        .expect("fit should succeed")
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{what}: expected {expected} +/- {tolerance}, got {actual}"
    );
}
