//! Probability-gated branching
//!
//! Load-style runs only take some optional steps some of the time. The
//! decision is injected so a test can force every branch either way.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Decides whether an optional step runs
pub trait Decider: Send + Sync {
    /// `probability` is clamped to `[0, 1]`
    fn should_run(&self, probability: f64) -> bool;
}

/// Seeded pseudo-random decisions, reproducible per iteration
#[derive(Debug)]
pub struct SeededDecider {
    rng: Mutex<StdRng>,
}

impl SeededDecider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// One decider per iteration, derived from a run seed
    pub fn for_iteration(run_seed: u64, iteration: u64) -> Self {
        Self::new(run_seed ^ iteration.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

impl Decider for SeededDecider {
    fn should_run(&self, probability: f64) -> bool {
        let probability = clamp(probability);
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_bool(probability),
            Err(poisoned) => poisoned.into_inner().gen_bool(probability),
        }
    }
}

/// Every optional step runs
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDecider;

impl Decider for AlwaysDecider {
    fn should_run(&self, _probability: f64) -> bool {
        true
    }
}

/// No optional step runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverDecider;

impl Decider for NeverDecider {
    fn should_run(&self, _probability: f64) -> bool {
        false
    }
}

fn clamp(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

/// Run `f` when the decider says so
pub fn with_probability<D, F, T>(decider: &D, probability: f64, f: F) -> Option<T>
where
    D: Decider + ?Sized,
    F: FnOnce() -> T,
{
    decider.should_run(probability).then(f)
}
