//! Sampling service backing every stochastic operation in the crate
//!
//! The generator is an explicit handle rather than a process-wide global:
//! constructing a [`SampleSource`] is the seeding step, each solver owns its
//! own handle, and maze operations that draw samples take `&mut SampleSource`.
//! This makes tests deterministic and keeps independent runs independent.

use std::f64::consts::PI;

use rand::{Rng, SeedableRng, rngs::StdRng};

const TWO_PI: f64 = 2.0 * PI;

/// Pseudorandom source providing uniform, Bernoulli and normal samples.
#[derive(Debug, Clone)]
pub struct SampleSource {
    rng: StdRng,
    cached_normal: Option<f64>,
}

impl SampleSource {
    /// Create a source seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
            cached_normal: None,
        }
    }

    /// Create a deterministically seeded source.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            cached_normal: None,
        }
    }

    /// Create a source from an optional seed, falling back to entropy.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// A uniform sample from [0, 1).
    pub fn uniform01(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// A uniform integer sample from [min, max], both ends inclusive.
    pub fn discrete_uniform(&mut self, min: i64, max: i64) -> i64 {
        self.rng.random_range(min..=max)
    }

    /// A uniform index sample from [0, len).
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    /// A uniform continuous sample from [min, max].
    pub fn continuous_uniform(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.uniform01()
    }

    /// A Bernoulli sample with success probability `p`.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.uniform01() <= p
    }

    /// A Gaussian sample via the Box-Muller transform.
    ///
    /// Each transform yields two independent samples; the second is cached
    /// and returned by the next call.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if let Some(second) = self.cached_normal.take() {
            return second * std_dev + mean;
        }
        let mut first_fraction = self.uniform01();
        while first_fraction <= f64::MIN_POSITIVE {
            // Guard the logarithm against an underflowing draw.
            first_fraction = self.uniform01();
        }
        let second_fraction = self.uniform01();
        let radius = (-2.0 * first_fraction.ln()).sqrt();
        let angle = TWO_PI * second_fraction;
        self.cached_normal = Some(radius * angle.sin());
        radius * angle.cos() * std_dev + mean
    }
}
