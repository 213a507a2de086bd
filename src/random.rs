//! Randomness used by the k-means++ seeding.
//!
//! The seeding only needs two kinds of draws: a uniform index and a uniform number in [0, 1).
//! [RandomSource] abstracts over them so that a seeded generator ([RngSource]) and a replay of
//! fixed draws ([ScriptedSource]) can be used interchangeably.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

use crate::types::{PointCount, PointIdx};

/// A source of the random draws made during seeding.
pub trait RandomSource {
    /// Returns a uniformly distributed number in [0, 1).
    fn next_unit(&mut self) -> f64;

    /// Returns a uniformly distributed index in 0..n. n must be positive.
    fn next_index(&mut self, n: PointCount) -> PointIdx {
        let idx = (self.next_unit() * n as f64) as PointIdx;
        idx.min(n - 1)
    }
}

/// Adapter turning any [rand::Rng] into a [RandomSource].
#[derive(Debug, Clone)]
pub struct RngSource<R: Rng> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> RngSource<R> {
        RngSource { rng }
    }
}

impl RngSource<StdRng> {
    /// A reproducible source: equal seeds give equal draws.
    pub fn seeded(seed: u64) -> RngSource<StdRng> {
        RngSource::new(StdRng::seed_from_u64(seed))
    }

    /// A source seeded from the operating system; every call gives different draws.
    pub fn from_entropy() -> RngSource<StdRng> {
        RngSource::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn next_index(&mut self, n: PointCount) -> PointIdx {
        self.rng.gen_range(0..n)
    }
}

/// Replays a fixed list of draws in [0, 1), e.g. to make seeding fully predictable in tests.
/// Once the list is exhausted every further draw returns 0.0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: VecDeque<f64>,
}

impl ScriptedSource {
    pub fn new(draws: Vec<f64>) -> ScriptedSource {
        ScriptedSource { draws: draws.into() }
    }

    /// Returns the number of draws not consumed yet.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(0.0)
    }
}
