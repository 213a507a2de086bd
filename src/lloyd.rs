use rayon::prelude::*;

use crate::clustering::{Centers, Clustering, Termination};
use crate::error::{KMeansError, Result};
use crate::space::PointSet;
use crate::types::{CenterIdx, Coordinate, Dimension, Distance, IterationCount, PointCount, Position};
use crate::utilities::nearest_centroid;

/// The states of the refinement. A call to [Refiner::step] walks through Assigning and Updating
/// and ends either in Assigning again (next round) or in Terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinerState {
    Assigning,
    Updating,
    Terminated(Termination),
}

/// Coordinate-wise sum and member count of one cluster. Only lives for a single round.
#[derive(Debug, Clone)]
struct Accumulator {
    sum: Vec<Coordinate>,
    count: PointCount,
}

impl Accumulator {
    fn new(dim: Dimension) -> Accumulator {
        Accumulator {
            sum: vec![0.0; dim],
            count: 0,
        }
    }

    fn add(&mut self, point: &[Coordinate]) {
        self.count += 1;
        for (s, x) in self.sum.iter_mut().zip(point.iter()) {
            *s += x;
        }
    }
}

/// Lloyd's algorithm on a fixed point set.
///
/// Each round assigns every point to its closest centroid (ties go to the lower index) and
/// moves every centroid that received points to the mean of its points. Centroids without
/// points stay where they are. The refinement terminates when a round changes nothing or after
/// max_iter rounds.
///
/// The nearest-centroid scan runs on the current rayon pool; sums are accumulated sequentially
/// in point order, so the result does not depend on the number of threads.
#[derive(Debug)]
pub struct Refiner<'a> {
    space: &'a PointSet,
    centroids: Vec<Position>,
    assignment: Vec<CenterIdx>,
    iteration: IterationCount,
    max_iter: IterationCount,
    tolerance: Distance,
    state: RefinerState,
    last_inertia: Option<Distance>,
}

impl<'a> Refiner<'a> {
    /// Creates a refiner starting at the given centroids.
    ///
    /// tolerance = 0.0 means a round counts as a change if any coordinate changed at all; a
    /// positive tolerance requires the summed squared shift of all centroids to reach it.
    ///
    /// # Errors
    ///
    /// Returns [KMeansError::InvalidArgument] if there are no centroids, if max_iter is 0 or if
    /// the tolerance is negative or not finite, and [KMeansError::DimensionMismatch] if a
    /// centroid does not have the dimension of the points.
    pub fn new(space: &'a PointSet, initial_centroids: Vec<Position>, max_iter: IterationCount, tolerance: Distance) -> Result<Refiner<'a>> {
        if initial_centroids.is_empty() {
            return Err(KMeansError::InvalidArgument("at least one initial centroid is needed".to_string()));
        }
        if max_iter == 0 {
            return Err(KMeansError::InvalidArgument("max_iter must be at least 1".to_string()));
        }
        if !(tolerance >= 0.0 && tolerance.is_finite()) {
            return Err(KMeansError::InvalidArgument(format!("tolerance must be a non-negative number, got {}", tolerance)));
        }
        if let Some(c) = initial_centroids.iter().find(|c| c.len() != space.dim()) {
            return Err(KMeansError::DimensionMismatch {
                left: c.len(),
                right: space.dim(),
            });
        }
        Ok(Refiner {
            space,
            centroids: initial_centroids,
            assignment: Vec::new(),
            iteration: 0,
            max_iter,
            tolerance,
            state: RefinerState::Assigning,
            last_inertia: None,
        })
    }

    pub fn state(&self) -> RefinerState {
        self.state
    }

    /// Returns the current centroids (full precision).
    pub fn centroids(&self) -> &[Position] {
        &self.centroids
    }

    /// Returns the assignment of the last round (empty before the first round).
    pub fn assignment(&self) -> &[CenterIdx] {
        &self.assignment
    }

    /// Returns the number of rounds performed so far.
    pub fn iteration(&self) -> IterationCount {
        self.iteration
    }

    /// Returns the sum of squared distances of all points to their closest centroid, measured
    /// during the assigning phase of the last round (i.e. before that round moved the centroids).
    pub fn last_inertia(&self) -> Option<Distance> {
        self.last_inertia
    }

    /// Performs one round (Assigning followed by Updating) and returns the new state.
    /// Does nothing if the refinement has already terminated.
    pub fn step(&mut self) -> RefinerState {
        if let RefinerState::Terminated(_) = self.state {
            return self.state;
        }

        self.state = RefinerState::Assigning;
        let accumulators = self.assign();

        self.state = RefinerState::Updating;
        let changed = self.update(accumulators);
        self.iteration += 1;

        self.state = if !changed {
            RefinerState::Terminated(Termination::Converged)
        } else if self.iteration >= self.max_iter {
            RefinerState::Terminated(Termination::Exhausted)
        } else {
            RefinerState::Assigning
        };

        tracing::debug!(
            "round {}: inertia before update {:?}, changed: {}, state: {:?}",
            self.iteration,
            self.last_inertia,
            changed,
            self.state
        );
        self.state
    }

    /// Runs rounds until the refinement terminates and returns the result.
    pub fn run(mut self, seeds: Centers) -> Clustering {
        let termination = loop {
            if let RefinerState::Terminated(t) = self.step() {
                break t;
            }
        };
        Clustering::new(seeds, self.centroids, self.assignment, self.iteration, termination)
    }

    /// Assigning: nearest centroid of every point, then per-centroid sums in point order.
    fn assign(&mut self) -> Vec<Accumulator> {
        let centroids = &self.centroids;
        let nearest: Vec<(CenterIdx, Distance)> = self
            .space
            .par_point_iter()
            .map(|p| nearest_centroid(p, centroids))
            .collect();

        let mut accumulators: Vec<Accumulator> = (0..centroids.len()).map(|_| Accumulator::new(self.space.dim())).collect();
        let mut inertia: Distance = 0.0;
        for (p, &(c, d)) in self.space.point_iter().zip(nearest.iter()) {
            accumulators[c].add(p);
            inertia += d;
        }

        self.assignment = nearest.into_iter().map(|(c, _)| c).collect();
        debug_assert_eq!(self.assignment.len(), self.space.n());
        debug_assert_eq!(accumulators.iter().map(|a| a.count).sum::<PointCount>(), self.space.n());
        self.last_inertia = Some(inertia);
        accumulators
    }

    /// Updating: move every centroid with members to their mean. Returns whether the round
    /// counts as a change.
    fn update(&mut self, accumulators: Vec<Accumulator>) -> bool {
        let mut changed = false;
        let mut total_shift: Distance = 0.0;
        for (c, (centroid, acc)) in self.centroids.iter_mut().zip(accumulators).enumerate() {
            if acc.count == 0 {
                tracing::trace!("centroid {} received no points and keeps its position", c);
                continue;
            }
            let count = acc.count as Coordinate;
            for (x, s) in centroid.iter_mut().zip(acc.sum) {
                let new_x = s / count;
                if new_x != *x {
                    changed = true;
                    let diff = new_x - *x;
                    total_shift += diff * diff;
                }
                *x = new_x;
            }
        }

        if self.tolerance > 0.0 {
            total_shift >= self.tolerance
        } else {
            changed
        }
    }
}
