use rayon::prelude::*;

use crate::clustering::Centers;
use crate::distance::squared_distance_unchecked;
use crate::random::RandomSource;
use crate::space::PointSet;
use crate::types::{Distance, PointCount, PointIdx};

/// The outcome of a single weighted draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Draw {
    /// The index was drawn proportional to the weights.
    Weighted(PointIdx),
    /// All weights were zero, so the index was drawn uniformly.
    UniformFallback(PointIdx),
}

impl Draw {
    pub(crate) fn idx(self) -> PointIdx {
        match self {
            Draw::Weighted(x) | Draw::UniformFallback(x) => x,
        }
    }
}

/// Draws an index with probability proportional to its weight.
///
/// A number u in [0,1) is drawn and the first index whose cumulative weight exceeds u * total is
/// returned, so indices of weight zero are never drawn. If the total weight is zero (or not
/// finite) the distribution is degenerate and a uniform index is drawn instead.
pub(crate) fn weighted_draw<R: RandomSource + ?Sized>(weights: &[Distance], rng: &mut R) -> Draw {
    let total: Distance = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return Draw::UniformFallback(rng.next_index(weights.len()));
    }

    let threshold = rng.next_unit() * total;
    let mut cumulative: Distance = 0.0;
    let mut last_positive: Option<PointIdx> = None;
    for (x, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            cumulative += w;
            last_positive = Some(x);
            if cumulative > threshold {
                return Draw::Weighted(x);
            }
        }
    }

    // only reachable if u * total rounded up to total
    match last_positive {
        Some(x) => Draw::Weighted(x),
        None => Draw::UniformFallback(rng.next_index(weights.len())),
    }
}

/// k-means++ seeding: determines k centers, the first uniformly at random, every further one
/// with probability proportional to the squared distance to the closest center chosen so far.
///
/// The per-point distance refresh runs on the current rayon pool; the draws themselves are
/// sequential, so the result only depends on the draws of rng.
///
/// Requires 1 <= k <= space.n().
pub fn kmeans_pp_seeding<R: RandomSource + ?Sized>(space: &PointSet, k: PointCount, rng: &mut R) -> Centers {
    debug_assert!(k >= 1 && k <= space.n(), "k = {} out of range for n = {}", k, space.n());
    let mut seeds = Centers::with_capacity(k);

    let first_center = rng.next_index(space.n());
    seeds.push(first_center);
    tracing::debug!("seed 0: point {} (uniform)", first_center);

    // current squared distance of each point to the set of already determined centers
    let mut dist_x_center: Vec<Distance> = {
        let center = space.point(first_center);
        space
            .par_point_iter()
            .map(|p| squared_distance_unchecked(p, center))
            .collect()
    };

    for i in 1..k {
        let draw = weighted_draw(&dist_x_center, rng);
        let new_center = draw.idx();
        match draw {
            Draw::Weighted(_) => tracing::debug!("seed {}: point {} (weight {})", i, new_center, dist_x_center[new_center]),
            Draw::UniformFallback(_) => tracing::warn!(
                "seed {}: all points coincide with a chosen center; drew point {} uniformly",
                i,
                new_center
            ),
        }
        seeds.push(new_center);

        if i + 1 < k {
            // as the distance to centers 0..i-1 is known, we only need to measure distance to the newest center
            let center = space.point(new_center);
            dist_x_center
                .par_iter_mut()
                .zip(space.par_point_iter())
                .for_each(|(d, p)| {
                    let dist_to_newest_center = squared_distance_unchecked(p, center);
                    if dist_to_newest_center < *d {
                        *d = dist_to_newest_center;
                    }
                });
        }
    }
    seeds
}
