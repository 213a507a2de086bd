//! Elbow diagnostic: the inertia of the k-means result for a range of k.
//!
//! Plotting the curve is left to external tools; [save_to_file] writes it as `k,inertia` lines.

use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use crate::error::Result;
use crate::space::PointSet;
use crate::types::{Distance, IterationCount, PointCount};
use crate::{compute_kmeans_pp_clustering, ClusteringProblem, OptionalParameters};

/// Largest k tried by the command line tool.
pub const ELBOW_MAX_K: PointCount = 10;

/// The inertia of the clustering computed for one k.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElbowPoint {
    pub k: PointCount,
    pub inertia: Distance,
}

impl fmt::Display for ElbowPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{:.4}", self.k, self.inertia)
    }
}

/// Clusters the points for every k in 1..=min(max_k, n-1) and returns the inertia of each result.
/// All runs share the same optional parameters, in particular the same seed.
///
/// # Errors
///
/// Fails if a single run fails, e.g. for max_iter = 0.
pub fn elbow_curve(
    space: &PointSet,
    max_k: PointCount,
    max_iter: IterationCount,
    optional: Option<OptionalParameters>,
) -> Result<Vec<ElbowPoint>> {
    let last_k = max_k.min(space.n().saturating_sub(1));
    let mut curve = Vec::with_capacity(last_k);
    for k in 1..=last_k {
        let prob = ClusteringProblem { k, max_iter };
        let (clustering, _) = compute_kmeans_pp_clustering(space, &prob, optional.clone())?;
        let inertia = clustering.inertia(space);
        tracing::debug!("elbow: k = {} has inertia {}", k, inertia);
        curve.push(ElbowPoint { k, inertia });
    }
    Ok(curve)
}

/// Writes the curve to file_path, one `k,inertia` line per point.
pub fn save_to_file<P: AsRef<Path>>(curve: &[ElbowPoint], file_path: P) -> Result<()> {
    let mut f = File::create(file_path)?;
    for p in curve {
        writeln!(f, "{}", p)?;
    }
    Ok(())
}
