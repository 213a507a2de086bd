//! k-means clustering with k-means++ seeding and Lloyd refinement.
//!
//! The engine takes a [PointSet], a number of clusters k and a bound max_iter on the number of
//! refinement rounds. It first chooses k seeds by k-means++ (distance-weighted sampling, see
//! [seeding]) and then runs Lloyd's algorithm (see [lloyd]) until no centroid moves anymore or
//! max_iter rounds are done.
//!
//! ```rust
//! use kmeans_pp::{cluster, PointSet};
//! let points = PointSet::by_ndpoints(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]]).unwrap();
//! let clustering = cluster(&points, 2, 100).unwrap();
//! assert_eq!(clustering.k(), 2);
//! assert_eq!(clustering.dim(), 2);
//! ```
//!
//! Points can be loaded with [PointSet::by_file] or by joining two keyed tables with
//! [input::load_joined]. With the cargo feature `python` the crate also builds a python module.

pub mod types;
use types::{Distance, DurationInSec, IterationCount, PointCount};

mod error;
pub use error::{KMeansError, Result};

pub mod space;
pub use space::PointSet;

mod distance;
pub use distance::squared_distance;

pub mod random;
pub use random::{RandomSource, RngSource, ScriptedSource};

mod clustering;
pub use clustering::{Centers, Clustering, Termination};

pub mod seeding;
pub use seeding::kmeans_pp_seeding;

pub mod lloyd;
pub use lloyd::{Refiner, RefinerState};

pub mod assertions;
use assertions::assert_clustering_problem;

pub mod elbow;
pub mod input;
pub mod utilities;

#[cfg(feature = "python")]
mod python_interface;

use rayon::{ThreadPool, ThreadPoolBuilder};

/// Number of refinement rounds if none is given.
pub const DEFAULT_MAX_ITER: IterationCount = 300;
/// Seed used by the command line tool if none is given.
pub const DEFAULT_SEED: u64 = 0;
/// Number of decimal places of rendered centroids.
pub const OUTPUT_DECIMALS: u32 = 4;

/// The parameters of a k-means run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringProblem {
    pub k: PointCount, // number of clusters; 1 <= k < n
    pub max_iter: IterationCount, // maximal number of Assigning+Updating rounds; >= 1
}

impl ClusteringProblem {
    pub fn new(k: PointCount) -> ClusteringProblem {
        ClusteringProblem {
            k,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

/// Optional parameters; None picks the default.
/// * seed: seed of the k-means++ draws (default: drawn from the operating system);
/// * thread_count: number of threads for the parallel scans (default: number of cores);
/// * tolerance: a round counts as a change only if the summed squared centroid shift reaches
///   this value (default: 0.0, i.e. any changed coordinate counts).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionalParameters {
    pub seed: Option<u64>,
    pub thread_count: Option<usize>,
    pub tolerance: Option<Distance>,
}

/// Clusters the points into k groups with at most max_iter refinement rounds, using a fresh
/// random seed and all cores.
///
/// # Errors
///
/// Returns [KMeansError::InvalidArgument] unless 1 <= k < n and max_iter >= 1.
pub fn cluster(space: &PointSet, k: PointCount, max_iter: IterationCount) -> Result<Clustering> {
    let prob = ClusteringProblem { k, max_iter };
    let (clustering, _) = compute_kmeans_pp_clustering(space, &prob, None)?;
    Ok(clustering)
}

/// Computes a k-means clustering: k-means++ seeding followed by Lloyd refinement.
/// Returns the clustering together with the running time in seconds.
///
/// # Errors
///
/// Returns [KMeansError::InvalidArgument] if the problem does not fit the data (see
/// [assertions::assert_clustering_problem]) or the tolerance is invalid, and
/// [KMeansError::ThreadPool] if the worker threads cannot be started.
pub fn compute_kmeans_pp_clustering(
    space: &PointSet,
    prob: &ClusteringProblem,
    optional: Option<OptionalParameters>,
) -> Result<(Clustering, DurationInSec)> {
    let optional = optional.unwrap_or_default();
    let start = std::time::Instant::now();

    let clustering = match optional.seed {
        Some(seed) => compute_clustering_with_source(space, prob, &mut RngSource::seeded(seed), optional.thread_count, optional.tolerance),
        None => compute_clustering_with_source(space, prob, &mut RngSource::from_entropy(), optional.thread_count, optional.tolerance),
    }?;

    let total_time = start.elapsed().as_secs_f64();
    tracing::info!(
        "k-means with k = {} on {} points finished after {} rounds ({:?}) in {:.4} sec.",
        prob.k,
        space.n(),
        clustering.iterations(),
        clustering.termination(),
        total_time
    );
    Ok((clustering, total_time))
}

/// Same as [compute_kmeans_pp_clustering], but with the random draws of the seeding taken from
/// rng.
pub fn compute_clustering_with_source<R: RandomSource + Send + ?Sized>(
    space: &PointSet,
    prob: &ClusteringProblem,
    rng: &mut R,
    thread_count: Option<usize>,
    tolerance: Option<Distance>,
) -> Result<Clustering> {
    assert_clustering_problem(space, prob)?;
    let thread_pool = build_thread_pool(thread_count)?;

    thread_pool.install(|| {
        //////////////////////////////////////////////////
        // seeding: choose k initial centers by k-means++ //
        //////////////////////////////////////////////////
        let seeds = kmeans_pp_seeding(space, prob.k, rng);
        tracing::info!("** Seeding: determined k = {} seeds by k-means++: {}", prob.k, seeds);

        ////////////////////////////////////////////////////
        // refinement: Lloyd rounds until nothing changes //
        ////////////////////////////////////////////////////
        let refiner = Refiner::new(space, seeds.positions(space), prob.max_iter, tolerance.unwrap_or(0.0))?;
        let clustering = refiner.run(seeds);
        tracing::info!(
            "** Refinement: {} rounds, cluster sizes {:?}",
            clustering.iterations(),
            clustering.get_cluster_sizes()
        );
        Ok(clustering)
    })
}

fn build_thread_pool(thread_count: Option<usize>) -> Result<ThreadPool> {
    let threads = match thread_count {
        Some(t) if t > 0 => t,
        _ => num_cpus::get(),
    };
    Ok(ThreadPoolBuilder::new().num_threads(threads).build()?)
}

#[cfg(feature = "python")]
use pyo3::prelude::{pymodule, PyModule, PyResult, Python};

/// Python module: the legacy `fit` function and the `KMeansPP` class.
#[cfg(feature = "python")]
#[pymodule]
fn kmeans_pp(py: Python, m: &PyModule) -> PyResult<()> {
    python_interface::register(py, m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_points() -> PointSet {
        PointSet::by_ndpoints(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]]).unwrap()
    }

    #[test]
    fn returns_k_centroids_of_dimension_d() {
        let space = PointSet::new_random(200, 5).unwrap();
        for k in [1, 2, 7, 199] {
            let clustering = cluster(&space, k, 50).unwrap();
            assert_eq!(clustering.k(), k);
            assert!(clustering.get_centroids().iter().all(|c| c.len() == 5));
            assert_eq!(clustering.get_assignment().len(), 200);
            assert_eq!(clustering.get_seeds().m(), k);
        }
    }

    #[test]
    fn invalid_problems_are_rejected_before_any_work() {
        let space = four_points();
        for (k, max_iter) in [(0, 10), (4, 10), (5, 10), (2, 0)] {
            match cluster(&space, k, max_iter) {
                Err(KMeansError::InvalidArgument(_)) => {}
                other => panic!("k = {}, max_iter = {}: expected invalid argument, got {:?}", k, max_iter, other),
            }
        }
        let prob = ClusteringProblem { k: 2, max_iter: 10 };
        let optional = OptionalParameters {
            tolerance: Some(-1.0),
            ..Default::default()
        };
        assert!(compute_kmeans_pp_clustering(&space, &prob, Some(optional)).is_err());
    }

    #[test]
    fn two_groups_are_found_from_cross_group_seeds() {
        let space = four_points();
        // k-means++ picks the second seed from the other group with probability 200/202 at
        // least; these seeds do
        for seed in 0..20 {
            let prob = ClusteringProblem { k: 2, max_iter: 100 };
            let optional = OptionalParameters {
                seed: Some(seed),
                ..Default::default()
            };
            let (clustering, _) = compute_kmeans_pp_clustering(&space, &prob, Some(optional)).unwrap();
            let seeds: Vec<usize> = clustering.get_seeds().iter().copied().collect();
            if (seeds[0] < 2) == (seeds[1] < 2) {
                continue; // both seeds in one group: Lloyd keeps the local optimum
            }
            let mut centroids = clustering.rounded_centroids(OUTPUT_DECIMALS);
            centroids.sort_by(|a, b| a[0].partial_cmp(&b[0]).unwrap());
            assert_eq!(centroids, vec![vec![0.0, 0.5], vec![10.0, 0.5]]);
            assert!(clustering.converged());
        }
    }

    #[test]
    fn scripted_seeding_drives_the_engine() {
        let space = four_points();
        // uniform 0.0 -> point 0; distances 0, 1, 100, 101; u = 0.5 -> threshold 101 -> point 2 (cumulative 101 is not > 101) -> point 3
        let mut rng = ScriptedSource::new(vec![0.0, 0.5]);
        let prob = ClusteringProblem { k: 2, max_iter: 100 };
        let clustering = compute_clustering_with_source(&space, &prob, &mut rng, Some(1), None).unwrap();
        assert_eq!(clustering.get_seeds(), &Centers::new(vec![0, 3]));
        assert_eq!(clustering.get_centroids(), &[vec![0.0, 0.5], vec![10.0, 0.5]]);
        assert_eq!(clustering.to_string(), "0.0000,0.5000\n10.0000,0.5000");
    }

    #[test]
    fn k_next_to_n_terminates() {
        let space = PointSet::by_ndpoints(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![5.0, 5.0], vec![9.0, 1.0]]).unwrap();
        for seed in 0..25 {
            let prob = ClusteringProblem { k: 4, max_iter: 30 };
            let optional = OptionalParameters {
                seed: Some(seed),
                thread_count: Some(2),
                ..Default::default()
            };
            let (clustering, _) = compute_kmeans_pp_clustering(&space, &prob, Some(optional)).unwrap();
            assert_eq!(clustering.k(), 4);
            assert!(clustering.iterations() <= 30);
            assert!(clustering.get_centroids().iter().flatten().all(|x| x.is_finite()));
            // four distinct seeds, so four distinct centroids
            let mut seeds: Vec<usize> = clustering.get_seeds().iter().copied().collect();
            seeds.sort();
            seeds.dedup();
            assert_eq!(seeds.len(), 4);
        }
    }

    #[test]
    fn equal_seeds_give_equal_results() {
        let space = PointSet::new_random(500, 3).unwrap();
        let prob = ClusteringProblem { k: 6, max_iter: 300 };
        let optional = OptionalParameters {
            seed: Some(DEFAULT_SEED),
            ..Default::default()
        };
        let (a, _) = compute_kmeans_pp_clustering(&space, &prob, Some(optional.clone())).unwrap();
        let (b, _) = compute_kmeans_pp_clustering(
            &space,
            &prob,
            Some(OptionalParameters {
                thread_count: Some(1),
                ..optional
            }),
        )
        .unwrap();
        assert_eq!(a.get_seeds(), b.get_seeds());
        assert_eq!(a.get_centroids(), b.get_centroids());
    }
}
