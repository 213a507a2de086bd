use pyo3::create_exception;
use pyo3::prelude::{pyfunction, wrap_pyfunction, PyErr, PyModule, PyResult, Python};
use pyo3::proc_macro::{pyclass, pymethods};

use crate::error::KMeansError;
use crate::assertions::assert_problem_parameters;
use crate::clustering::Clustering;
use crate::lloyd::Refiner;
use crate::space::PointSet;
use crate::types::{CenterIdx, Coordinate, Distance, DurationInSec, IterationCount, PointCount, PointIdx, Position};
use crate::{compute_kmeans_pp_clustering, Centers, ClusteringProblem, OptionalParameters, DEFAULT_MAX_ITER};

create_exception!(kmeans_pp, InvalidArgumentError, pyo3::exceptions::PyException);
create_exception!(kmeans_pp, DimensionMismatchError, pyo3::exceptions::PyException);
create_exception!(kmeans_pp, ClusteringMissingError, pyo3::exceptions::PyException);

const NOCLUSTERING: &str = "No clustering computed yet. Run fit(data).";

impl From<KMeansError> for PyErr {
    fn from(err: KMeansError) -> PyErr {
        match err {
            KMeansError::DimensionMismatch { .. } => DimensionMismatchError::new_err(err.to_string()),
            KMeansError::Io(_) => pyo3::exceptions::PyIOError::new_err(err.to_string()),
            _ => InvalidArgumentError::new_err(err.to_string()),
        }
    }
}

/// Legacy entry point: refines the given initial centroids by Lloyd's algorithm and returns the
/// final centroids (full precision).
///
/// num_points and num_coordinates must match the shape of data_points, k the number of initial
/// centroids.
#[pyfunction]
fn fit(
    data_points: Vec<Vec<Coordinate>>,
    initial_centroids: Vec<Vec<Coordinate>>,
    k: PointCount,
    max_iter: IterationCount,
    num_points: PointCount,
    num_coordinates: usize,
) -> PyResult<Vec<Position>> {
    if data_points.len() != num_points {
        return Err(InvalidArgumentError::new_err(format!(
            "num_points = {} but {} data points were given",
            num_points,
            data_points.len()
        )));
    }
    if initial_centroids.len() != k {
        return Err(InvalidArgumentError::new_err(format!(
            "k = {} but {} initial centroids were given",
            k,
            initial_centroids.len()
        )));
    }
    let space = PointSet::by_ndpoints(data_points)?;
    if space.dim() != num_coordinates {
        return Err(DimensionMismatchError::new_err(format!(
            "num_coordinates = {} but the data points have {} coordinates",
            num_coordinates,
            space.dim()
        )));
    }
    assert_problem_parameters(&ClusteringProblem { k, max_iter })?;

    let seeds = Centers::new(Vec::new());
    let clustering = Refiner::new(&space, initial_centroids, max_iter, 0.0)?.run(seeds);
    Ok(clustering.get_centroids().to_vec())
}

/// k-means model: k-means++ seeding followed by Lloyd refinement.
#[pyclass]
pub(crate) struct KMeansPP {
    // parameters
    prob: ClusteringProblem,

    // data
    space: Option<PointSet>,

    // attributes
    clustering: Option<Clustering>,

    // information
    running_time: Option<DurationInSec>,
}

impl KMeansPP {
    fn get_clustering(&self) -> PyResult<&Clustering> {
        self.clustering
            .as_ref()
            .ok_or_else(|| ClusteringMissingError::new_err(NOCLUSTERING))
    }
}

#[pymethods]
impl KMeansPP {
    #[new]
    #[args(k, max_iter = "300")]
    fn new(k: PointCount, max_iter: IterationCount) -> PyResult<KMeansPP> {
        let prob = ClusteringProblem { k, max_iter };
        assert_problem_parameters(&prob)?;
        Ok(KMeansPP {
            prob,
            space: None,
            clustering: None,
            running_time: None,
        })
    }

    #[getter]
    fn get_k(&self) -> PointCount {
        self.prob.k
    }

    #[getter]
    fn get_max_iter(&self) -> IterationCount {
        self.prob.max_iter
    }

    /// Clusters the data. data is a 2d-array: a list of points, each a list of floats.
    ///
    /// # Optional input as keyword-arguments:
    /// * seed = 0 (seed of the k-means++ draws)
    /// * thread_count = #cores
    /// * tolerance = 0.0 (minimal summed squared centroid shift that counts as a change)
    ///
    /// Results can be accessed via model.centroids, model.labels and model.seeds.
    #[args(data, "*", seed = "0", thread_count = "0", tolerance = "0.0")]
    fn fit(&mut self, data: Vec<Vec<Coordinate>>, seed: u64, thread_count: usize, tolerance: Distance) -> PyResult<()> {
        self.clustering = None;
        self.running_time = None;
        let space = PointSet::by_ndpoints(data)?;

        let optional = OptionalParameters {
            seed: Some(seed),
            thread_count: match thread_count {
                0 => None,
                t => Some(t),
            },
            tolerance: Some(tolerance),
        };
        let (clustering, total_time) = compute_kmeans_pp_clustering(&space, &self.prob, Some(optional))?;
        self.space = Some(space);
        self.clustering = Some(clustering);
        self.running_time = Some(total_time);
        Ok(())
    }

    /// Returns the final centroids, one list of floats per cluster.
    #[getter]
    fn get_centroids(&self) -> PyResult<Vec<Position>> {
        Ok(self.get_clustering()?.get_centroids().to_vec())
    }

    /// Returns the cluster index (0,1,..,k-1) of each point.
    #[getter]
    fn get_labels(&self) -> PyResult<Vec<CenterIdx>> {
        Ok(self.get_clustering()?.get_assignment().to_vec())
    }

    /// Returns the point indices chosen by the k-means++ seeding.
    #[getter]
    fn get_seeds(&self) -> PyResult<Vec<PointIdx>> {
        Ok(self.get_clustering()?.get_seeds().iter().copied().collect())
    }

    #[getter]
    fn get_iterations(&self) -> PyResult<IterationCount> {
        Ok(self.get_clustering()?.iterations())
    }

    #[getter]
    fn get_converged(&self) -> PyResult<bool> {
        Ok(self.get_clustering()?.converged())
    }

    /// Returns the sum of squared distances of all points to their closest centroid.
    #[getter]
    fn get_inertia(&self) -> PyResult<Distance> {
        let clustering = self.get_clustering()?;
        match &self.space {
            Some(space) => Ok(clustering.inertia(space)),
            None => Err(ClusteringMissingError::new_err(NOCLUSTERING)),
        }
    }

    /// Return as float specifying the running time of the computation in sec.
    #[getter]
    fn get_running_time(&self) -> PyResult<DurationInSec> {
        self.running_time
            .ok_or_else(|| ClusteringMissingError::new_err(NOCLUSTERING))
    }

    /// Saves the centroids in a txt-file. One line per centroid, 4 decimal places.
    fn save_clustering_to_file(&self, file_path: &str) -> PyResult<()> {
        self.get_clustering()?.save_to_file(file_path)?;
        Ok(())
    }
}

pub(crate) fn register(py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<KMeansPP>()?;
    m.add_function(wrap_pyfunction!(fit, m)?)?;
    m.add("InvalidArgumentError", py.get_type::<InvalidArgumentError>())?;
    m.add("DimensionMismatchError", py.get_type::<DimensionMismatchError>())?;
    m.add("ClusteringMissingError", py.get_type::<ClusteringMissingError>())?;
    m.add("DEFAULT_MAX_ITER", DEFAULT_MAX_ITER)?;
    Ok(())
}
