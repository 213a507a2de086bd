use crate::error::{KMeansError, Result};
use crate::space::PointSet;
use crate::ClusteringProblem;

/// Checks the parameters of a clustering problem that do not depend on the data.
///
/// # Errors
/// Returns [KMeansError::InvalidArgument] if
/// * k is 0;
/// * max_iter is 0.
pub fn assert_problem_parameters(prob: &ClusteringProblem) -> Result<()> {
    if prob.k < 1 {
        return Err(KMeansError::InvalidArgument(format!(
            "We have k = {}! There should be at least one cluster.",
            prob.k
        )));
    }
    if prob.max_iter < 1 {
        return Err(KMeansError::InvalidArgument(format!(
            "We have max_iter = {}! At least one refinement round is needed.",
            prob.max_iter
        )));
    }
    Ok(())
}

/// Asserts a clustering problem against the data it is run on.
/// If this check passes the engine will return a clustering with k centroids.
///
/// # Errors
/// Returns [KMeansError::InvalidArgument] if [assert_problem_parameters] fails or if k is not
/// smaller than the number of points n.
pub fn assert_clustering_problem(space: &PointSet, prob: &ClusteringProblem) -> Result<()> {
    assert_problem_parameters(prob)?;
    if prob.k >= space.n() {
        return Err(KMeansError::InvalidArgument(format!(
            "We have n <= k ({} <= {})! We need more points than clusters.",
            space.n(),
            prob.k
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prob(k: usize, max_iter: usize) -> ClusteringProblem {
        ClusteringProblem { k, max_iter }
    }

    #[test]
    fn parameters() {
        assert!(assert_problem_parameters(&prob(1, 1)).is_ok());
        assert!(assert_problem_parameters(&prob(0, 10)).is_err());
        assert!(assert_problem_parameters(&prob(3, 0)).is_err());
    }

    #[test]
    fn k_must_be_smaller_than_n() {
        let space = PointSet::new_random(5, 2).unwrap();
        assert!(assert_clustering_problem(&space, &prob(4, 100)).is_ok());
        assert!(assert_clustering_problem(&space, &prob(5, 100)).is_err());
        assert!(assert_clustering_problem(&space, &prob(6, 100)).is_err());
        assert!(matches!(
            assert_clustering_problem(&space, &prob(0, 100)),
            Err(KMeansError::InvalidArgument(_))
        ));
    }
}
