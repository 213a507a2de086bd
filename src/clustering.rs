//////////////////////////////////////////////////////////////
//////////////////// module: clustering //////////////////////
//////////////////////////////////////////////////////////////

/// Contains the two result types of the engine:
///
/// Centers: the point indices chosen as initial centroids by the k-means++ seeding.
/// Clustering: final centroids, the assignment of points to them and how the refinement ended.
use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use crate::error::Result;
use crate::space::PointSet;
use crate::types::{CenterIdx, Dimension, Distance, IterationCount, PointCount, PointIdx, Position};
use crate::utilities::{format_position, nearest_centroid, round_to_decimals};
use crate::OUTPUT_DECIMALS;

/// An ordered list of centers, given by point indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Centers {
    centers: Vec<PointIdx>,
}

impl Centers {
    pub fn new(centers: Vec<PointIdx>) -> Centers {
        Centers { centers }
    }

    /// Creates a new empty list of centers. The capacity is used to allocate enough storage on the
    /// heap.
    pub fn with_capacity(capacity: PointCount) -> Centers {
        Centers {
            centers: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of centers m.
    pub fn m(&self) -> PointCount {
        self.centers.len()
    }

    /// Return the center of index i (from 0 to m-1)
    pub fn get(&self, i: CenterIdx) -> PointIdx {
        self.centers[i]
    }

    /// Adds a new center to the list.
    pub fn push(&mut self, c: PointIdx) {
        self.centers.push(c);
    }

    /// Provides an iterator of the centers.
    pub fn iter(&self) -> std::slice::Iter<'_, PointIdx> {
        self.centers.iter()
    }

    /// Returns the coordinates of the centers, in order.
    pub fn positions(&self, space: &PointSet) -> Vec<Position> {
        self.centers.iter().map(|&c| space.point(c).to_vec()).collect()
    }

    /// Save the centers to a file specified by file_path.
    /// The output file only contains one line containing the index of the centers separated by a
    /// comma.
    ///
    /// Example:
    ///
    /// ```txt
    /// 0,19,38,29,8,17
    /// ```
    pub fn save_to_file<P: AsRef<Path>>(&self, file_path: P) -> Result<()> {
        let mut f = File::create(file_path)?;
        f.write_all(self.to_string().as_bytes())?;
        Ok(())
    }
}

impl fmt::Display for Centers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut iter = self.centers.iter();
        if let Some(c) = iter.next() {
            write!(f, "{}", c)?;
        }
        for c in iter {
            write!(f, ",{}", c)?;
        }
        Ok(())
    }
}

/// How the refinement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The last round changed no centroid.
    Converged,
    /// max_iter rounds were performed and the last one still changed a centroid.
    Exhausted,
}

/// The result of a k-means run: k centroids (at full precision), the assignment of every point
/// to a centroid as computed in the last round, and bookkeeping about the run.
#[derive(Debug, Clone)]
pub struct Clustering {
    seeds: Centers,
    centroids: Vec<Position>,
    assignment: Vec<CenterIdx>, // assignment[x] is the centroid point x was assigned to in the last round
    iterations: IterationCount,
    termination: Termination,
}

impl Clustering {
    pub(crate) fn new(
        seeds: Centers,
        centroids: Vec<Position>,
        assignment: Vec<CenterIdx>,
        iterations: IterationCount,
        termination: Termination,
    ) -> Clustering {
        Clustering {
            seeds,
            centroids,
            assignment,
            iterations,
            termination,
        }
    }

    /// Returns the point indices the refinement was started from.
    pub fn get_seeds(&self) -> &Centers {
        &self.seeds
    }

    pub fn get_centroids(&self) -> &[Position] {
        &self.centroids
    }

    pub fn get_assignment(&self) -> &[CenterIdx] {
        &self.assignment
    }

    /// Returns the number of centroids.
    pub fn k(&self) -> PointCount {
        self.centroids.len()
    }

    pub fn dim(&self) -> Dimension {
        self.centroids.first().map_or(0, |c| c.len())
    }

    /// Returns the number of Assigning+Updating rounds performed.
    pub fn iterations(&self) -> IterationCount {
        self.iterations
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Returns for each centroid the number of points assigned to it.
    pub fn get_cluster_sizes(&self) -> Vec<PointCount> {
        let mut sizes = vec![0; self.k()];
        for &c in self.assignment.iter() {
            sizes[c] += 1;
        }
        sizes
    }

    /// Returns the sum over all points of the squared distance to the nearest final centroid.
    /// space must be the point set the clustering was computed on.
    pub fn inertia(&self, space: &PointSet) -> Distance {
        space
            .point_iter()
            .map(|p| nearest_centroid(p, &self.centroids).1)
            .sum()
    }

    /// Returns the centroids rounded to the given number of decimal places.
    pub fn rounded_centroids(&self, decimals: u32) -> Vec<Position> {
        self.centroids
            .iter()
            .map(|c| c.iter().map(|&x| round_to_decimals(x, decimals)).collect())
            .collect()
    }

    /// Saves the centroids to the text-file specified by file_path, in the same format as the
    /// [fmt::Display] implementation: one centroid per line, coordinates rounded to 4 decimal
    /// places and separated by a comma.
    ///
    /// Example:
    /// ```txt
    /// 0.0000,0.5000
    /// 10.0000,0.5000
    /// ```
    pub fn save_to_file<P: AsRef<Path>>(&self, file_path: P) -> Result<()> {
        let mut f = File::create(file_path)?;
        f.write_all(self.to_string().as_bytes())?;
        Ok(())
    }
}

impl fmt::Display for Clustering {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut iter = self.centroids.iter();
        if let Some(c) = iter.next() {
            write!(f, "{}", format_position(c, OUTPUT_DECIMALS))?;
        }
        for c in iter {
            write!(f, "\n{}", format_position(c, OUTPUT_DECIMALS))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_clusters() -> (PointSet, Clustering) {
        let space = PointSet::by_ndpoints(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]]).unwrap();
        let clustering = Clustering::new(
            Centers::new(vec![0, 2]),
            vec![vec![0.0, 0.5], vec![10.0, 0.5]],
            vec![0, 0, 1, 1],
            2,
            Termination::Converged,
        );
        (space, clustering)
    }

    #[test]
    fn centers_render_as_index_list() {
        let mut centers = Centers::with_capacity(3);
        assert_eq!(centers.to_string(), "");
        centers.push(4);
        centers.push(0);
        centers.push(17);
        assert_eq!(centers.m(), 3);
        assert_eq!(centers.get(2), 17);
        assert_eq!(centers.to_string(), "4,0,17");
    }

    #[test]
    fn clustering_renders_legacy_format() {
        let (_, clustering) = two_clusters();
        assert_eq!(clustering.to_string(), "0.0000,0.5000\n10.0000,0.5000");
    }

    #[test]
    fn sizes_and_inertia() {
        let (space, clustering) = two_clusters();
        assert_eq!(clustering.get_cluster_sizes(), vec![2, 2]);
        assert_eq!(clustering.inertia(&space), 1.0);
        assert_eq!(clustering.k(), 2);
        assert_eq!(clustering.dim(), 2);
        assert!(clustering.converged());
    }

    #[test]
    fn rounding_only_affects_the_copy() {
        let clustering = Clustering::new(
            Centers::new(vec![0]),
            vec![vec![1.0 / 3.0, 2.0 / 3.0]],
            vec![0],
            1,
            Termination::Exhausted,
        );
        assert_eq!(clustering.rounded_centroids(4), vec![vec![0.3333, 0.6667]]);
        assert_eq!(clustering.get_centroids()[0][0], 1.0 / 3.0);
    }
}
