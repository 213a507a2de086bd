///////////////////////////////////////////////////////////////
///////////////////// module: space ///////////////////////////
///////////////////////////////////////////////////////////////

/// Module space maintains the immutable point data the engine works on.
///
/// A [PointSet] stores N points of the same dimension D in one row-major buffer:
/// - The coordinates of a point can be obtained by point(x: PointIdx) -> &[Coordinate]
/// - All points can be iterated by point_iter() (or par_point_iter() within a rayon pool)
/// - The number of points can be obtained by n(), the dimension by dim()
///
/// Builder functions are by_ndpoints (a vector of rows), by_file (a text-file with one point
/// per line) and new_random.
use rayon::prelude::*;
use rand::Rng;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{KMeansError, Result};
use crate::types::{Coordinate, Dimension, PointCount, PointIdx, Position};

/// An immutable set of points in D-dimensional space.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    coordinates: Vec<Coordinate>, // row-major: point x occupies [x * dim, (x + 1) * dim)
    dim: Dimension,
}

impl PointSet {
    /// Creates a new [PointSet] from a vector of rows.
    ///
    /// # Errors
    ///
    /// Returns [KMeansError::InvalidArgument] if there are no points, if the points have no
    /// coordinates, if the rows differ in length or if a coordinate is not finite.
    ///
    /// # Example
    /// ```rust
    /// use kmeans_pp::PointSet;
    /// let points = PointSet::by_ndpoints(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0]]).unwrap();
    /// assert_eq!(points.n(), 3);
    /// assert_eq!(points.dim(), 2);
    /// assert_eq!(points.point(2), &[10.0, 0.0]);
    /// assert!(PointSet::by_ndpoints(vec![vec![0.0, 0.0], vec![1.0]]).is_err());
    /// ```
    pub fn by_ndpoints(positions: Vec<Position>) -> Result<PointSet> {
        let dim = match positions.first() {
            Some(first) => first.len(),
            None => return Err(KMeansError::InvalidArgument("the point set contains no points".to_string())),
        };
        let mut coordinates: Vec<Coordinate> = Vec::with_capacity(positions.len() * dim);
        for (x, position) in positions.into_iter().enumerate() {
            if position.len() != dim {
                return Err(KMeansError::InvalidArgument(format!(
                    "point {} has {} coordinates, but point 0 has {}",
                    x,
                    position.len(),
                    dim
                )));
            }
            coordinates.extend(position);
        }
        PointSet::by_flat(coordinates, dim)
    }

    /// Creates a new [PointSet] from a row-major buffer of coordinates.
    ///
    /// # Errors
    ///
    /// Same conditions as [PointSet::by_ndpoints]; additionally the buffer length must be a
    /// multiple of dim.
    pub fn by_flat(coordinates: Vec<Coordinate>, dim: Dimension) -> Result<PointSet> {
        if dim == 0 {
            return Err(KMeansError::InvalidArgument("points must have at least one coordinate".to_string()));
        }
        if coordinates.is_empty() {
            return Err(KMeansError::InvalidArgument("the point set contains no points".to_string()));
        }
        if coordinates.len() % dim != 0 {
            return Err(KMeansError::InvalidArgument(format!(
                "{} coordinates cannot be split into points of dimension {}",
                coordinates.len(),
                dim
            )));
        }
        if let Some(pos) = coordinates.iter().position(|c| !c.is_finite()) {
            return Err(KMeansError::InvalidArgument(format!(
                "coordinate {} of point {} is not finite ({})",
                pos % dim,
                pos / dim,
                coordinates[pos]
            )));
        }
        Ok(PointSet { coordinates, dim })
    }

    /// Creates a new [PointSet] with n random points in the [-100,100]^dim box.
    ///
    /// # Errors
    ///
    /// Returns [KMeansError::InvalidArgument] if n or dim is 0.
    pub fn new_random(n: PointCount, dim: Dimension) -> Result<PointSet> {
        let mut rng = rand::thread_rng();
        let coordinates = (0..n * dim).map(|_| rng.gen_range(-100.0..100.0)).collect();
        PointSet::by_flat(coordinates, dim)
    }

    /// Loads a new [PointSet] from a text-file. Each line holds the coordinates of one point,
    /// separated by a comma. Empty lines are skipped.
    ///
    /// Example:
    /// ```txt
    /// -8.19,-7.88
    /// -8.06,-6.58
    /// -7.3,-6.9
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, if a line cannot be parsed or if the
    /// resulting rows do not form a valid [PointSet].
    pub fn by_file<P: AsRef<Path>>(file_path: P) -> Result<PointSet> {
        let name = file_path.as_ref().display().to_string();
        let f = BufReader::new(File::open(file_path)?);
        let rows = crate::input::parse_rows(f, &name)?;
        let n = rows.len();
        let space = PointSet::by_ndpoints(rows)?;
        tracing::info!("loaded {} points of dimension {} from '{}'", n, space.dim(), name);
        Ok(space)
    }

    /// Return the number of points.
    pub fn n(&self) -> PointCount {
        self.coordinates.len() / self.dim
    }

    /// Return the number of coordinates of each point.
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    /// Returns the coordinates of point x.
    ///
    /// # Panics
    ///
    /// Panics if x >= n().
    pub fn point(&self, x: PointIdx) -> &[Coordinate] {
        &self.coordinates[x * self.dim..(x + 1) * self.dim]
    }

    /// Provides an iterator of all points in insertion order.
    pub fn point_iter(&self) -> std::slice::ChunksExact<'_, Coordinate> {
        self.coordinates.chunks_exact(self.dim)
    }

    /// Provides a parallel iterator of all points. Order is preserved by indexed operations such
    /// as collect.
    pub fn par_point_iter(&self) -> rayon::slice::ChunksExact<'_, Coordinate> {
        self.coordinates.par_chunks_exact(self.dim)
    }

    /// Returns a copy of all points as rows.
    pub fn get_positions(&self) -> Vec<Position> {
        self.point_iter().map(|p| p.to_vec()).collect()
    }
}
