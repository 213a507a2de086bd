/// Type of the number of points (and of the number of centers).
pub type PointCount = usize;
/// Type of the number of coordinates of a point.
pub type Dimension = usize;
/// Type of a single coordinate.
pub type Coordinate = f64;
/// Type of a (squared) distance between two points.
pub type Distance = f64;
/// Type of the number of refinement rounds.
pub type IterationCount = usize;
/// Type of the measured running time.
pub type DurationInSec = f64;

/// A position in D-dimensional space, e.g. a centroid.
pub type Position = Vec<Coordinate>;

pub type PointIdx = usize;
pub type CenterIdx = usize;
