use crate::error::{KMeansError, Result};
use crate::types::{Coordinate, Distance};

/// Returns the squared Euclidean distance between a and b.
///
/// The per-coordinate squared differences are summed in coordinate order; no square root is
/// taken, as only the ordering of distances and their sums are needed.
///
/// # Errors
///
/// Returns [KMeansError::DimensionMismatch] if a and b have different lengths.
///
/// # Example
/// ```rust
/// use kmeans_pp::squared_distance;
/// assert_eq!(squared_distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap(), 25.0);
/// assert!(squared_distance(&[0.0], &[3.0, 4.0]).is_err());
/// ```
pub fn squared_distance(a: &[Coordinate], b: &[Coordinate]) -> Result<Distance> {
    if a.len() != b.len() {
        return Err(KMeansError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(squared_distance_unchecked(a, b))
}

/// Same as [squared_distance] for callers that already guarantee equal lengths (e.g. two rows
/// of the same PointSet).
#[inline]
pub(crate) fn squared_distance_unchecked(a: &[Coordinate], b: &[Coordinate]) -> Distance {
    debug_assert_eq!(a.len(), b.len());
    let mut d: Distance = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let diff = x - y;
        d += diff * diff;
    }
    d
}
