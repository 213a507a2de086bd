use crate::types::{Coordinate, Distance, Position};
use crate::distance::squared_distance_unchecked;
use crate::types::CenterIdx;

/// Rounds value to the given number of decimal places, ties to the even neighbour.
pub fn round_to_decimals(value: Coordinate, decimals: u32) -> Coordinate {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

/// Renders a position as comma-separated coordinates with exactly `decimals` decimal places.
///
/// # Example
/// ```rust
/// use kmeans_pp::utilities::format_position;
/// assert_eq!(format_position(&[0.0, 0.5, 10.123456], 4), "0.0000,0.5000,10.1235");
/// ```
pub fn format_position(position: &[Coordinate], decimals: u32) -> String {
    position
        .iter()
        .map(|&c| format!("{:.*}", decimals as usize, round_to_decimals(c, decimals)))
        .collect::<Vec<String>>()
        .join(",")
}

/// Returns the index of the centroid closest to point together with the squared distance.
/// Ties are broken in favour of the lower index (strict comparison).
///
/// centroids must not be empty.
pub(crate) fn nearest_centroid(point: &[Coordinate], centroids: &[Position]) -> (CenterIdx, Distance) {
    let mut best_idx: CenterIdx = 0;
    let mut best_dist = squared_distance_unchecked(point, &centroids[0]);
    for (c, centroid) in centroids.iter().enumerate().skip(1) {
        let d = squared_distance_unchecked(point, centroid);
        if d < best_dist {
            best_dist = d;
            best_idx = c;
        }
    }
    (best_idx, best_dist)
}
