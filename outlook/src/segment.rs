//! Splitting contours into polylines.

use crate::coords::Coordinate;

/// Splits a contour's coordinates into separate polylines at each sentinel.
///
/// Empty runs (between adjacent sentinels, or at either end) are dropped.
pub fn split_polylines(coords: &[Coordinate]) -> Vec<Vec<Coordinate>> {
    coords
        .split(|c| c.is_sentinel())
        .filter(|run| !run.is_empty())
        .map(|run| run.to_vec())
        .collect()
}
