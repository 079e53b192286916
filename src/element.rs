//! Structuring elements for the morphology operations
//!
//! A structuring element is the list of integer offset vectors forming a
//! metric ball of a given radius. Generation enumerates the bounding cube of
//! side `2r + 1` and keeps the offsets the metric admits; elements are
//! memoized per packer by `(metric, radius, dimension)`.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::metric::Metric;

/// Exact cell count of the 3-D Manhattan ball of radius `r` (centered
/// octahedral number), used to preallocate.
fn manhattan_ball_3d(r: u64) -> usize {
    ((4 * r * r * r + 6 * r * r + 8 * r + 3) / 3) as usize
}

/// All offsets within radius `r` of the origin under `metric`, in
/// lexicographic order from `-r` per axis. Always contains the zero vector.
pub fn structuring_element(metric: Metric, r: u32, dimensions: usize) -> Vec<Vec<i32>> {
    let side = 2 * r as u64 + 1;
    let cube = side.pow(dimensions as u32) as usize;
    let mut out = match (metric, dimensions) {
        (Metric::Chebyshev, _) => Vec::with_capacity(cube),
        (Metric::Manhattan, 3) if r <= 100 => Vec::with_capacity(manhattan_ball_3d(r as u64)),
        _ => Vec::new(),
    };
    let mut offset = vec![-(r as i32); dimensions];
    loop {
        if metric.within_grid_distance(r, &offset) {
            out.push(offset.clone());
        }
        // odometer over the bounding cube
        let mut axis = dimensions;
        loop {
            if axis == 0 {
                return out;
            }
            axis -= 1;
            if offset[axis] < r as i32 {
                offset[axis] += 1;
                break;
            }
            offset[axis] = -(r as i32);
        }
    }
}

/// Memoized structuring elements, keyed by `(metric, radius, dimension)`.
#[derive(Debug, Default)]
pub(crate) struct ElementCache {
    cache: Mutex<FxHashMap<(Metric, u32, usize), Arc<Vec<Vec<i32>>>>>,
}

impl ElementCache {
    pub(crate) fn get(&self, metric: Metric, r: u32, dimensions: usize) -> Arc<Vec<Vec<i32>>> {
        let mut cache = self.cache.lock();
        cache
            .entry((metric, r, dimensions))
            .or_insert_with(|| Arc::new(structuring_element(metric, r, dimensions)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_ball_is_the_full_cube() {
        assert_eq!(structuring_element(Metric::Chebyshev, 1, 2).len(), 9);
        assert_eq!(structuring_element(Metric::Chebyshev, 2, 3).len(), 125);
    }

    #[test]
    fn manhattan_ball_sizes() {
        // 2-D diamonds: 2r^2 + 2r + 1
        assert_eq!(structuring_element(Metric::Manhattan, 1, 2).len(), 5);
        assert_eq!(structuring_element(Metric::Manhattan, 2, 2).len(), 13);
        // 3-D octahedra match the closed form
        for r in 0..5u64 {
            assert_eq!(
                structuring_element(Metric::Manhattan, r as u32, 3).len(),
                manhattan_ball_3d(r)
            );
        }
    }

    #[test]
    fn euclidean_balls() {
        // radius 1 relaxed keeps the diagonals in 2-D
        assert_eq!(structuring_element(Metric::Euclidean, 1, 2).len(), 9);
        assert_eq!(structuring_element(Metric::EuclideanStrict, 1, 2).len(), 5);
        // radius 2 relaxed: all offsets with d^2 <= 6.25
        let ball = structuring_element(Metric::Euclidean, 2, 2);
        assert!(ball.contains(&vec![2, 1]));
        assert!(!ball.contains(&vec![2, 2]));
    }

    #[test]
    fn zero_radius_is_just_the_origin() {
        for m in [
            Metric::Chebyshev,
            Metric::Manhattan,
            Metric::Euclidean,
            Metric::EuclideanStrict,
        ] {
            assert_eq!(structuring_element(m, 0, 3), vec![vec![0, 0, 0]]);
        }
    }

    #[test]
    fn cache_shares_instances() {
        let cache = ElementCache::default();
        let a = cache.get(Metric::Manhattan, 2, 2);
        let b = cache.get(Metric::Manhattan, 2, 2);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 13);
    }
}
