//! Grid distance metrics
//!
//! The metric decides which offset vectors belong to a ball of a given radius,
//! which in turn shapes the structuring elements used by the morphology
//! operations ([`crate::RegionPacker::expand`] and friends).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Distance model on the integer grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Metric {
    /// L-infinity: `max(|d_i|) <= r`
    Chebyshev,
    /// L1: `sum(|d_i|) <= r`
    Manhattan,
    /// L2 with a rounded radius: `sum(d_i^2) <= (r + 1/2)^2`
    Euclidean,
    /// L2 with the exact radius: `sum(d_i^2) <= r^2`
    EuclideanStrict,
}

impl Metric {
    /// Whether the offset vector `delta` lies within radius `r` under this
    /// metric.
    ///
    /// The relaxed Euclidean test uses the exact integer form
    /// `4 * sum(d^2) <= 4r^2 + 4r + 1`.
    pub fn within_grid_distance(self, r: u32, delta: &[i32]) -> bool {
        let r = r as i64;
        match self {
            Metric::Chebyshev => delta.iter().all(|&d| (d as i64).abs() <= r),
            Metric::Manhattan => delta.iter().map(|&d| (d as i64).abs()).sum::<i64>() <= r,
            Metric::Euclidean => {
                let sq: i64 = delta.iter().map(|&d| (d as i64) * (d as i64)).sum();
                4 * sq <= 4 * r * r + 4 * r + 1
            }
            Metric::EuclideanStrict => {
                let sq: i64 = delta.iter().map(|&d| (d as i64) * (d as i64)).sum();
                sq <= r * r
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_is_max_norm() {
        assert!(Metric::Chebyshev.within_grid_distance(1, &[1, -1]));
        assert!(Metric::Chebyshev.within_grid_distance(2, &[2, 1, -2]));
        assert!(!Metric::Chebyshev.within_grid_distance(1, &[2, 0]));
    }

    #[test]
    fn manhattan_is_sum_norm() {
        assert!(Metric::Manhattan.within_grid_distance(2, &[1, -1]));
        assert!(!Metric::Manhattan.within_grid_distance(1, &[1, -1]));
        assert!(Metric::Manhattan.within_grid_distance(3, &[1, 1, -1]));
    }

    #[test]
    fn euclidean_rounds_the_radius() {
        // |(1,1)| = sqrt(2) <= 1.5, so the relaxed ball of radius 1 keeps it
        assert!(Metric::Euclidean.within_grid_distance(1, &[1, 1]));
        assert!(!Metric::EuclideanStrict.within_grid_distance(1, &[1, 1]));
        // |(2,1)| = sqrt(5) <= 2.5 but > 2: relaxed keeps it, strict drops it
        assert!(Metric::Euclidean.within_grid_distance(2, &[2, 1]));
        assert!(!Metric::EuclideanStrict.within_grid_distance(2, &[2, 1]));
        // |(2,2)| = sqrt(8) > 2.5 falls outside both radius-2 balls
        assert!(!Metric::Euclidean.within_grid_distance(2, &[2, 2]));
        assert!(Metric::Euclidean.within_grid_distance(2, &[2, 0, 0]));
        assert!(Metric::EuclideanStrict.within_grid_distance(2, &[2, 0, 0]));
    }

    #[test]
    fn zero_vector_is_always_inside() {
        for m in [
            Metric::Chebyshev,
            Metric::Manhattan,
            Metric::Euclidean,
            Metric::EuclideanStrict,
        ] {
            assert!(m.within_grid_distance(0, &[0, 0, 0]));
        }
    }
}
