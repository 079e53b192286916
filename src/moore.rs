//! Moore curve: a closed loop of Hilbert sub-cubes
//!
//! The box is tiled with Hilbert cubes of side `s`: a Gray-coded ring of
//! `2^(n-1)` half-plane positions across the non-stretch axes, each running a
//! boustrophedon of `k` cubes along the stretch axis. Sub-cubes sit reflected
//! or translated so that consecutive cubes meet face to face, which makes the
//! whole traversal a cycle: the last point is an orthogonal neighbor of the
//! first.

use crate::bits::{gray, gray_inverse};
use crate::curve::{Curve, CurveTables, DEFAULT_STORE_LIMIT};
use crate::error::{Error, Result};
use crate::hilbert::{hilbert_distance, hilbert_point_into};

/// Hard cap on the curve length, leaving headroom in the bitmap index domain.
const MAX_LENGTH: u64 = 1 << 30;

/// Looping Moore curve built from `2^(n-1) * k` Hilbert sub-cubes of side
/// `side`, stretched to `k` cubes along `stretch_axis`.
///
/// The bounding box is `2 * side` on every axis except the stretch axis, which
/// spans `side * stretch`.
#[derive(Debug, Clone)]
pub struct MooreCurve {
    dims: Vec<i32>,
    offsets: Vec<i32>,
    side: i32,
    bits: u32,
    stretch_axis: usize,
    stretch: u32,
    max_distance: u32,
    tables: Option<CurveTables>,
}

impl MooreCurve {
    /// Classic Moore loop: stretch factor 2 makes the box a cube of side
    /// `2 * side`.
    pub fn new(dimension: usize, side: i32, stretch_axis: usize) -> Result<Self> {
        let offsets = vec![0i32; dimension];
        Self::with_store_limit(dimension, side, stretch_axis, 2, &offsets, DEFAULT_STORE_LIMIT)
    }

    /// Stretched loop of `stretch >= 1` sub-cube layers along the stretch axis.
    pub fn with_stretch(
        dimension: usize,
        side: i32,
        stretch_axis: usize,
        stretch: u32,
    ) -> Result<Self> {
        let offsets = vec![0i32; dimension];
        Self::with_store_limit(
            dimension,
            side,
            stretch_axis,
            stretch,
            &offsets,
            DEFAULT_STORE_LIMIT,
        )
    }

    /// Full-control constructor.
    pub fn with_store_limit(
        dimension: usize,
        side: i32,
        stretch_axis: usize,
        stretch: u32,
        offsets: &[i32],
        store_limit: u32,
    ) -> Result<Self> {
        if !(2..=31).contains(&dimension) {
            return Err(Error::InvalidDimension(dimension));
        }
        if side < 2 || side.count_ones() != 1 {
            return Err(Error::InvalidSide(side));
        }
        if stretch_axis >= dimension {
            return Err(Error::StretchAxisOutOfRange {
                axis: stretch_axis,
                dimension,
            });
        }
        if stretch == 0 {
            return Err(Error::InvalidArgument(
                "stretch factor must be at least 1".into(),
            ));
        }
        if offsets.len() != dimension {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                got: offsets.len(),
            });
        }
        let length = (2 * side as u64).pow(dimension as u32 - 1) * stretch as u64 * side as u64;
        if length > MAX_LENGTH {
            return Err(Error::CapacityExceeded { length });
        }
        let max_distance = length as u32;
        let bits = side.trailing_zeros();
        let dims: Vec<i32> = (0..dimension)
            .map(|a| {
                if a == stretch_axis {
                    side * stretch as i32
                } else {
                    side * 2
                }
            })
            .collect();
        let mut curve = Self {
            dims,
            offsets: offsets.to_vec(),
            side,
            bits,
            stretch_axis,
            stretch,
            max_distance,
            tables: None,
        };
        if max_distance <= store_limit {
            let walker = curve.clone();
            curve.tables = Some(CurveTables::build(&curve.dims, max_distance, |d, buf| {
                walker.raw_point(d, buf);
            }));
        }
        Ok(curve)
    }

    /// Side length of the Hilbert sub-cubes.
    pub fn side(&self) -> i32 {
        self.side
    }

    /// Whether the lookup tables were precomputed.
    pub fn stored(&self) -> bool {
        self.tables.is_some()
    }

    /// Offset-free forward map.
    fn raw_point(&self, d: u32, buf: &mut [i32]) {
        let n = self.dims.len() as u32;
        let s = self.side;
        let k = self.stretch;
        let h = d & ((1u32 << (self.bits * n)) - 1);
        let sector = d >> (self.bits * n);
        let mut minor = [0i32; 32];
        hilbert_point_into(n, self.bits, h, &mut minor[..n as usize]);
        let arrange = gray(sector * 2 / k);
        let group = sector / k;
        let layer = (sector % k) as i32;
        for j in 0..n as usize {
            let axis = (self.stretch_axis + 1 + j) % n as usize;
            buf[axis] = if axis == self.stretch_axis {
                if group % 2 == 0 {
                    s * layer + minor[j]
                } else {
                    s * (k as i32 - layer) - 1 - minor[j]
                }
            } else if (arrange >> (n - 1 - j as u32)) & 1 == 1 {
                s + minor[j]
            } else {
                s - 1 - minor[j]
            };
        }
    }

    /// Offset-free inverse map; coordinates must already be in range.
    fn raw_distance(&self, coords: &[i32]) -> u32 {
        let n = self.dims.len() as u32;
        let s = self.side;
        let k = self.stretch as i32;
        let mut minor = [0i32; 32];
        let mut arrange = 0u32;
        for j in 0..(n as usize - 1) {
            let axis = (self.stretch_axis + 1 + j) % n as usize;
            let c = coords[axis];
            minor[j] = if c >= s {
                arrange |= 1 << (n - 1 - j as u32);
                c - s
            } else {
                s - 1 - c
            };
        }
        let group = gray_inverse(arrange) >> 1;
        let along = coords[self.stretch_axis];
        let reduced = if group % 2 == 0 {
            along
        } else {
            s * k - 1 - along
        };
        minor[n as usize - 1] = reduced % s;
        let bonus = group * self.stretch + (reduced / s) as u32;
        let h = hilbert_distance(n, self.bits, &minor[..n as usize]);
        (bonus << (self.bits * n)) | h
    }
}

impl Curve for MooreCurve {
    fn dimensionality(&self) -> &[i32] {
        &self.dims
    }

    fn offsets(&self) -> &[i32] {
        &self.offsets
    }

    fn max_distance(&self) -> u32 {
        self.max_distance
    }

    fn alter<'a>(&self, buf: &'a mut [i32], d: u32) -> &'a mut [i32] {
        let d = d.min(self.max_distance - 1);
        match &self.tables {
            Some(t) => t.point_into(d, buf),
            None => self.raw_point(d, buf),
        }
        for (c, off) in buf.iter_mut().zip(&self.offsets) {
            *c += off;
        }
        buf
    }

    fn distance(&self, coords: &[i32]) -> i64 {
        let n = self.dims.len();
        if coords.len() != n {
            return -1;
        }
        let mut local = [0i32; 32];
        for a in 0..n {
            let c = coords[a] - self.offsets[a];
            if c < 0 || c >= self.dims[a] {
                return -1;
            }
            local[a] = c;
        }
        let local = &local[..n];
        match &self.tables {
            Some(t) => t.distance(&self.dims, local) as i64,
            None => self.raw_distance(local) as i64,
        }
    }

    fn coordinate(&self, d: u32, dim: usize) -> i32 {
        let n = self.dims.len();
        let dim = dim % n;
        let d = d.min(self.max_distance - 1);
        match &self.tables {
            Some(t) => t.coordinate(d, dim) + self.offsets[dim],
            None => self.point(d)[dim],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_loop(curve: &MooreCurve) {
        let max = curve.max_distance();
        let mut seen = vec![false; max as usize];
        let mut prev = curve.point(max - 1);
        for d in 0..max {
            let p = curve.point(d);
            assert_eq!(curve.distance(&p), d as i64, "bijection broke at {}", d);
            let flat = crate::bounds::bounded_index(curve.dimensionality(), &p);
            assert!(!seen[flat as usize], "cell revisited at {}", d);
            seen[flat as usize] = true;
            let moved: i32 = p.iter().zip(&prev).map(|(a, b)| (a - b).abs()).sum();
            assert_eq!(moved, 1, "step into {} is not a unit move", d);
            prev = p;
        }
        assert!(seen.iter().all(|&v| v));
    }

    #[test]
    fn classic_loop_2d() {
        check_loop(&MooreCurve::new(2, 4, 0).unwrap());
        check_loop(&MooreCurve::new(2, 8, 1).unwrap());
    }

    #[test]
    fn classic_loop_3d() {
        check_loop(&MooreCurve::new(3, 2, 0).unwrap());
        check_loop(&MooreCurve::new(3, 4, 2).unwrap());
    }

    #[test]
    fn stretched_loops() {
        check_loop(&MooreCurve::with_stretch(2, 4, 0, 1).unwrap());
        check_loop(&MooreCurve::with_stretch(2, 4, 1, 3).unwrap());
        check_loop(&MooreCurve::with_stretch(2, 4, 0, 5).unwrap());
        check_loop(&MooreCurve::with_stretch(3, 2, 1, 4).unwrap());
    }

    #[test]
    fn box_shape_follows_stretch() {
        let curve = MooreCurve::with_stretch(3, 4, 1, 3).unwrap();
        assert_eq!(curve.dimensionality(), &[8, 12, 8]);
        assert_eq!(curve.max_distance(), 8 * 12 * 8);
    }

    #[test]
    fn stored_and_unstored_agree() {
        let stored = MooreCurve::new(2, 8, 0).unwrap();
        let unstored =
            MooreCurve::with_store_limit(2, 8, 0, 2, &[0, 0], 0).unwrap();
        assert!(stored.stored());
        assert!(!unstored.stored());
        for d in 0..stored.max_distance() {
            assert_eq!(stored.point(d), unstored.point(d));
        }
    }

    #[test]
    fn offsets_shift_the_box() {
        let curve =
            MooreCurve::with_store_limit(2, 4, 0, 2, &[100, 200], DEFAULT_STORE_LIMIT).unwrap();
        let p = curve.point(11);
        assert!(p[0] >= 100 && p[0] < 108);
        assert!(p[1] >= 200 && p[1] < 208);
        assert_eq!(curve.distance(&p), 11);
        assert_eq!(curve.distance(&[0, 0]), -1);
    }

    #[test]
    fn constructor_validation() {
        assert!(matches!(
            MooreCurve::new(2, 4, 2),
            Err(Error::StretchAxisOutOfRange { .. })
        ));
        assert!(matches!(
            MooreCurve::new(2, 5, 0),
            Err(Error::InvalidSide(5))
        ));
        assert!(matches!(
            MooreCurve::with_stretch(2, 4, 0, 0),
            Err(Error::InvalidArgument(_))
        ));
        // (2 * 2^14)^2 * ... overflows the 2^30 cap
        assert!(matches!(
            MooreCurve::new(2, 1 << 15, 0),
            Err(Error::CapacityExceeded { .. })
        ));
    }
}
