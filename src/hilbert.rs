//! N-dimensional Hilbert curve
//!
//! The closed-form bijection follows the Butz/Lawder formulation: per order
//! step an n-bit block of the distance is Gray-coded and rotated through the
//! running entry/direction state, scattering one bit into each coordinate.
//! [`HilbertCurve`] wraps the engine behind the [`Curve`] trait, switches to
//! the specialised 2-D implementation when the dimension is 2, and precomputes
//! full lookup tables for curves short enough to store.

use crate::bits::{gray, gray_inverse, rot_left, rot_right, trailing_ones};
use crate::curve::{Curve, CurveTables, DEFAULT_STORE_LIMIT};
use crate::error::{Error, Result};
use crate::hilbert2d;

#[inline]
const fn low_mask(w: u32) -> u32 {
    (1u32 << w) - 1
}

/// Entry point of sub-cube `x` in the Gray-code traversal.
#[inline]
fn entry(x: u32) -> u32 {
    if x == 0 {
        0
    } else {
        gray(2 * ((x - 1) / 2))
    }
}

/// Direction of sub-cube `x` within an n-bit word.
#[inline]
fn direction(x: u32, n: u32) -> u32 {
    let x = x & low_mask(n);
    if x == 0 {
        0
    } else if x % 2 == 0 {
        trailing_ones(x - 1, n) % n
    } else {
        trailing_ones(x, n) % n
    }
}

/// Engine forward map: distance to offset-free point, any 2 <= n <= 31.
pub(crate) fn hilbert_point_into(n: u32, order: u32, d: u32, out: &mut [i32]) {
    for c in out.iter_mut() {
        *c = 0;
    }
    let mut e = 0u32;
    let mut dir = 0u32;
    for i in 0..order {
        let w = (d >> ((order - 1 - i) * n)) & low_mask(n);
        let l = rot_left(gray(w), dir + 1, n) ^ e;
        for axis in 0..n {
            let bit = (l >> (n - 1 - axis)) & 1;
            out[axis as usize] |= (bit << (order - 1 - i)) as i32;
        }
        e ^= rot_left(entry(w), dir + 1, n);
        dir = (dir + direction(w, n) + 1) % n;
    }
}

/// Engine inverse map: offset-free in-range point to distance.
pub(crate) fn hilbert_distance(n: u32, order: u32, coords: &[i32]) -> u32 {
    let mut d = 0u32;
    let mut e = 0u32;
    let mut dir = 0u32;
    for i in 0..order {
        let mut l = 0u32;
        for axis in 0..n {
            let bit = ((coords[axis as usize] as u32) >> (order - 1 - i)) & 1;
            l |= bit << (n - 1 - axis);
        }
        l = rot_right((l ^ e) & low_mask(n), dir + 1, n);
        let w = gray_inverse(l);
        e ^= rot_left(entry(w), dir + 1, n);
        dir = (dir + direction(w, n) + 1) % n;
        d = (d << n) | w;
    }
    d
}

/// Internal dispatcher selecting the 2-D fast path or the generic engine.
#[derive(Debug, Clone, Copy)]
enum Mapper {
    TwoD,
    Nd,
}

/// Cubic n-dimensional Hilbert curve of side `2^order`.
///
/// # Example
///
/// ```rust
/// use curvepack::{Curve, HilbertCurve};
///
/// let curve = HilbertCurve::new(2, 64).unwrap();
/// assert_eq!(curve.max_distance(), 4096);
/// let p = curve.point(17);
/// assert_eq!(curve.distance(&p), 17);
/// ```
#[derive(Debug, Clone)]
pub struct HilbertCurve {
    dims: Vec<i32>,
    offsets: Vec<i32>,
    order: u32,
    max_distance: u32,
    mapper: Mapper,
    tables: Option<CurveTables>,
}

impl HilbertCurve {
    /// Curve with zero offsets and the default table-store threshold.
    pub fn new(dimension: usize, side: i32) -> Result<Self> {
        let offsets = vec![0i32; dimension];
        Self::with_store_limit(dimension, side, &offsets, DEFAULT_STORE_LIMIT)
    }

    /// Curve whose coordinates are shifted per axis by `offsets`.
    pub fn with_offsets(dimension: usize, side: i32, offsets: &[i32]) -> Result<Self> {
        Self::with_store_limit(dimension, side, offsets, DEFAULT_STORE_LIMIT)
    }

    /// Full-control constructor; curves no longer than `store_limit` precompute
    /// their lookup tables.
    pub fn with_store_limit(
        dimension: usize,
        side: i32,
        offsets: &[i32],
        store_limit: u32,
    ) -> Result<Self> {
        if !(2..=31).contains(&dimension) {
            return Err(Error::InvalidDimension(dimension));
        }
        if side < 2 || side.count_ones() != 1 {
            return Err(Error::InvalidSide(side));
        }
        if offsets.len() != dimension {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                got: offsets.len(),
            });
        }
        let order = side.trailing_zeros();
        let bits = order as u64 * dimension as u64;
        if bits > 31 {
            return Err(Error::CapacityExceeded {
                length: (side as u64).pow(dimension as u32),
            });
        }
        let max_distance = 1u32 << bits;
        let mapper = if dimension == 2 {
            Mapper::TwoD
        } else {
            Mapper::Nd
        };
        let dims = vec![side; dimension];
        let n = dimension as u32;
        let tables = if max_distance <= store_limit {
            Some(CurveTables::build(&dims, max_distance, |d, buf| {
                raw_point(mapper, n, order, d, buf)
            }))
        } else {
            None
        };
        Ok(Self {
            dims,
            offsets: offsets.to_vec(),
            order,
            max_distance,
            mapper,
            tables,
        })
    }

    /// Order (log2 of the side) of the curve.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Whether the lookup tables were precomputed.
    pub fn stored(&self) -> bool {
        self.tables.is_some()
    }
}

#[inline]
fn raw_point(mapper: Mapper, n: u32, order: u32, d: u32, buf: &mut [i32]) {
    match mapper {
        Mapper::TwoD => hilbert2d::point_into(order, d, buf),
        Mapper::Nd => hilbert_point_into(n, order, d, buf),
    }
}

impl Curve for HilbertCurve {
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
            None => raw_point(self.mapper, self.dims.len() as u32, self.order, d, buf),
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
            None => match self.mapper {
                Mapper::TwoD => {
                    hilbert2d::distance(self.order, local[0] as u32, local[1] as u32) as i64
                }
                Mapper::Nd => hilbert_distance(n as u32, self.order, local) as i64,
            },
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
