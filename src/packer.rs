//! RegionPacker: the public region algebra
//!
//! A packer owns one [`Curve`] and performs every region operation directly on
//! compressed bitmaps of curve distances. Operations never mutate their
//! inputs; each returns a new region. Queries fail closed (false / -1 / empty)
//! rather than erroring; malformed bounds are the main error source.

use std::sync::Arc;

use rand::{Rng, RngExt};
use roaring::RoaringBitmap;
use rustc_hash::FxHashSet;

use crate::bounds::{bounded_index, validate_bounds};
use crate::curve::Curve;
use crate::element::ElementCache;
use crate::error::{Error, Result};
use crate::linear::LinearData;
use crate::metric::Metric;
use crate::rng::{random_element, random_range, random_samples};

/// A packed region: a compressed bitmap of curve distances.
pub type Region = RoaringBitmap;

/// Region algebra over one space-filling curve.
///
/// # Example
///
/// ```rust
/// use curvepack::{HilbertCurve, Metric, RegionPacker};
///
/// let packer = RegionPacker::new(Box::new(HilbertCurve::new(2, 64).unwrap()));
/// let room = packer.rectangle_at(&[10, 10], &[20, 20]).unwrap();
/// let ring = packer.fringe(&room, 1, &[64, 64], Metric::Chebyshev).unwrap();
/// assert_eq!(packer.count(&ring), 44);
/// ```
pub struct RegionPacker {
    curve: Box<dyn Curve>,
    all_off: Region,
    all_on: Region,
    elements: ElementCache,
}

impl RegionPacker {
    /// Packer owning `curve`. The `ALL_ON` sentinel covers the whole curve
    /// index range.
    pub fn new(curve: Box<dyn Curve>) -> Self {
        let mut all_on = Region::new();
        all_on.insert_range(0..curve.max_distance());
        Self {
            curve,
            all_off: Region::new(),
            all_on,
            elements: ElementCache::default(),
        }
    }

    /// The curve this packer linearizes through.
    pub fn curve(&self) -> &dyn Curve {
        self.curve.as_ref()
    }

    /// The empty sentinel region.
    pub fn all_off(&self) -> &Region {
        &self.all_off
    }

    /// The universal sentinel region (every curve distance set).
    pub fn all_on(&self) -> &Region {
        &self.all_on
    }

    #[inline]
    fn dims(&self) -> usize {
        self.curve.dimensionality().len()
    }

    // ------------------------------------------------------------------
    // Packing / unpacking

    /// Pack a row-major boolean array under `bounds` into a region.
    pub fn pack(&self, data: &[bool], bounds: &[i32]) -> Result<Region> {
        if data.is_empty() {
            return Err(Error::MissingData("pack requires a non-empty data array"));
        }
        let product = validate_bounds(bounds, self.dims())?;
        if data.len() as i64 != product {
            return Err(Error::InvalidArgument(format!(
                "data length {} does not match bounds product {}",
                data.len(),
                product
            )));
        }
        let mut out = Region::new();
        let mut buf = vec![0i32; self.dims()];
        for d in 0..self.curve.max_distance() {
            self.curve.alter(&mut buf, d);
            let idx = bounded_index(bounds, &buf);
            if idx >= 0 && data[idx as usize] {
                out.insert(d);
            }
        }
        Ok(out)
    }

    /// Pack a [`LinearData`] value.
    pub fn pack_linear(&self, linear: &LinearData) -> Result<Region> {
        self.pack(&linear.data, &linear.bounds)
    }

    /// Unpack a region into a row-major boolean array under `bounds`.
    pub fn unpack(&self, packed: &Region, bounds: &[i32]) -> Result<Vec<bool>> {
        let product = validate_bounds(bounds, self.dims())?;
        let mut out = vec![false; product as usize];
        let mut buf = vec![0i32; self.dims()];
        for d in packed.iter() {
            if d >= self.curve.max_distance() {
                break;
            }
            self.curve.alter(&mut buf, d);
            let idx = bounded_index(bounds, &buf);
            if idx >= 0 {
                out[idx as usize] = true;
            }
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Queries

    /// Whether the cell at `coords` is set. Out-of-range coordinates are
    /// false.
    pub fn query(&self, packed: &Region, coords: &[i32]) -> bool {
        let d = self.curve.distance(coords);
        d >= 0 && packed.contains(d as u32)
    }

    /// Whether curve distance `d` is set. Out-of-range distances are false.
    pub fn query_curve(&self, packed: &Region, d: u32) -> bool {
        d < self.curve.max_distance() && packed.contains(d)
    }

    /// Decoded positions of every set bit, in ascending curve order (the
    /// canonical iteration order of the library).
    pub fn positions(&self, packed: &Region) -> Vec<Vec<i32>> {
        packed
            .iter()
            .take_while(|&d| d < self.curve.max_distance())
            .map(|d| self.curve.point(d))
            .collect()
    }

    /// The raw sorted curve distances of every set bit.
    pub fn positions_curve(&self, packed: &Region) -> Vec<u32> {
        packed.iter().collect()
    }

    /// Number of set cells.
    pub fn count(&self, packed: &Region) -> u64 {
        packed.len()
    }

    // ------------------------------------------------------------------
    // Set algebra

    pub fn union(&self, a: &Region, b: &Region) -> Region {
        a | b
    }

    pub fn union_many<'a, I: IntoIterator<Item = &'a Region>>(&self, regions: I) -> Region {
        regions.into_iter().fold(Region::new(), |mut acc, r| {
            acc |= r;
            acc
        })
    }

    pub fn intersect(&self, a: &Region, b: &Region) -> Region {
        a & b
    }

    pub fn intersect_many<'a, I: IntoIterator<Item = &'a Region>>(&self, regions: I) -> Region {
        let mut it = regions.into_iter();
        match it.next() {
            None => Region::new(),
            Some(first) => it.fold(first.clone(), |mut acc, r| {
                acc &= r;
                acc
            }),
        }
    }

    pub fn xor(&self, a: &Region, b: &Region) -> Region {
        a ^ b
    }

    pub fn xor_many<'a, I: IntoIterator<Item = &'a Region>>(&self, regions: I) -> Region {
        regions.into_iter().fold(Region::new(), |mut acc, r| {
            acc ^= r;
            acc
        })
    }

    /// Cells of `a` not in `b`.
    pub fn difference(&self, a: &Region, b: &Region) -> Region {
        a - b
    }

    /// Logical NOT within the curve index range.
    pub fn negate(&self, a: &Region) -> Region {
        &self.all_on - a
    }

    /// Explicit cloning operator.
    pub fn copy(&self, a: &Region) -> Region {
        a.clone()
    }

    // ------------------------------------------------------------------
    // Translation and morphology

    /// Translate every cell by `movement`, clamping componentwise to
    /// `[0, bounds - 1]`; cells running off the edge pile up there.
    pub fn translate(&self, packed: &Region, movement: &[i32], bounds: &[i32]) -> Result<Region> {
        validate_bounds(bounds, self.dims())?;
        if movement.len() != self.dims() {
            return Err(Error::DimensionMismatch {
                expected: self.dims(),
                got: movement.len(),
            });
        }
        let mut out = Region::new();
        let mut buf = vec![0i32; self.dims()];
        for d in packed.iter() {
            if d >= self.curve.max_distance() {
                break;
            }
            self.curve.alter(&mut buf, d);
            for (a, c) in buf.iter_mut().enumerate() {
                *c = (*c + movement[a]).clamp(0, bounds[a] - 1);
            }
            let nd = self.curve.distance(&buf);
            if nd >= 0 {
                out.insert(nd as u32);
            }
        }
        Ok(out)
    }

    /// Dilate by the metric ball of radius `r`, clamped to `bounds`.
    pub fn expand(&self, packed: &Region, r: u32, bounds: &[i32], metric: Metric) -> Result<Region> {
        self.dilate(packed, r, bounds, metric, None)
    }

    /// The dilation minus the original region: cells within distance `r` of
    /// the region but not in it.
    pub fn fringe(&self, packed: &Region, r: u32, bounds: &[i32], metric: Metric) -> Result<Region> {
        let seeds: FxHashSet<u32> = packed.iter().collect();
        self.dilate(packed, r, bounds, metric, Some(&seeds))
    }

    fn dilate(
        &self,
        packed: &Region,
        r: u32,
        bounds: &[i32],
        metric: Metric,
        skip: Option<&FxHashSet<u32>>,
    ) -> Result<Region> {
        validate_bounds(bounds, self.dims())?;
        let element = self.elements.get(metric, r, self.dims());
        let mut out = Region::new();
        let mut buf = vec![0i32; self.dims()];
        let mut probe = vec![0i32; self.dims()];
        for d in packed.iter() {
            if d >= self.curve.max_distance() {
                break;
            }
            self.curve.alter(&mut buf, d);
            for offset in element.iter() {
                for a in 0..self.dims() {
                    probe[a] = (buf[a] + offset[a]).clamp(0, bounds[a] - 1);
                }
                let nd = self.curve.distance(&probe);
                if nd >= 0 {
                    let nd = nd as u32;
                    if skip.map_or(true, |s| !s.contains(&nd)) {
                        out.insert(nd);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Concentric 1-cell shells: element `k` holds the cells first reached at
    /// distance `k + 1`. Shells are pairwise disjoint and disjoint from the
    /// region; concatenated they equal `fringe(packed, r, ..)`.
    pub fn fringes(
        &self,
        packed: &Region,
        r: u32,
        bounds: &[i32],
        metric: Metric,
    ) -> Result<Vec<Region>> {
        let mut shells = Vec::with_capacity(r as usize);
        let mut covered = packed.clone();
        for k in 1..=r {
            let grown = self.expand(packed, k, bounds, metric)?;
            shells.push(&grown - &covered);
            covered |= grown;
        }
        Ok(shells)
    }

    /// Seal 1-cell straight gaps between region cells (Manhattan directions).
    pub fn filling(&self, packed: &Region, bounds: &[i32]) -> Result<Region> {
        self.filling_with(packed, bounds, 1, Metric::Manhattan)
    }

    /// Seal straight gaps of up to `depth` cells along the unit directions of
    /// `metric`.
    ///
    /// A run of `depth` unset in-bounds cells is added when the cell one past
    /// it (in the same direction) is set or outside `bounds`; cells outside
    /// bounds count as set, and a set intermediate cell aborts the direction.
    pub fn filling_with(
        &self,
        packed: &Region,
        bounds: &[i32],
        depth: u32,
        metric: Metric,
    ) -> Result<Region> {
        validate_bounds(bounds, self.dims())?;
        let element = self.elements.get(metric, 1, self.dims());
        let cells: FxHashSet<u32> = packed.iter().collect();
        let mut out = Region::new();
        let mut buf = vec![0i32; self.dims()];
        let mut probe = vec![0i32; self.dims()];
        let mut pending = Vec::with_capacity(depth as usize);
        for d in packed.iter() {
            if d >= self.curve.max_distance() {
                break;
            }
            self.curve.alter(&mut buf, d);
            'direction: for offset in element.iter() {
                if offset.iter().all(|&c| c == 0) {
                    continue;
                }
                pending.clear();
                for step in 1..=depth as i32 {
                    let mut inside = true;
                    for a in 0..self.dims() {
                        probe[a] = buf[a] + offset[a] * step;
                        inside &= probe[a] >= 0 && probe[a] < bounds[a];
                    }
                    if !inside {
                        continue 'direction;
                    }
                    let pd = self.curve.distance(&probe);
                    if pd < 0 || cells.contains(&(pd as u32)) {
                        continue 'direction;
                    }
                    pending.push(pd as u32);
                }
                let mut inside = true;
                for a in 0..self.dims() {
                    probe[a] = buf[a] + offset[a] * (depth as i32 + 1);
                    inside &= probe[a] >= 0 && probe[a] < bounds[a];
                }
                let sealed = if inside {
                    let td = self.curve.distance(&probe);
                    td < 0 || cells.contains(&(td as u32))
                } else {
                    true
                };
                if sealed {
                    for &p in &pending {
                        out.insert(p);
                    }
                }
            }
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Flood

    /// Bounded flood fill by Manhattan unit steps.
    pub fn flood(&self, start: &Region, container: &Region, r: u32) -> Region {
        self.flood_with(start, container, r, Metric::Manhattan)
    }

    /// Bounded flood fill: `r` rounds of unit expansion intersected with
    /// `container`. Manhattan steps through the 4-neighborhood (2n cells),
    /// any other metric through the 8-neighborhood (3^n - 1 cells).
    pub fn flood_with(&self, start: &Region, container: &Region, r: u32, metric: Metric) -> Region {
        let step_metric = if metric == Metric::Manhattan {
            Metric::Manhattan
        } else {
            Metric::Chebyshev
        };
        let element = self.elements.get(step_metric, 1, self.dims());
        let mut result = start & container;
        let mut frontier = result.clone();
        let mut buf = vec![0i32; self.dims()];
        let mut probe = vec![0i32; self.dims()];
        for _ in 0..r {
            if frontier.is_empty() {
                break;
            }
            let mut next = Region::new();
            for d in frontier.iter() {
                self.curve.alter(&mut buf, d);
                for offset in element.iter() {
                    for a in 0..self.dims() {
                        probe[a] = buf[a] + offset[a];
                    }
                    let nd = self.curve.distance(&probe);
                    if nd >= 0 {
                        let nd = nd as u32;
                        if container.contains(nd) && !result.contains(nd) {
                            next.insert(nd);
                        }
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            result |= &next;
            frontier = next;
        }
        result
    }

    /// Grow `start` inside `container` one uniformly random exterior-edge
    /// cell at a time until `volume` cells are set or the edge is exhausted.
    pub fn random_flood<R: Rng + ?Sized>(
        &self,
        start: &Region,
        container: &Region,
        volume: u64,
        rng: &mut R,
    ) -> Region {
        let element = self.elements.get(Metric::Manhattan, 1, self.dims());
        let mut result = start.clone();
        let mut buf = vec![0i32; self.dims()];
        let mut probe = vec![0i32; self.dims()];
        let mut edge: Vec<u32> = Vec::new();
        let mut on_edge: FxHashSet<u32> = FxHashSet::default();

        let push_edges = |cell: u32,
                              result: &Region,
                              edge: &mut Vec<u32>,
                              on_edge: &mut FxHashSet<u32>,
                              buf: &mut Vec<i32>,
                              probe: &mut Vec<i32>| {
            self.curve.alter(buf, cell);
            for offset in element.iter() {
                for a in 0..self.dims() {
                    probe[a] = buf[a] + offset[a];
                }
                let nd = self.curve.distance(probe);
                if nd >= 0 {
                    let nd = nd as u32;
                    if container.contains(nd) && !result.contains(nd) && on_edge.insert(nd) {
                        edge.push(nd);
                    }
                }
            }
        };

        for d in start.iter() {
            if d >= self.curve.max_distance() {
                break;
            }
            push_edges(d, &result, &mut edge, &mut on_edge, &mut buf, &mut probe);
        }

        // Hard cap against degenerate containers
        let limit = volume.saturating_mul(20);
        let mut iterations = 0u64;
        while result.len() < volume && !edge.is_empty() && iterations < limit {
            iterations += 1;
            let pick = rng.random_range(0..edge.len());
            let cell = edge.swap_remove(pick);
            on_edge.remove(&cell);
            result.insert(cell);
            push_edges(cell, &result, &mut edge, &mut on_edge, &mut buf, &mut probe);
        }
        result
    }

    // ------------------------------------------------------------------
    // Retract / surface / split

    /// Morphological erosion: cells deeper than `r` from the complement
    /// (Chebyshev ball).
    pub fn retract(&self, packed: &Region, r: u32, bounds: &[i32]) -> Result<Region> {
        self.retract_with(packed, r, bounds, Metric::Chebyshev)
    }

    pub fn retract_with(
        &self,
        packed: &Region,
        r: u32,
        bounds: &[i32],
        metric: Metric,
    ) -> Result<Region> {
        let grown = self.expand(&self.negate(packed), r, bounds, metric)?;
        Ok(packed - &grown)
    }

    /// The cells of the region within `r` of its complement (Chebyshev ball).
    pub fn surface(&self, packed: &Region, r: u32, bounds: &[i32]) -> Result<Region> {
        self.surface_with(packed, r, bounds, Metric::Chebyshev)
    }

    pub fn surface_with(
        &self,
        packed: &Region,
        r: u32,
        bounds: &[i32],
        metric: Metric,
    ) -> Result<Region> {
        let grown = self.expand(&self.negate(packed), r, bounds, metric)?;
        Ok(packed & &grown)
    }

    /// Split into Manhattan-connected components, ordered by ascending
    /// minimal curve index.
    pub fn split(&self, packed: &Region) -> Vec<Region> {
        let mut remaining = packed.clone();
        let mut out = Vec::new();
        while let Some(d0) = remaining.min() {
            let component =
                self.flood(&self.pack_one_curve(d0), packed, self.curve.max_distance());
            remaining -= &component;
            out.push(component);
        }
        out
    }

    // ------------------------------------------------------------------
    // Rectangles and point construction

    /// All cells with every coordinate inside `[0, bounds[i])`.
    pub fn rectangle(&self, bounds: &[i32]) -> Result<Region> {
        validate_bounds(bounds, self.dims())?;
        let mut out = Region::new();
        let mut buf = vec![0i32; self.dims()];
        for d in 0..self.curve.max_distance() {
            self.curve.alter(&mut buf, d);
            if bounded_index(bounds, &buf) >= 0 {
                out.insert(d);
            }
        }
        Ok(out)
    }

    /// The hyper-box `[start[i], bounds[i])`, packed under `bounds`.
    pub fn rectangle_at(&self, start: &[i32], bounds: &[i32]) -> Result<Region> {
        let product = validate_bounds(bounds, self.dims())?;
        if start.len() != self.dims() {
            return Err(Error::DimensionMismatch {
                expected: self.dims(),
                got: start.len(),
            });
        }
        for (axis, (&s, &b)) in start.iter().zip(bounds).enumerate() {
            if s < 0 || s >= b {
                return Err(Error::StartBeyondBounds {
                    axis,
                    start: s,
                    bound: b,
                });
            }
        }
        let mut data = vec![false; product as usize];
        let mut p = start.to_vec();
        'mark: loop {
            data[bounded_index(bounds, &p) as usize] = true;
            // odometer over the box, least significant axis last
            let mut axis = self.dims();
            loop {
                if axis == 0 {
                    break 'mark;
                }
                axis -= 1;
                if p[axis] + 1 < bounds[axis] {
                    p[axis] += 1;
                    break;
                }
                p[axis] = start[axis];
            }
        }
        self.pack(&data, bounds)
    }

    /// Single-cell region, or empty when `coords` is out of range.
    pub fn pack_one(&self, coords: &[i32]) -> Region {
        let mut out = Region::new();
        let d = self.curve.distance(coords);
        if d >= 0 {
            out.insert(d as u32);
        }
        out
    }

    /// Single-bit region at curve distance `d`.
    pub fn pack_one_curve(&self, d: u32) -> Region {
        let mut out = Region::new();
        if d < self.curve.max_distance() {
            out.insert(d);
        }
        out
    }

    /// Region of every in-range point in `points`.
    pub fn pack_several(&self, points: &[Vec<i32>]) -> Region {
        let mut out = Region::new();
        for p in points {
            let d = self.curve.distance(p);
            if d >= 0 {
                out.insert(d as u32);
            }
        }
        out
    }

    /// Region of every in-range curve distance in `distances`.
    pub fn pack_several_curve(&self, distances: &[u32]) -> Region {
        let mut out = Region::new();
        for &d in distances {
            if d < self.curve.max_distance() {
                out.insert(d);
            }
        }
        out
    }

    pub fn insert_one(&self, packed: &Region, coords: &[i32]) -> Region {
        packed | &self.pack_one(coords)
    }

    pub fn insert_one_curve(&self, packed: &Region, d: u32) -> Region {
        packed | &self.pack_one_curve(d)
    }

    pub fn insert_several(&self, packed: &Region, points: &[Vec<i32>]) -> Region {
        packed | &self.pack_several(points)
    }

    pub fn insert_several_curve(&self, packed: &Region, distances: &[u32]) -> Region {
        packed | &self.pack_several_curve(distances)
    }

    pub fn remove_one(&self, packed: &Region, coords: &[i32]) -> Region {
        packed - &self.pack_one(coords)
    }

    pub fn remove_one_curve(&self, packed: &Region, d: u32) -> Region {
        packed - &self.pack_one_curve(d)
    }

    pub fn remove_several(&self, packed: &Region, points: &[Vec<i32>]) -> Region {
        packed - &self.pack_several(points)
    }

    pub fn remove_several_curve(&self, packed: &Region, distances: &[u32]) -> Region {
        packed - &self.pack_several_curve(distances)
    }

    // ------------------------------------------------------------------
    // Random sampling

    /// Keep each set cell independently with probability `p`.
    pub fn random_sample<R: Rng + ?Sized>(&self, packed: &Region, p: f64, rng: &mut R) -> Region {
        let card = packed.len() as u32;
        let picks = random_samples(rng, 0, card, p);
        self.compose(packed, &picks)
    }

    /// Uniformly random subset of `min(k, count)` distinct cells.
    pub fn random_portion<R: Rng + ?Sized>(&self, packed: &Region, k: u64, rng: &mut R) -> Region {
        let card = packed.len() as u32;
        let k = k.min(card as u64) as u32;
        let mut picks = random_range(rng, 0, card, k);
        picks.sort_unstable();
        self.compose(packed, &picks)
    }

    /// Coordinates of one uniformly random set cell, or `None` when empty.
    pub fn single_random<R: Rng + ?Sized>(&self, packed: &Region, rng: &mut R) -> Option<Vec<i32>> {
        let card = packed.len();
        if card == 0 {
            return None;
        }
        let i = rng.random_range(0..card as u32);
        packed.select(i).map(|d| self.curve.point(d))
    }

    /// Like [`Self::single_random`], but over a precomputed distance array to
    /// amortize the bitmap walk across many draws.
    pub fn single_random_of<R: Rng + ?Sized>(
        &self,
        distances: &[u32],
        rng: &mut R,
    ) -> Option<Vec<i32>> {
        random_element(rng, distances).map(|&d| self.curve.point(d))
    }

    /// Select the i-th set bit of `packed` for every rank in `ranks`.
    fn compose(&self, packed: &Region, ranks: &[u32]) -> Region {
        let mut out = Region::new();
        for &i in ranks {
            if let Some(d) = packed.select(i) {
                out.insert(d);
            }
        }
        out
    }

    /// Shared structuring element handle, exposed for reuse across packers.
    pub fn structuring_element(&self, metric: Metric, r: u32) -> Arc<Vec<Vec<i32>>> {
        self.elements.get(metric, r, self.dims())
    }
}
