//! Puka-Hilbert 40^3 composite curve
//!
//! A fixed 3-D curve of side 40 = 8 x 5 and 64 000 points. Every cell of an
//! order-3 Hilbert curve is replaced by a rotated copy of the Puka atom, a
//! 5x5x5 Hamiltonian path running from the corner (0,0,0) to the edge-adjacent
//! corner (4,0,0). Because the atom's endpoints sit on one cube edge, a unique
//! rotation exists for every (entry corner, exit corner) pair a cell can
//! require, and entry corners chain across cell faces; the resulting 40^3 walk
//! keeps the unit-step property everywhere. Rotations are parameterized as
//! `direction in [0,6)` (image of the atom's main axis) times `rotation in
//! [0,4)` (twist about it). All eight tables - atom x/y/z and distances, curve
//! x/y/z and distances - are precomputed at construction.

use crate::curve::Curve;
use crate::hilbert::hilbert_point_into;

const SIDE: usize = 40;
const CELLS: usize = 512;
const ATOM: usize = 125;
const LENGTH: usize = CELLS * ATOM;

/// Signed axis permutation: one of the 24 cube rotations, acting on
/// coordinates in `[0, 4]` around the cube center.
#[derive(Debug, Clone, Copy)]
struct Rot {
    perm: [usize; 3],
    flip: [bool; 3],
}

impl Rot {
    #[inline]
    fn apply(&self, p: [i32; 3]) -> [i32; 3] {
        let mut out = [0i32; 3];
        for i in 0..3 {
            let v = p[self.perm[i]];
            out[i] = if self.flip[i] { 4 - v } else { v };
        }
        out
    }

    /// `self` after `other`: `compose(a, b).apply(p) == a.apply(b.apply(p))`.
    fn compose(self, other: Rot) -> Rot {
        let mut perm = [0usize; 3];
        let mut flip = [false; 3];
        for i in 0..3 {
            perm[i] = other.perm[self.perm[i]];
            flip[i] = self.flip[i] ^ other.flip[self.perm[i]];
        }
        Rot { perm, flip }
    }

    fn inverse(self) -> Rot {
        let mut perm = [0usize; 3];
        let mut flip = [false; 3];
        for i in 0..3 {
            perm[self.perm[i]] = i;
            flip[self.perm[i]] = self.flip[i];
        }
        Rot { perm, flip }
    }
}

/// Quarter turn about the x axis.
const SPIN: Rot = Rot {
    perm: [0, 2, 1],
    flip: [false, true, false],
};

/// Rotations carrying the +x direction onto +x, -x, +y, -y, +z, -z.
const BASES: [Rot; 6] = [
    Rot {
        perm: [0, 1, 2],
        flip: [false, false, false],
    },
    Rot {
        perm: [0, 1, 2],
        flip: [true, true, false],
    },
    Rot {
        perm: [1, 0, 2],
        flip: [true, false, false],
    },
    Rot {
        perm: [1, 0, 2],
        flip: [false, true, false],
    },
    Rot {
        perm: [2, 1, 0],
        flip: [true, false, false],
    },
    Rot {
        perm: [2, 1, 0],
        flip: [false, false, true],
    },
];

/// The 24 cube rotations, indexed by (direction, rotation).
fn rotation_table() -> [[Rot; 4]; 6] {
    let identity = BASES[0];
    let mut table = [[identity; 4]; 6];
    for (direction, base) in BASES.iter().enumerate() {
        let mut spin = identity;
        for rotation in 0..4 {
            table[direction][rotation] = base.compose(spin);
            spin = SPIN.compose(spin);
        }
    }
    table
}

/// The Puka atom: a Hamiltonian path over the 5x5x5 cube from (0,0,0) to
/// (4,0,0).
///
/// The slab x in 0..4 is covered by column-serpentine z layers ending at
/// (3,4,4); the face x == 4 is then swept row by row back down to (4,0,0).
fn build_atom() -> Vec<[i32; 3]> {
    let mut path = Vec::with_capacity(ATOM);
    for z in 0..5i32 {
        if z < 4 {
            let cols: Vec<i32> = if z % 2 == 0 {
                (0..4).collect()
            } else {
                (0..4).rev().collect()
            };
            for (c, &x) in cols.iter().enumerate() {
                if c % 2 == 0 {
                    for y in 0..5 {
                        path.push([x, y, z]);
                    }
                } else {
                    for y in (0..5).rev() {
                        path.push([x, y, z]);
                    }
                }
            }
        } else {
            for y in 0..5i32 {
                if y % 2 == 0 {
                    for x in 0..4 {
                        path.push([x, y, z]);
                    }
                } else {
                    for x in (0..4).rev() {
                        path.push([x, y, z]);
                    }
                }
            }
        }
    }
    for (row, z) in (0..5i32).rev().enumerate() {
        if row % 2 == 0 {
            for y in (0..5).rev() {
                path.push([4, y, z]);
            }
        } else {
            for y in 0..5 {
                path.push([4, y, z]);
            }
        }
    }
    path
}

/// Corner of the cube as a 3-bit code (coordinates are 0 or 4).
#[inline]
fn corner_code(p: [i32; 3]) -> usize {
    (((p[0] != 0) as usize) << 2) | (((p[1] != 0) as usize) << 1) | ((p[2] != 0) as usize)
}

/// Fixed 3-D Puka-Hilbert curve of side 40.
///
/// Implements [`Curve`] with `max_distance == 64 000`; every accessor is an
/// O(1) table lookup.
#[derive(Debug, Clone)]
pub struct PukaHilbert40 {
    dims: Vec<i32>,
    offsets: Vec<i32>,
    xs: Vec<u8>,
    ys: Vec<u8>,
    zs: Vec<u8>,
    distances: Vec<u16>,
    atom_x: Vec<u8>,
    atom_y: Vec<u8>,
    atom_z: Vec<u8>,
    atom_distances: Vec<u8>,
    rotations: [[Rot; 4]; 6],
}

impl PukaHilbert40 {
    pub fn new() -> Self {
        Self::with_offsets(&[0, 0, 0])
    }

    /// Curve whose coordinates are shifted per axis by `offsets` (length 3;
    /// extra entries are ignored, missing ones read as zero).
    pub fn with_offsets(offsets: &[i32]) -> Self {
        let mut offs = [0i32; 3];
        for (o, &v) in offs.iter_mut().zip(offsets) {
            *o = v;
        }

        let atom = build_atom();
        let mut atom_x = vec![0u8; ATOM];
        let mut atom_y = vec![0u8; ATOM];
        let mut atom_z = vec![0u8; ATOM];
        let mut atom_distances = vec![0u8; ATOM];
        for (i, p) in atom.iter().enumerate() {
            atom_x[i] = p[0] as u8;
            atom_y[i] = p[1] as u8;
            atom_z[i] = p[2] as u8;
            atom_distances[(p[0] * 25 + p[1] * 5 + p[2]) as usize] = i as u8;
        }

        let rotations = rotation_table();
        // Unique (direction, rotation) for every ordered pair of edge-adjacent
        // corners the atom endpoints can land on.
        let mut placement = [[None::<(usize, usize)>; 8]; 8];
        for (direction, spins) in rotations.iter().enumerate() {
            for (rotation, rot) in spins.iter().enumerate() {
                let start = corner_code(rot.apply([0, 0, 0]));
                let end = corner_code(rot.apply([4, 0, 0]));
                placement[start][end] = Some((direction, rotation));
            }
        }

        let mut xs = vec![0u8; LENGTH];
        let mut ys = vec![0u8; LENGTH];
        let mut zs = vec![0u8; LENGTH];
        let mut distances = vec![0u16; LENGTH];

        let mut cells = vec![[0i32; 3]; CELLS];
        for (i, cell) in cells.iter_mut().enumerate() {
            hilbert_point_into(3, 3, i as u32, cell);
        }

        let mut entry = [0i32; 3];
        for i in 0..CELLS {
            let cell = cells[i];
            let (exit, step_axis) = if i + 1 < CELLS {
                let next = cells[i + 1];
                // Consecutive Hilbert cells differ along exactly one axis
                let t = (0..3).find(|&a| next[a] != cell[a]).unwrap();
                let target = if next[t] > cell[t] { 4 } else { 0 };
                let mut exit = entry;
                if entry[t] == target {
                    let u = if t == 0 { 1 } else { 0 };
                    exit[u] = 4 - exit[u];
                } else {
                    exit[t] = 4 - exit[t];
                }
                (exit, Some(t))
            } else {
                let mut exit = entry;
                exit[0] = 4 - exit[0];
                (exit, None)
            };

            // Entry and exit are edge-adjacent corners, so a placement exists
            let (direction, rotation) =
                placement[corner_code(entry)][corner_code(exit)].unwrap();
            let rot = rotations[direction][rotation];
            for (s, p) in atom.iter().enumerate() {
                let q = rot.apply(*p);
                let gx = cell[0] * 5 + q[0];
                let gy = cell[1] * 5 + q[1];
                let gz = cell[2] * 5 + q[2];
                let d = i * ATOM + s;
                xs[d] = gx as u8;
                ys[d] = gy as u8;
                zs[d] = gz as u8;
                distances[(gx * 1600 + gy * 40 + gz) as usize] = d as u16;
            }

            if let Some(t) = step_axis {
                entry = exit;
                entry[t] = 4 - entry[t];
            }
        }

        Self {
            dims: vec![SIDE as i32; 3],
            offsets: offs.to_vec(),
            xs,
            ys,
            zs,
            distances,
            atom_x,
            atom_y,
            atom_z,
            atom_distances,
            rotations,
        }
    }

    /// Step `d` of the atom under the given rotation, in atom coordinates.
    pub fn point_rotated(&self, direction: usize, rotation: usize, d: usize) -> [i32; 3] {
        let d = d.min(ATOM - 1);
        let rot = self.rotations[direction % 6][rotation % 4];
        rot.apply([
            self.atom_x[d] as i32,
            self.atom_y[d] as i32,
            self.atom_z[d] as i32,
        ])
    }

    /// Atom step index of the rotated point `(x, y, z)`, reversing the
    /// rotation; -1 if the point is outside the 5x5x5 cube.
    pub fn distance_rotated(&self, direction: usize, rotation: usize, x: i32, y: i32, z: i32) -> i64 {
        let rot = self.rotations[direction % 6][rotation % 4].inverse();
        let p = rot.apply([x, y, z]);
        if p.iter().any(|&c| !(0..5).contains(&c)) {
            return -1;
        }
        self.atom_distances[(p[0] * 25 + p[1] * 5 + p[2]) as usize] as i64
    }
}

impl Default for PukaHilbert40 {
    fn default() -> Self {
        Self::new()
    }
}

impl Curve for PukaHilbert40 {
    fn dimensionality(&self) -> &[i32] {
        &self.dims
    }

    fn offsets(&self) -> &[i32] {
        &self.offsets
    }

    fn max_distance(&self) -> u32 {
        LENGTH as u32
    }

    fn alter<'a>(&self, buf: &'a mut [i32], d: u32) -> &'a mut [i32] {
        let d = (d as usize).min(LENGTH - 1);
        buf[0] = self.xs[d] as i32 + self.offsets[0];
        buf[1] = self.ys[d] as i32 + self.offsets[1];
        buf[2] = self.zs[d] as i32 + self.offsets[2];
        buf
    }

    fn distance(&self, coords: &[i32]) -> i64 {
        if coords.len() != 3 {
            return -1;
        }
        let mut local = [0i32; 3];
        for a in 0..3 {
            let c = coords[a] - self.offsets[a];
            if c < 0 || c >= SIDE as i32 {
                return -1;
            }
            local[a] = c;
        }
        self.distances[(local[0] * 1600 + local[1] * 40 + local[2]) as usize] as i64
    }

    fn coordinate(&self, d: u32, dim: usize) -> i32 {
        let d = (d as usize).min(LENGTH - 1);
        match dim % 3 {
            0 => self.xs[d] as i32 + self.offsets[0],
            1 => self.ys[d] as i32 + self.offsets[1],
            _ => self.zs[d] as i32 + self.offsets[2],
        }
    }
}
