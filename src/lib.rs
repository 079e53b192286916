//! # curvepack
//!
//! N-dimensional boolean region algebra over compressed bitmaps keyed by
//! space-filling curves.
//!
//! A region over an axis-aligned box is linearized by walking a space-filling
//! curve (Hilbert, a looping Moore variant, or the Puka-Hilbert 40^3
//! composite) and stored as a compressed bitmap of curve distances. Every
//! operation - set algebra, translation, morphological expand/retract, fringe
//! bands, flood fill, connected-component split, random sampling - runs
//! directly on the compressed form; dense arrays only appear at the pack and
//! unpack boundary.
//!
//! ## Key pieces
//!
//! - **Curves**: [`HilbertCurve`] (n-D, with a 2-D fast path), [`MooreCurve`]
//!   (closed loop with a stretch axis), [`PukaHilbert40`] (fixed 40^3 curve).
//! - **[`RegionPacker`]**: owns one curve and performs the whole region
//!   algebra on [`Region`] bitmaps.
//! - **[`LinearData`]**: the adapter between nested boolean arrays and the
//!   packer.
//!
//! ## Example
//!
//! ```rust
//! use curvepack::{HilbertCurve, Metric, RegionPacker};
//!
//! let packer = RegionPacker::new(Box::new(HilbertCurve::new(2, 64).unwrap()));
//!
//! // Two overlapping rooms, then the wall cells one step outside them
//! let a = packer.rectangle_at(&[4, 4], &[12, 12]).unwrap();
//! let b = packer.rectangle_at(&[10, 4], &[18, 12]).unwrap();
//! let rooms = packer.union(&a, &b);
//! let walls = packer.fringe(&rooms, 1, &[64, 64], Metric::Chebyshev).unwrap();
//!
//! assert_eq!(packer.count(&rooms), 112);
//! assert!(packer.intersect(&rooms, &walls).is_empty());
//! ```

pub mod bits;
pub mod bounds;
pub mod curve;
pub mod element;
pub mod error;
pub mod hilbert;
mod hilbert2d;
pub mod io;
pub mod linear;
pub mod metric;
pub mod moore;
pub mod packer;
pub mod puka;
pub mod rng;

// Re-export commonly used types
pub use crate::curve::Curve;
pub use crate::error::{Error, Result};
pub use crate::hilbert::HilbertCurve;
pub use crate::linear::LinearData;
pub use crate::metric::Metric;
pub use crate::moore::MooreCurve;
pub use crate::packer::{Region, RegionPacker};
pub use crate::puka::PukaHilbert40;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
