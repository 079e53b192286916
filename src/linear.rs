//! LinearData: flat boolean arrays with their per-axis bounds
//!
//! The adapter between nested domain arrays and the packer. Flattening is
//! row-major with dimension 0 the most significant, so index `i` maps to the
//! coordinate produced by [`crate::bounds::from_bounded`]. Constructors exist
//! for nesting ranks 1 through 8, each with a predicate-over-`T` variant.

use crate::bounds::{bounded_index, from_bounded, validate_bounds};
use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A row-major boolean array plus its bounds. `data.len()` always equals the
/// product of `bounds`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearData {
    pub data: Vec<bool>,
    pub bounds: Vec<i32>,
}

macro_rules! nested_constructors {
    ($(($from:ident, $map:ident, $prev_from:ident, $prev_map:ident, $bool_ty:ty, $T:ident, $gen_ty:ty, $rank:literal)),+ $(,)?) => {
        $(
            #[doc = concat!("Flatten a rank-", $rank, " nested boolean array.")]
            pub fn $from(rows: &[$bool_ty]) -> Result<Self> {
                let parts = rows
                    .iter()
                    .map(|r| Self::$prev_from(r))
                    .collect::<Result<Vec<_>>>()?;
                Self::stack(parts)
            }

            #[doc = concat!("Flatten a rank-", $rank, " nested `T` array through a predicate.")]
            pub fn $map<$T, F: Fn(&$T) -> bool>(rows: &[$gen_ty], pred: F) -> Result<Self> {
                let parts = rows
                    .iter()
                    .map(|r| Self::$prev_map(r, &pred))
                    .collect::<Result<Vec<_>>>()?;
                Self::stack(parts)
            }
        )+
    };
}

impl LinearData {
    /// Wrap an already-flat array. The data length must match the bounds
    /// product exactly.
    pub fn new(data: Vec<bool>, bounds: Vec<i32>) -> Result<Self> {
        let product = validate_bounds(&bounds, bounds.len())?;
        if data.is_empty() {
            return Err(Error::MissingData("LinearData requires a non-empty array"));
        }
        if data.len() as i64 != product {
            return Err(Error::InvalidArgument(format!(
                "data length {} does not match bounds product {}",
                data.len(),
                product
            )));
        }
        Ok(Self { data, bounds })
    }

    /// Rank-1 constructor.
    pub fn from_slice(data: &[bool]) -> Result<Self> {
        Self::new(data.to_vec(), vec![data.len() as i32])
    }

    /// Rank-1 predicate constructor.
    pub fn map_slice<T, F: Fn(&T) -> bool>(items: &[T], pred: F) -> Result<Self> {
        Self::new(
            items.iter().map(|t| pred(t)).collect(),
            vec![items.len() as i32],
        )
    }

    nested_constructors! {
        (from_nested2, map_nested2, from_slice, map_slice,
            Vec<bool>, T, Vec<T>, 2),
        (from_nested3, map_nested3, from_nested2, map_nested2,
            Vec<Vec<bool>>, T, Vec<Vec<T>>, 3),
        (from_nested4, map_nested4, from_nested3, map_nested3,
            Vec<Vec<Vec<bool>>>, T, Vec<Vec<Vec<T>>>, 4),
        (from_nested5, map_nested5, from_nested4, map_nested4,
            Vec<Vec<Vec<Vec<bool>>>>, T, Vec<Vec<Vec<Vec<T>>>>, 5),
        (from_nested6, map_nested6, from_nested5, map_nested5,
            Vec<Vec<Vec<Vec<Vec<bool>>>>>, T, Vec<Vec<Vec<Vec<Vec<T>>>>>, 6),
        (from_nested7, map_nested7, from_nested6, map_nested6,
            Vec<Vec<Vec<Vec<Vec<Vec<bool>>>>>>, T, Vec<Vec<Vec<Vec<Vec<Vec<T>>>>>>, 7),
        (from_nested8, map_nested8, from_nested7, map_nested7,
            Vec<Vec<Vec<Vec<Vec<Vec<Vec<bool>>>>>>>, T, Vec<Vec<Vec<Vec<Vec<Vec<Vec<T>>>>>>>, 8),
    }

    /// Re-base `items` from one bounds box to another of the same rank. Cells
    /// that fall outside the new bounds are dropped; cells the old bounds
    /// never covered stay false.
    pub fn rebase(items: &[bool], old_bounds: &[i32], new_bounds: &[i32]) -> Result<Self> {
        let old_product = validate_bounds(old_bounds, old_bounds.len())?;
        let new_product = validate_bounds(new_bounds, old_bounds.len())?;
        if items.is_empty() {
            return Err(Error::MissingData("rebase requires a non-empty array"));
        }
        if items.len() as i64 != old_product {
            return Err(Error::InvalidArgument(format!(
                "data length {} does not match bounds product {}",
                items.len(),
                old_product
            )));
        }
        let mut data = vec![false; new_product as usize];
        for (i, &v) in items.iter().enumerate() {
            let p = from_bounded(old_bounds, i as i64)?;
            let j = bounded_index(new_bounds, &p);
            if j >= 0 {
                data[j as usize] = v;
            }
        }
        Self::new(data, new_bounds.to_vec())
    }

    /// Stack equally-shaped parts under a new outermost axis.
    fn stack(parts: Vec<LinearData>) -> Result<Self> {
        let first = match parts.first() {
            Some(f) => f,
            None => return Err(Error::MissingData("cannot flatten an empty nested array")),
        };
        let inner = first.bounds.clone();
        let mut data = Vec::with_capacity(parts.len() * first.data.len());
        for part in &parts {
            if part.bounds != inner {
                return Err(Error::InvalidArgument(
                    "ragged nested array: sub-array shapes differ".into(),
                ));
            }
            data.extend_from_slice(&part.data);
        }
        let mut bounds = Vec::with_capacity(inner.len() + 1);
        bounds.push(parts.len() as i32);
        bounds.extend_from_slice(&inner);
        Self::new(data, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank2_flattens_row_major() {
        let ld = LinearData::from_nested2(&[
            vec![true, false, false],
            vec![false, true, true],
        ])
        .unwrap();
        assert_eq!(ld.bounds, vec![2, 3]);
        assert_eq!(ld.data, vec![true, false, false, false, true, true]);
        // index 4 is (1, 1)
        assert_eq!(bounded_index(&ld.bounds, &[1, 1]), 4);
        assert!(ld.data[4]);
    }

    #[test]
    fn rank3_flattens_dimension_zero_most_significant() {
        let ld = LinearData::from_nested3(&[
            vec![vec![true, false], vec![false, false]],
            vec![vec![false, false], vec![false, true]],
        ])
        .unwrap();
        assert_eq!(ld.bounds, vec![2, 2, 2]);
        assert!(ld.data[0]); // (0,0,0)
        assert!(ld.data[7]); // (1,1,1)
        assert_eq!(ld.data.iter().filter(|&&v| v).count(), 2);
    }

    #[test]
    fn rank8_smoke() {
        // a 1x1x1x1x1x1x1x2 array
        let ld = LinearData::from_nested8(&[vec![vec![vec![vec![vec![vec![vec![
            false, true,
        ]]]]]]]])
        .unwrap();
        assert_eq!(ld.bounds, vec![1, 1, 1, 1, 1, 1, 1, 2]);
        assert_eq!(ld.data, vec![false, true]);
    }

    #[test]
    fn predicate_variants() {
        let ld = LinearData::map_slice(&[3, 0, 7, 1], |&v| v > 1).unwrap();
        assert_eq!(ld.data, vec![true, false, true, false]);

        let ld = LinearData::map_nested2(&[vec!['a', 'b'], vec!['c', 'a']], |&c| c == 'a')
            .unwrap();
        assert_eq!(ld.bounds, vec![2, 2]);
        assert_eq!(ld.data, vec![true, false, false, true]);
    }

    #[test]
    fn ragged_input_is_rejected() {
        let err = LinearData::from_nested2(&[vec![true], vec![true, false]]);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn new_validates_shape() {
        assert!(LinearData::new(vec![], vec![1]).is_err());
        assert!(LinearData::new(vec![true; 5], vec![2, 3]).is_err());
        assert!(LinearData::new(vec![true; 6], vec![2, 3]).is_ok());
    }

    #[test]
    fn rebase_crops_and_grows() {
        // 2x2 marked at (0,1) and (1,0)
        let items = [false, true, true, false];
        // grow to 3x3: same coordinates, new strides
        let grown = LinearData::rebase(&items, &[2, 2], &[3, 3]).unwrap();
        assert_eq!(grown.data.iter().filter(|&&v| v).count(), 2);
        assert!(grown.data[bounded_index(&[3, 3], &[0, 1]) as usize]);
        assert!(grown.data[bounded_index(&[3, 3], &[1, 0]) as usize]);
        // crop to 1x2: (1,0) falls outside and is dropped
        let cropped = LinearData::rebase(&items, &[2, 2], &[1, 2]).unwrap();
        assert_eq!(cropped.data, vec![false, true]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let ld = LinearData::from_nested2(&[vec![true, false], vec![false, true]]).unwrap();
        let json = serde_json::to_string(&ld).unwrap();
        let back: LinearData = serde_json::from_str(&json).unwrap();
        assert_eq!(ld, back);
    }
}
