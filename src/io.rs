//! Stable byte formats for LinearData and regions
//!
//! Two little-endian layouts meant for persistence and interchange:
//!
//! - `LinearData`: `n: u32`, then `n` bounds as `i32`, then the booleans
//!   packed LSB-first per byte.
//! - Region: the curve's `max_distance` as `u32`, then the sorted set
//!   distances as `u32` each.

use roaring::RoaringBitmap;

use crate::error::{Error, Result};
use crate::linear::LinearData;
use crate::packer::Region;

fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    match bytes.get(at..at + 4) {
        Some(b) => Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(Error::InvalidFormat(format!(
            "unexpected end of input at byte {}",
            at
        ))),
    }
}

/// Serialize a [`LinearData`] value.
pub fn linear_to_bytes(linear: &LinearData) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 4 * linear.bounds.len() + linear.data.len() / 8 + 1);
    out.extend_from_slice(&(linear.bounds.len() as u32).to_le_bytes());
    for &b in &linear.bounds {
        out.extend_from_slice(&b.to_le_bytes());
    }
    let mut byte = 0u8;
    for (i, &bit) in linear.data.iter().enumerate() {
        if bit {
            byte |= 1 << (i % 8);
        }
        if i % 8 == 7 {
            out.push(byte);
            byte = 0;
        }
    }
    if linear.data.len() % 8 != 0 {
        out.push(byte);
    }
    out
}

/// Deserialize a [`LinearData`] value written by [`linear_to_bytes`].
pub fn linear_from_bytes(bytes: &[u8]) -> Result<LinearData> {
    let n = read_u32(bytes, 0)? as usize;
    if n == 0 || n > 31 {
        return Err(Error::InvalidFormat(format!("implausible rank {}", n)));
    }
    let mut bounds = Vec::with_capacity(n);
    let mut product: i64 = 1;
    for axis in 0..n {
        let b = read_u32(bytes, 4 + 4 * axis)? as i32;
        if b <= 0 {
            return Err(Error::InvalidFormat(format!(
                "non-positive bound on axis {}",
                axis
            )));
        }
        product = product.saturating_mul(b as i64);
        bounds.push(b);
    }
    let header = 4 + 4 * n;
    let payload = &bytes[header.min(bytes.len())..];
    if product > (payload.len() as i64) * 8 {
        return Err(Error::InvalidFormat(format!(
            "payload too short for {} cells",
            product
        )));
    }
    let data = (0..product as usize)
        .map(|i| payload[i / 8] & (1 << (i % 8)) != 0)
        .collect();
    LinearData::new(data, bounds)
}

/// Serialize a region as its curve length plus sorted set distances.
pub fn region_to_bytes(max_distance: u32, packed: &Region) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 4 * packed.len() as usize);
    out.extend_from_slice(&max_distance.to_le_bytes());
    for d in packed.iter() {
        out.extend_from_slice(&d.to_le_bytes());
    }
    out
}

/// Deserialize a region written by [`region_to_bytes`]; returns the curve
/// length it was packed against alongside the bitmap.
pub fn region_from_bytes(bytes: &[u8]) -> Result<(u32, Region)> {
    let max_distance = read_u32(bytes, 0)?;
    let rest = &bytes[4..];
    if rest.len() % 4 != 0 {
        return Err(Error::InvalidFormat(
            "distance payload is not a whole number of u32s".into(),
        ));
    }
    let mut out = RoaringBitmap::new();
    let mut previous: i64 = -1;
    for at in (0..rest.len()).step_by(4) {
        let d = read_u32(rest, at)?;
        if (d as i64) <= previous || d >= max_distance {
            return Err(Error::InvalidFormat(format!(
                "distance {} out of order or out of range",
                d
            )));
        }
        previous = d as i64;
        out.insert(d);
    }
    Ok((max_distance, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_bytes_roundtrip() {
        let ld = LinearData::from_nested2(&[
            vec![true, false, true, true, false],
            vec![false, false, true, false, true],
        ])
        .unwrap();
        let bytes = linear_to_bytes(&ld);
        // rank + two bounds + 10 bits in 2 bytes
        assert_eq!(bytes.len(), 4 + 8 + 2);
        assert_eq!(linear_from_bytes(&bytes).unwrap(), ld);
    }

    #[test]
    fn linear_bytes_reject_garbage() {
        assert!(linear_from_bytes(&[]).is_err());
        assert!(linear_from_bytes(&[0, 0, 0, 0]).is_err());
        // rank 1, bound 100, no payload
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&100u32.to_le_bytes());
        assert!(linear_from_bytes(&bytes).is_err());
    }

    #[test]
    fn region_bytes_roundtrip() {
        let mut region = RoaringBitmap::new();
        for d in [3u32, 17, 255, 4000] {
            region.insert(d);
        }
        let bytes = region_to_bytes(4096, &region);
        let (max, back) = region_from_bytes(&bytes).unwrap();
        assert_eq!(max, 4096);
        assert_eq!(back, region);

        let (_, empty) = region_from_bytes(&region_to_bytes(64, &RoaringBitmap::new())).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn region_bytes_reject_disorder() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(&7u32.to_le_bytes());
        bytes.extend_from_slice(&7u32.to_le_bytes());
        assert!(region_from_bytes(&bytes).is_err());
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(&200u32.to_le_bytes());
        assert!(region_from_bytes(&bytes).is_err());
    }
}
