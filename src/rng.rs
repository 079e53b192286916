//! Random sampling helpers
//!
//! Thin wrappers over [`rand::Rng`] covering the selection patterns the packer
//! needs: a uniform element, a distinct k-sample from an index range, and
//! independent Bernoulli inclusion per index. Generators are always passed in
//! explicitly; they are the only source of nondeterminism in the library.

use rand::{Rng, RngExt};

/// Uniformly random element of `items`, or `None` when empty.
pub fn random_element<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[rng.random_range(0..items.len())])
    }
}

/// Distinct sample of `k` indices from `[lo, hi)` by reservoir selection.
///
/// Returns all of the range when `k` meets or exceeds its size. Order is not
/// specified; sort the result when a canonical order is needed.
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, lo: u32, hi: u32, k: u32) -> Vec<u32> {
    let n = hi.saturating_sub(lo);
    let k = k.min(n) as usize;
    let mut reservoir: Vec<u32> = (lo..lo + k as u32).collect();
    for i in k as u32..n {
        let j = rng.random_range(0..=i) as usize;
        if j < k {
            reservoir[j] = lo + i;
        }
    }
    reservoir
}

/// Every index of `[lo, hi)` kept independently with probability `p`,
/// ascending.
///
/// `p <= 0` selects nothing and `p >= 1` selects everything, exactly.
pub fn random_samples<R: Rng + ?Sized>(rng: &mut R, lo: u32, hi: u32, p: f64) -> Vec<u32> {
    let mut out = Vec::new();
    for i in lo..hi {
        if rng.random::<f64>() < p {
            out.push(i);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_element_handles_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [i32; 0] = [];
        assert!(random_element(&mut rng, &empty).is_none());
        let one = [42];
        assert_eq!(random_element(&mut rng, &one), Some(&42));
    }

    #[test]
    fn random_range_is_distinct_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for k in [0u32, 1, 5, 20, 50] {
            let mut sample = random_range(&mut rng, 10, 50, k);
            sample.sort_unstable();
            assert_eq!(sample.len(), (k as usize).min(40));
            sample.windows(2).for_each(|w| assert!(w[0] < w[1]));
            assert!(sample.iter().all(|&i| (10..50).contains(&i)));
        }
    }

    #[test]
    fn random_samples_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!(random_samples(&mut rng, 0, 100, 0.0).is_empty());
        let all = random_samples(&mut rng, 0, 100, 1.0);
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn random_samples_rough_density() {
        let mut rng = StdRng::seed_from_u64(13);
        let picked = random_samples(&mut rng, 0, 10_000, 0.3).len();
        assert!((2_400..3_600).contains(&picked), "picked {}", picked);
    }
}
