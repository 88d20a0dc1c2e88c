//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through a SeededRng derived from a string key
//! (in practice the game id), so regenerating demo data for the same
//! game is reproducible bit-for-bit on every platform.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG stream keyed by a string.
pub struct SeededRng {
    inner: Pcg64Mcg,
}

/// Shorthand for `SeededRng::from_key`.
pub fn seeded(key: &str) -> SeededRng {
    SeededRng::from_key(key)
}

impl SeededRng {
    pub fn from_key(key: &str) -> Self {
        let seed = hash_key(key);
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed as u64),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll an index in [0, n) as `floor(next_f64() * n)`.
    pub fn index_below(&mut self, n: usize) -> usize {
        assert!(n > 0, "n must be > 0");
        let idx = (self.next_f64() * n as f64) as usize;
        // f64 rounding can land exactly on n for very large n.
        idx.min(n - 1)
    }

    /// Uniform float in [min, max).
    pub fn between(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }
}

impl Iterator for SeededRng {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

/// xmur3-style multiply-mix hash of the key's UTF-16 units to 32 bits.
fn hash_key(key: &str) -> u32 {
    let units: Vec<u16> = key.encode_utf16().collect();
    let mut h: u32 = 1_779_033_703 ^ units.len() as u32;
    for unit in units {
        h = (h ^ unit as u32).wrapping_mul(3_432_918_353);
        h = h.rotate_left(13);
    }
    h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
    h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
    h ^ (h >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_stream() {
        let a: Vec<f64> = seeded("week-1").take(64).collect();
        let b: Vec<f64> = seeded("week-1").take(64).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let mut rng = seeded("homecoming-2025");
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn hash_distinguishes_close_keys() {
        assert_ne!(hash_key("week-1"), hash_key("week-2"));
        assert_ne!(hash_key(""), hash_key(" "));
    }

    #[test]
    fn index_below_never_reaches_bound() {
        let mut rng = seeded("bounds");
        for n in 1..50 {
            for _ in 0..100 {
                assert!(rng.index_below(n) < n);
            }
        }
    }
}
