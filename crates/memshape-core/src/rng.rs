//! Seeded payload source.
//!
//! SplitMix64 keeps dataset generation deterministic per seed so that the
//! value-shaped and reference-shaped datasets of one run carry identical
//! content, while still giving every field an independent value.

/// Default seed when `MEMSHAPE_SEED` is unset.
pub const DEFAULT_SEED: u64 = 0x5EED_CAFE;

#[derive(Debug, Clone)]
pub struct PayloadRng {
    state: u64,
}

impl PayloadRng {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Non-negative 63-bit value.
    #[inline]
    pub fn next_i63(&mut self) -> i64 {
        (self.next_u64() >> 1) as i64
    }

    #[inline]
    pub fn next_i31(&mut self) -> i32 {
        (self.next_u64() >> 33) as i32
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    #[inline]
    pub fn next_byte(&mut self) -> u8 {
        (self.next_u64() >> 56) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = PayloadRng::new(42);
        let mut b = PayloadRng::new(42);
        for _ in 0..64 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = PayloadRng::new(1);
        let mut b = PayloadRng::new(2);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn i63_is_never_negative() {
        let mut rng = PayloadRng::new(7);
        for _ in 0..10_000 {
            assert!(rng.next_i63() >= 0);
            assert!(rng.next_i31() >= 0);
        }
    }

    #[test]
    fn f64_stays_in_unit_interval() {
        let mut rng = PayloadRng::new(9);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
