//! # Deterministic RNG
//!
//! Explicit-state random source threaded through every generation call.
//! There is no ambient randomness anywhere in the crate: every random
//! decision draws from a [`GenRng`] handed in by the caller.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded random source.
///
/// # Examples
///
/// ```
/// use floorplan::GenRng;
///
/// let mut a = GenRng::from_seed(7);
/// let mut b = GenRng::from_seed(7);
/// assert_eq!(a.range_inclusive(0, 100), b.range_inclusive(0, 100));
/// ```
#[derive(Debug, Clone)]
pub struct GenRng {
    seed: u64,
    inner: StdRng,
}

impl GenRng {
    /// Creates a generator whose whole stream is determined by `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed this generator was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns true with probability `p`. Values outside `[0, 1]` saturate.
    pub fn chance(&mut self, p: f64) -> bool {
        if !(p > 0.0) {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.inner.gen_bool(p)
    }

    /// Uniform integer in `lo..=hi`. Returns `lo` when the range is empty.
    pub fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..=hi)
    }

    /// Uniform signed integer in `lo..=hi`. Returns `lo` when the range is empty.
    pub fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..=hi)
    }

    /// Uniform float in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform float in `[-1, 1)`.
    pub fn signed_unit(&mut self) -> f64 {
        self.unit() * 2.0 - 1.0
    }

    /// Derives an independent child stream.
    ///
    /// The child depends only on this generator's seed and `stream`, never on
    /// how much of the parent stream has been consumed.
    pub fn fork(&self, stream: u64) -> GenRng {
        GenRng::from_seed(mix_seed_stream(self.seed, stream))
    }
}

fn mix_seed_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}
