//! Seed derivation and the deterministic generator used by samplers.
//!
//! Reproducible randomization runs rest on two pieces:
//! - [`seed_from_index`] maps an iteration (or sample) index and a base seed to a
//!   32-bit seed with wrapping arithmetic, so the same pair always yields the same seed
//!   on every platform.
//! - [`RandomState`] is a small xorshift32 generator with explicit state. It implements
//!   [`rand::RngCore`], so samplers accept any `&mut dyn RngCore` while scenario runs
//!   stay bit-exact.
use rand::RngCore;

use crate::error::{Error, Result};

/// Multiplier used when spreading an index over the 32-bit seed space.
pub const LARGE_PRIME: u32 = 0x202A_96CF;

/// Base seed used when none is configured.
pub const DEFAULT_BASE_SEED: u32 = 0x0000_3463;

/// Derives a seed from an index and a base seed: `(base + 1) * (index + 1) * prime`.
///
/// Overflow wraps; it is part of the mixing, not an error.
#[inline]
pub fn seed_from_index(index: u32, base_seed: u32, large_prime: u32) -> u32 {
    base_seed
        .wrapping_add(1)
        .wrapping_mul(index.wrapping_add(1))
        .wrapping_mul(large_prime)
}

/// Creates a generator seeded with [`seed_from_index`].
///
/// Fails when the derived seed is zero, which xorshift cannot escape.
pub fn random_from_index(index: u32, base_seed: u32, large_prime: u32) -> Result<RandomState> {
    RandomState::new(seed_from_index(index, base_seed, large_prime))
}

/// Hashes a base seed together with an index (splitmix64 finalizer), never returning zero.
#[inline]
pub fn iterate_seed(index: u32, base_seed: u32) -> u32 {
    let mut x = ((index as u64) << 32) | base_seed as u64;
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;
    match x as u32 {
        0 => LARGE_PRIME,
        state => state,
    }
}

/// Deterministic xorshift32 generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomState {
    state: u32,
}

impl RandomState {
    /// Creates a generator from a non-zero seed.
    pub fn new(seed: u32) -> Result<Self> {
        if seed == 0 {
            return Err(Error::InvalidConfig("random seed cannot be 0".into()));
        }
        let mut rng = Self { state: seed };
        rng.next_state();
        Ok(rng)
    }

    /// Current internal state.
    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    fn next_state(&mut self) -> u32 {
        let t = self.state;
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        t
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn next_float(&mut self) -> f32 {
        unit_float(self.next_state())
    }

    /// Uniform float in `[min, max)`.
    #[inline]
    pub fn next_float_range(&mut self, min: f32, max: f32) -> f32 {
        self.next_float() * (max - min) + min
    }

    /// Uniform integer in `[min, max)`. Returns `min` when the range is empty.
    #[inline]
    pub fn next_int_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let range = (max as i64 - min as i64) as u64;
        (min as i64 + ((self.next_state() as u64 * range) >> 32) as i64) as i32
    }

    /// Draws a value usable as a seed for another generator.
    #[inline]
    pub fn next_nonzero_seed(&mut self) -> u32 {
        // xorshift output is the previous state, which is never zero.
        self.next_state()
    }
}

impl RngCore for RandomState {
    fn next_u32(&mut self) -> u32 {
        self.next_state()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = self.next_state() as u64;
        let hi = self.next_state() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_state().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

#[inline]
fn unit_float(bits: u32) -> f32 {
    f32::from_bits(0x3F80_0000 | (bits >> 9)) - 1.0
}

#[inline]
fn scale_to_index(bits: u32, len: usize) -> usize {
    ((bits as u64 * len as u64) >> 32) as usize
}

/// Generate a random float in the range [0, 1).
#[inline]
pub fn rand01(rng: &mut dyn RngCore) -> f32 {
    unit_float(rng.next_u32())
}

/// Generate a random float in the range [min, max).
#[inline]
pub fn rand_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    rand01(rng) * (max - min) + min
}

/// Generate a random index in the range [0, len). `len` must be non-zero.
#[inline]
pub fn rand_index(rng: &mut dyn RngCore, len: usize) -> usize {
    debug_assert!(len > 0);
    scale_to_index(rng.next_u32(), len)
}
