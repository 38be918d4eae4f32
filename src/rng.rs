//! Seeded pseudo-random streams for the displacement field.
//!
//! Everything here is integer-only so a given seed produces the same stream
//! on every platform.

/// Multiplier applied to a frame seed when deriving the second stream.
///
/// Odd, so the multiplication is a bijection on `u64`.
pub const SEED_SPLIT_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

/// Mask XOR-ed into the multiplied seed when deriving the second stream. Odd.
pub const SEED_SPLIT_XOR: u64 = 0xBF58_476D_1CE4_E5B9;

/// Derive the seed of the `dy` stream from the seed of the `dx` stream.
///
/// `split_seed(seed) = seed * SEED_SPLIT_MULTIPLIER ^ SEED_SPLIT_XOR` with
/// wrapping multiplication. The mapping is a bijection, so distinct frame
/// seeds never collide on their second stream.
pub const fn split_seed(seed: u64) -> u64 {
    seed.wrapping_mul(SEED_SPLIT_MULTIPLIER) ^ SEED_SPLIT_XOR
}

/// Tiny deterministic PRNG (xorshift64*).
#[derive(Debug, Clone, Copy)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Build a deterministic RNG from a 64-bit seed.
    ///
    /// `seed = 0` is remapped to a non-zero internal state so the generator
    /// cannot lock into an all-zero sequence.
    pub const fn from_seed(seed: u64) -> Self {
        let mixed = seed ^ 0x2545_F491_4F6C_DD1D;
        let state = if mixed == 0 {
            0xA076_1D64_78BD_642F
        } else {
            mixed
        };
        Self { state }
    }

    /// Next pseudo-random `u64`.
    #[inline(always)]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform value in `[0, 1)` built from the top 24 bits, exact in `f32`.
    #[inline(always)]
    pub fn next_unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u32 << 24) as f32
    }

    /// Uniform value in `[-1, 1)`.
    #[inline(always)]
    pub fn next_signed(&mut self) -> f32 {
        self.next_unit() * 2.0 - 1.0
    }
}
