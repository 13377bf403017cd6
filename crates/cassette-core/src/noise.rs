//! Seeded pseudo-random source and tilted noise.
//!
//! [`Rng`] is a xorshift64* generator: tiny state, no allocation, and fully
//! reproducible for a given seed. [`TiltedNoise`] shapes its white output with
//! a one-pole spectral tilt that keeps RMS constant across tilt amounts:
//!
//! ```text
//! colored = (1 + t) * white - t * prev_white
//! out     = colored / sqrt(1 + 2t + 2t^2)
//! ```

use libm::sqrtf;

/// Seed used when a caller asks for a deterministic default.
pub const DEFAULT_SEED: u64 = 0x1234_567;

/// xorshift64* pseudo-random generator.
///
/// # Example
///
/// ```rust
/// use cassette_core::Rng;
///
/// let mut a = Rng::new(42);
/// let mut b = Rng::new(42);
/// assert_eq!(a.next_u32(), b.next_u32());
/// let x = a.next_f32();
/// assert!((0.0..1.0).contains(&x));
/// ```
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Creates a generator. A zero seed is remapped, since xorshift would
    /// otherwise stay at zero forever.
    pub fn new(seed: u64) -> Self {
        Self {
            state: scramble(seed),
        }
    }

    /// Creates a generator seeded from the process's random hasher keys.
    #[cfg(feature = "std")]
    pub fn from_entropy() -> Self {
        use std::hash::BuildHasher;
        let seed = std::collections::hash_map::RandomState::new().hash_one(0x5eed_u64);
        Self::new(seed)
    }

    /// Reseeds in place.
    pub fn reseed(&mut self, seed: u64) {
        self.state = scramble(seed);
    }

    /// Next 64 random bits.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Next 32 random bits.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform value in \[0, 1).
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        // 24 mantissa bits give an exactly representable grid below 1.0
        (self.next_u32() >> 8) as f32 * (1.0 / 16_777_216.0)
    }

    /// Uniform value in \[-1, 1).
    #[inline]
    pub fn next_bipolar(&mut self) -> f32 {
        2.0 * self.next_f32() - 1.0
    }

    /// Uniform value in \[min, max).
    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// Zero-mean uniform noise with unit RMS.
    #[inline]
    pub fn white(&mut self) -> f32 {
        const SQRT_3: f32 = 1.732_050_8;
        self.next_bipolar() * SQRT_3
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// SplitMix64 finalizer; spreads low-entropy seeds and never returns zero.
fn scramble(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    if z == 0 { 0x9E37_79B9_7F4A_7C15 } else { z }
}

/// Largest tilt magnitude accepted by [`TiltedNoise::set_tilt`].
pub const MAX_TILT: f32 = 0.95;

/// Per-channel spectral tilt applied to a white source.
///
/// Positive tilt brightens, negative tilt darkens; zero is white.
#[derive(Debug, Clone)]
pub struct TiltedNoise {
    prev_white: f32,
    tilt: f32,
    norm: f32,
}

impl TiltedNoise {
    /// Creates a white (untilted) shaper.
    pub fn new() -> Self {
        Self {
            prev_white: 0.0,
            tilt: 0.0,
            norm: 1.0,
        }
    }

    /// Sets the tilt, clamped to \[-0.95, 0.95\].
    pub fn set_tilt(&mut self, tilt: f32) {
        let t = if tilt.is_finite() {
            tilt.clamp(-MAX_TILT, MAX_TILT)
        } else {
            0.0
        };
        self.tilt = t;
        self.norm = 1.0 / sqrtf(1.0 + 2.0 * t + 2.0 * t * t);
    }

    /// Current tilt.
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    /// Shapes one white sample.
    #[inline]
    pub fn process(&mut self, white: f32) -> f32 {
        let t = self.tilt;
        let colored = (1.0 + t) * white - t * self.prev_white;
        self.prev_white = white;
        colored * self.norm
    }

    /// Forgets the previous sample.
    pub fn reset(&mut self) {
        self.prev_white = 0.0;
    }
}

impl Default for TiltedNoise {
    fn default() -> Self {
        Self::new()
    }
}
