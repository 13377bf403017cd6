//! Additive tape hiss.
//!
//! Seeded white noise, tilted per channel, scaled by a level in dBFS and
//! added to the signal. Levels at or below [`SILENCE_FLOOR_DB`] are exact
//! silence.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use cassette_core::{
    BlockRamp, ParamDescriptor, ParamUnit, Rng, TapeModule, TiltedNoise, db_to_linear,
    frame_count, sanitize, sanitize_buffer,
};

/// Levels at or below this are treated as no noise at all.
pub const SILENCE_FLOOR_DB: f32 = -200.0;

/// Hiss level.
pub const LEVEL: ParamDescriptor = ParamDescriptor::new(
    "hiss_level_dbfs",
    "Hiss",
    ParamUnit::Decibels,
    SILENCE_FLOOR_DB,
    0.0,
    SILENCE_FLOOR_DB,
);
/// Spectral tilt; positive is brighter.
pub const TILT: ParamDescriptor =
    ParamDescriptor::new("hiss_tilt", "Hiss Tilt", ParamUnit::None, -0.95, 0.95, 0.0);

/// Seeded hiss generator.
///
/// Without [`set_seed`](Self::set_seed) the generator is seeded from process
/// entropy (with `std`) or a fixed constant (without).
///
/// # Example
///
/// ```rust
/// use cassette_core::TapeModule;
/// use cassette_effects::Hiss;
///
/// let mut hiss = Hiss::with_seed(42);
/// hiss.set_level_dbfs(-60.0);
/// hiss.prepare(48000.0, 2);
///
/// let mut block = vec![0.0f32; 256];
/// hiss.process_interleaved(&mut block, 2);
/// assert!(block.iter().any(|&s| s != 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct Hiss {
    rng: Rng,
    level_dbfs: f32,
    tilt: f32,
    level: BlockRamp,
    shapers: Vec<TiltedNoise>,
}

impl Default for Hiss {
    fn default() -> Self {
        Self::new()
    }
}

impl Hiss {
    /// Creates a silent generator with a non-deterministic seed.
    pub fn new() -> Self {
        #[cfg(feature = "std")]
        let rng = Rng::from_entropy();
        #[cfg(not(feature = "std"))]
        let rng = Rng::default();
        Self::with_rng(rng)
    }

    /// Creates a silent generator with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Rng::new(seed))
    }

    fn with_rng(rng: Rng) -> Self {
        Self {
            rng,
            level_dbfs: LEVEL.default,
            tilt: TILT.default,
            level: BlockRamp::new(0.0),
            shapers: Vec::new(),
        }
    }

    /// Reseeds the generator and clears the shapers.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng.reseed(seed);
        for shaper in &mut self.shapers {
            shaper.reset();
        }
    }

    /// Sets the level in dBFS.
    pub fn set_level_dbfs(&mut self, level_dbfs: f32) {
        self.level_dbfs = LEVEL.clamp(level_dbfs);
        let linear = if self.level_dbfs <= SILENCE_FLOOR_DB {
            0.0
        } else {
            db_to_linear(self.level_dbfs)
        };
        self.level.set_target(linear);
    }

    /// Level in dBFS.
    pub fn level_dbfs(&self) -> f32 {
        self.level_dbfs
    }

    /// Sets the spectral tilt.
    pub fn set_tilt(&mut self, tilt: f32) {
        let tilt = TILT.clamp(tilt);
        if tilt != self.tilt {
            self.tilt = tilt;
            for shaper in &mut self.shapers {
                shaper.set_tilt(tilt);
            }
        }
    }

    /// Spectral tilt.
    pub fn tilt(&self) -> f32 {
        self.tilt
    }
}

impl TapeModule for Hiss {
    fn prepare(&mut self, _sample_rate: f32, channels: usize) {
        let mut shaper = TiltedNoise::new();
        shaper.set_tilt(self.tilt);
        self.shapers.clear();
        self.shapers.resize(channels, shaper);
        self.level.set_immediate(self.level.target());
    }

    fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        let frames = frame_count(buffer.len(), channels);
        if frames == 0 {
            return;
        }
        let active = &mut buffer[..frames * channels];
        if self.is_neutral() {
            sanitize_buffer(active);
            return;
        }

        self.level.begin_block(frames);
        for frame in active.chunks_exact_mut(channels) {
            let level = self.level.advance();
            for (ch, sample) in frame.iter_mut().enumerate() {
                let x = sanitize(*sample);
                let noise = match self.shapers.get_mut(ch) {
                    Some(shaper) => shaper.process(self.rng.white()),
                    None => 0.0,
                };
                *sample = x + level * noise;
            }
        }
    }

    fn reset(&mut self) {
        for shaper in &mut self.shapers {
            shaper.reset();
        }
        self.level.set_immediate(self.level.target());
    }

    fn is_neutral(&self) -> bool {
        self.level.is_settled() && self.level.get() == 0.0
    }
}
