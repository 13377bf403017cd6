//! Azimuth misalignment as a wandering inter-channel delay skew.
//!
//! A tilted head reaches one track slightly before the other. The skew
//! wanders with a slow LFO plus a smoothed random target, and is applied
//! with opposite sign to the first two channels:
//!
//! ```text
//! left  delay = J · (1 + j(t))
//! right delay = J · (1 - j(t))      j(t) ∈ [-1, 1]
//! ```
//!
//! `J = 0` reads every line at tap 0, which is the input itself.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use cassette_core::{
    BlockRamp, FractionalDelay, Lfo, ParamDescriptor, ParamUnit, Rng, SmoothedParam, TapeModule,
    checked_sample_rate, frame_count, ms_to_samples, sanitize, sanitize_buffer,
};

/// Largest jitter.
pub const MAX_JITTER_MS: f32 = 2.0;

const WANDER_RATE_HZ: f32 = 0.5;
const RETARGET_INTERVAL_S: f32 = 0.5;
const RANDOM_SMOOTHING_MS: f32 = 150.0;
const LFO_WEIGHT: f32 = 0.6;
const RANDOM_WEIGHT: f32 = 0.4;
const SEED_SALT: u64 = 0xA217_0000;

/// Jitter depth.
pub const JITTER: ParamDescriptor = ParamDescriptor::new(
    "azimuth_jitter_ms",
    "Azimuth Jitter",
    ParamUnit::Milliseconds,
    0.0,
    MAX_JITTER_MS,
    0.0,
);

/// Stereo azimuth skew.
#[derive(Debug, Clone)]
pub struct Azimuth {
    sample_rate: f32,
    jitter_ms: BlockRamp,
    wander: Wander,
    lines: Vec<FractionalDelay>,
}

/// Source of the skew `j(t)`.
#[derive(Debug, Clone)]
struct Wander {
    lfo: Lfo,
    random: SmoothedParam,
    interval: usize,
    countdown: usize,
    rng: Rng,
}

impl Wander {
    fn new(sample_rate: f32) -> Self {
        Self {
            lfo: Lfo::new(sample_rate, WANDER_RATE_HZ),
            random: SmoothedParam::with_config(0.0, sample_rate, RANDOM_SMOOTHING_MS),
            interval: retarget_interval(sample_rate),
            countdown: retarget_interval(sample_rate),
            rng: Rng::new(cassette_core::DEFAULT_SEED ^ SEED_SALT),
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.lfo.set_sample_rate(sample_rate);
        self.random.set_sample_rate(sample_rate);
        self.interval = retarget_interval(sample_rate);
        self.countdown = self.interval;
    }

    fn reset(&mut self) {
        self.lfo.reset();
        self.random.set_immediate(0.0);
        self.countdown = self.interval;
    }

    #[inline]
    fn next(&mut self) -> f32 {
        self.countdown -= 1;
        if self.countdown == 0 {
            self.countdown = self.interval;
            self.random.set_target(self.rng.next_bipolar());
        }
        let skew = LFO_WEIGHT * self.lfo.next() + RANDOM_WEIGHT * self.random.advance();
        skew.clamp(-1.0, 1.0)
    }
}

impl Default for Azimuth {
    fn default() -> Self {
        Self::new()
    }
}

impl Azimuth {
    /// Creates an aligned (zero jitter) head.
    pub fn new() -> Self {
        let sample_rate = checked_sample_rate(0.0);
        Self {
            sample_rate,
            jitter_ms: BlockRamp::new(0.0),
            wander: Wander::new(sample_rate),
            lines: Vec::new(),
        }
    }

    /// Sets the jitter depth in ms.
    pub fn set_jitter_ms(&mut self, jitter_ms: f32) {
        self.jitter_ms.set_target(JITTER.clamp(jitter_ms));
    }

    /// Target jitter in ms.
    pub fn jitter_ms(&self) -> f32 {
        self.jitter_ms.target()
    }

    /// Reseeds the wander generator.
    pub fn set_seed(&mut self, seed: u64) {
        self.wander.rng.reseed(seed ^ SEED_SALT);
    }
}

impl TapeModule for Azimuth {
    fn prepare(&mut self, sample_rate: f32, channels: usize) {
        let sample_rate = checked_sample_rate(sample_rate);
        self.sample_rate = sample_rate;
        self.wander.set_sample_rate(sample_rate);

        let pairs = if channels >= 2 { 2 } else { 0 };
        // Worst case is J·(1 + 1); +3 covers interpolation and rounding.
        let capacity = libm::ceilf(2.0 * ms_to_samples(MAX_JITTER_MS, sample_rate)) as usize + 3;
        #[cfg(feature = "tracing")]
        tracing::debug!("azimuth: prepare {channels} ch, {capacity} samples per line");
        self.lines.resize_with(pairs, || FractionalDelay::new(capacity));
        for line in &mut self.lines {
            line.resize(capacity);
        }
    }

    fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        let frames = frame_count(buffer.len(), channels);
        if frames == 0 {
            return;
        }
        let active = &mut buffer[..frames * channels];
        let [left_line, right_line] = self.lines.as_mut_slice() else {
            sanitize_buffer(active);
            return;
        };
        if channels < 2 {
            sanitize_buffer(active);
            return;
        }

        let per_ms = ms_to_samples(1.0, self.sample_rate);
        self.jitter_ms.begin_block(frames);
        for frame in active.chunks_exact_mut(channels) {
            let depth = self.jitter_ms.advance() * per_ms;
            let skew = self.wander.next();
            frame[0] = left_line.process(sanitize(frame[0]), depth * (1.0 + skew));
            frame[1] = right_line.process(sanitize(frame[1]), depth * (1.0 - skew));
            for sample in &mut frame[2..] {
                *sample = sanitize(*sample);
            }
        }
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.wander.reset();
        self.jitter_ms.set_immediate(self.jitter_ms.target());
    }

    fn is_neutral(&self) -> bool {
        self.jitter_ms.is_settled() && self.jitter_ms.get() == 0.0
    }
}

fn retarget_interval(sample_rate: f32) -> usize {
    ((RETARGET_INTERVAL_S * sample_rate) as usize).max(1)
}
