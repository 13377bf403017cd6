//! Wow and flutter: transport speed variation as a modulated delay.
//!
//! Two sine LFOs sweep a per-channel fractional delay line. The slow one
//! (wow) swings up to [`MAX_WOW_MS`], the fast one (flutter) up to
//! [`MAX_FLUTTER_MS`]. A small random phase drift is redrawn every half
//! second so the wobble never repeats exactly.
//!
//! # Signal Flow
//!
//! ```text
//! Wow LFO ─────┐
//!              ├──→ delay(t) ──→ FractionalDelay[ch] ──→ Output
//! Flutter LFO ─┘        ↑
//!                  phase drift (Rng, smoothed)
//! ```
//!
//! The modulation is unipolar with no base delay:
//! `delay = wow·Wmax·½(1+sin φw) + flutter·Fmax·½(1+sin φf)`.
//! At zero depth the delay is exactly zero and the module is an identity.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use cassette_core::{
    BlockRamp, FractionalDelay, Lfo, ParamDescriptor, ParamUnit, Rng, SmoothedParam, TapeModule,
    checked_sample_rate, frame_count, ms_to_samples, sanitize, sanitize_buffer,
};

/// Delay swing at full wow depth.
pub const MAX_WOW_MS: f32 = 10.0;
/// Delay swing at full flutter depth.
pub const MAX_FLUTTER_MS: f32 = 2.5;

const DRIFT_INTERVAL_S: f32 = 0.5;
const DRIFT_RANGE_CYCLES: f32 = 0.05;
const DRIFT_SMOOTHING_MS: f32 = 200.0;
const SEED_SALT: u64 = 0x0057_07F1;

/// Wow depth, normalized to [`MAX_WOW_MS`].
pub const WOW_DEPTH: ParamDescriptor =
    ParamDescriptor::new("wow_depth", "Wow Depth", ParamUnit::None, 0.0, 1.0, 0.0);
/// Flutter depth, normalized to [`MAX_FLUTTER_MS`].
pub const FLUTTER_DEPTH: ParamDescriptor =
    ParamDescriptor::new("flutter_depth", "Flutter Depth", ParamUnit::None, 0.0, 1.0, 0.0);
/// Wow LFO rate.
pub const WOW_RATE: ParamDescriptor =
    ParamDescriptor::new("wow_rate_hz", "Wow Rate", ParamUnit::Hertz, 0.05, 4.0, 0.6);
/// Flutter LFO rate.
pub const FLUTTER_RATE: ParamDescriptor =
    ParamDescriptor::new("flutter_rate_hz", "Flutter Rate", ParamUnit::Hertz, 2.0, 20.0, 6.0);

/// Wow and flutter pitch modulator.
///
/// ## Parameters
///
/// | Name | Range | Default |
/// |------|-------|---------|
/// | Wow Depth | 0.0–1.0 | 0.0 |
/// | Flutter Depth | 0.0–1.0 | 0.0 |
/// | Wow Rate | 0.05–4.0 Hz | 0.6 |
/// | Flutter Rate | 2.0–20.0 Hz | 6.0 |
///
/// # Example
///
/// ```rust
/// use cassette_core::TapeModule;
/// use cassette_effects::WowFlutter;
///
/// let mut wf = WowFlutter::new();
/// wf.prepare(48000.0, 2);
/// wf.set_wow_depth(0.3);
/// wf.set_flutter_depth(0.1);
///
/// let mut block = vec![0.25f32; 256];
/// wf.process_interleaved(&mut block, 2);
/// ```
#[derive(Debug, Clone)]
pub struct WowFlutter {
    sample_rate: f32,
    wow_lfo: Lfo,
    flutter_lfo: Lfo,
    wow_depth: BlockRamp,
    flutter_depth: BlockRamp,
    /// Phase offset in cycles, shared by both LFOs.
    drift: SmoothedParam,
    drift_interval: usize,
    drift_countdown: usize,
    rng: Rng,
    lines: Vec<FractionalDelay>,
}

impl Default for WowFlutter {
    fn default() -> Self {
        Self::new()
    }
}

impl WowFlutter {
    /// Creates an unprepared modulator at zero depth.
    pub fn new() -> Self {
        let sample_rate = checked_sample_rate(0.0);
        Self {
            sample_rate,
            wow_lfo: Lfo::new(sample_rate, WOW_RATE.default),
            flutter_lfo: Lfo::new(sample_rate, FLUTTER_RATE.default),
            wow_depth: BlockRamp::new(0.0),
            flutter_depth: BlockRamp::new(0.0),
            drift: SmoothedParam::with_config(0.0, sample_rate, DRIFT_SMOOTHING_MS),
            drift_interval: drift_interval(sample_rate),
            drift_countdown: drift_interval(sample_rate),
            rng: Rng::new(cassette_core::DEFAULT_SEED ^ SEED_SALT),
            lines: Vec::new(),
        }
    }

    /// Sets wow depth in \[0, 1\]; NaN reads as zero.
    pub fn set_wow_depth(&mut self, depth: f32) {
        self.wow_depth.set_target(clamp_depth(depth));
    }

    /// Target wow depth.
    pub fn wow_depth(&self) -> f32 {
        self.wow_depth.target()
    }

    /// Sets flutter depth in \[0, 1\]; NaN reads as zero.
    pub fn set_flutter_depth(&mut self, depth: f32) {
        self.flutter_depth.set_target(clamp_depth(depth));
    }

    /// Target flutter depth.
    pub fn flutter_depth(&self) -> f32 {
        self.flutter_depth.target()
    }

    /// Sets the wow LFO rate in Hz.
    pub fn set_wow_rate(&mut self, hz: f32) {
        self.wow_lfo.set_frequency(WOW_RATE.clamp(hz));
    }

    /// Wow LFO rate in Hz.
    pub fn wow_rate(&self) -> f32 {
        self.wow_lfo.frequency()
    }

    /// Sets the flutter LFO rate in Hz.
    pub fn set_flutter_rate(&mut self, hz: f32) {
        self.flutter_lfo.set_frequency(FLUTTER_RATE.clamp(hz));
    }

    /// Flutter LFO rate in Hz.
    pub fn flutter_rate(&self) -> f32 {
        self.flutter_lfo.frequency()
    }

    /// Reseeds the drift generator.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng.reseed(seed ^ SEED_SALT);
    }

    /// Delay-line capacity required at `sample_rate`.
    pub fn required_capacity(sample_rate: f32) -> usize {
        let max = ms_to_samples(MAX_WOW_MS + MAX_FLUTTER_MS, sample_rate);
        // +1 for the interpolation partner, +2 slack for rounding
        libm::ceilf(max) as usize + 3
    }

    #[inline]
    fn next_drift(&mut self) -> f32 {
        self.drift_countdown -= 1;
        if self.drift_countdown == 0 {
            self.drift_countdown = self.drift_interval;
            let target = self.rng.range(-DRIFT_RANGE_CYCLES, DRIFT_RANGE_CYCLES);
            self.drift.set_target(target);
        }
        self.drift.advance()
    }
}

impl TapeModule for WowFlutter {
    fn prepare(&mut self, sample_rate: f32, channels: usize) {
        let sample_rate = checked_sample_rate(sample_rate);
        self.sample_rate = sample_rate;
        self.wow_lfo.set_sample_rate(sample_rate);
        self.flutter_lfo.set_sample_rate(sample_rate);
        self.drift.set_sample_rate(sample_rate);
        self.drift_interval = drift_interval(sample_rate);
        self.drift_countdown = self.drift_interval;

        let capacity = Self::required_capacity(sample_rate);
        #[cfg(feature = "tracing")]
        tracing::debug!("wow_flutter: prepare {channels} ch, {capacity} samples per line");
        self.lines.resize_with(channels, || FractionalDelay::new(capacity));
        for line in &mut self.lines {
            line.resize(capacity);
        }
    }

    fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        let frames = frame_count(buffer.len(), channels);
        if frames == 0 {
            return;
        }
        let active = channels.min(self.lines.len());
        if active == 0 {
            sanitize_buffer(&mut buffer[..frames * channels]);
            return;
        }

        let wow_max = ms_to_samples(MAX_WOW_MS, self.sample_rate);
        let flutter_max = ms_to_samples(MAX_FLUTTER_MS, self.sample_rate);
        self.wow_depth.begin_block(frames);
        self.flutter_depth.begin_block(frames);

        for frame in buffer.chunks_exact_mut(channels).take(frames) {
            let wow = self.wow_depth.advance();
            let flutter = self.flutter_depth.advance();
            let drift = self.next_drift();
            let wow_mod = 0.5 * (1.0 + self.wow_lfo.next_with_offset(drift));
            let flutter_mod = 0.5 * (1.0 + self.flutter_lfo.next_with_offset(drift));
            let delay = wow * wow_max * wow_mod + flutter * flutter_max * flutter_mod;

            for (sample, line) in frame.iter_mut().zip(self.lines.iter_mut()) {
                *sample = line.process(sanitize(*sample), delay);
            }
            for sample in frame.iter_mut().skip(active) {
                *sample = sanitize(*sample);
            }
        }
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.wow_lfo.reset();
        self.flutter_lfo.reset();
        self.drift.set_immediate(0.0);
        self.drift_countdown = self.drift_interval;
        self.wow_depth.set_immediate(self.wow_depth.target());
        self.flutter_depth.set_immediate(self.flutter_depth.target());
    }

    fn is_neutral(&self) -> bool {
        self.wow_depth.is_settled()
            && self.flutter_depth.is_settled()
            && self.wow_depth.get() == 0.0
            && self.flutter_depth.get() == 0.0
    }
}

fn clamp_depth(depth: f32) -> f32 {
    if depth.is_nan() { 0.0 } else { depth.clamp(0.0, 1.0) }
}

fn drift_interval(sample_rate: f32) -> usize {
    ((DRIFT_INTERVAL_S * sample_rate) as usize).max(1)
}
