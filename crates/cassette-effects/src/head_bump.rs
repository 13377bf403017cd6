//! Head bump: the low-frequency resonance of a playback head.
//!
//! One peaking biquad per channel. All channels share a single coefficient
//! set that glides toward the design target with a 20 ms time constant, so
//! moving the frequency or gain never steps the filter.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use cassette_core::{
    Biquad, BlockRamp, Coefficients, ParamDescriptor, ParamUnit, TapeModule, checked_sample_rate,
    frame_count, peaking, sanitize, sanitize_buffer, smoothing_alpha,
};

/// Resonance Q.
pub const HEAD_BUMP_Q: f32 = 0.9;
/// Highest design frequency as a fraction of the sample rate.
pub const MAX_FREQ_RATIO: f32 = 0.45;

const COEFF_SMOOTHING_S: f32 = 0.020;

/// Peak gain.
pub const GAIN: ParamDescriptor =
    ParamDescriptor::new("head_bump_gain_db", "Head Bump", ParamUnit::Decibels, -12.0, 12.0, 0.0);
/// Peak center frequency.
pub const FREQUENCY: ParamDescriptor = ParamDescriptor::new(
    "head_bump_freq_hz",
    "Head Bump Freq",
    ParamUnit::Hertz,
    20.0,
    20000.0,
    80.0,
);
/// Dry/wet balance.
pub const MIX: ParamDescriptor =
    ParamDescriptor::new("head_bump_mix", "Head Bump Mix", ParamUnit::Ratio, 0.0, 1.0, 1.0);

/// Smoothed resonant peak.
///
/// ## Parameters
///
/// | Name | Range | Default |
/// |------|-------|---------|
/// | Gain | -12.0–12.0 dB | 0.0 |
/// | Frequency | 20 Hz–0.45·fs | 80.0 |
/// | Mix | 0.0–1.0 | 1.0 |
#[derive(Debug, Clone)]
pub struct HeadBump {
    sample_rate: f32,
    gain_db: f32,
    freq_hz: f32,
    mix: BlockRamp,
    target: Coefficients,
    current: Coefficients,
    alpha: f32,
    filters: Vec<Biquad>,
}

impl Default for HeadBump {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadBump {
    /// Creates a flat head bump.
    pub fn new() -> Self {
        let sample_rate = checked_sample_rate(0.0);
        Self {
            sample_rate,
            gain_db: GAIN.default,
            freq_hz: FREQUENCY.default,
            mix: BlockRamp::new(MIX.default),
            target: Coefficients::IDENTITY,
            current: Coefficients::IDENTITY,
            alpha: smoothing_alpha(COEFF_SMOOTHING_S, sample_rate),
            filters: Vec::new(),
        }
    }

    /// Sets the peak gain in dB.
    pub fn set_gain_db(&mut self, gain_db: f32) {
        let gain_db = GAIN.clamp(gain_db);
        if gain_db != self.gain_db {
            self.gain_db = gain_db;
            self.update_target();
        }
    }

    /// Peak gain in dB.
    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Sets the center frequency in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        let freq_hz = FREQUENCY.clamp(freq_hz);
        if freq_hz != self.freq_hz {
            self.freq_hz = freq_hz;
            self.update_target();
        }
    }

    /// Center frequency in Hz, before the sample-rate clamp.
    pub fn frequency(&self) -> f32 {
        self.freq_hz
    }

    /// Sets the dry/wet mix in \[0, 1\].
    pub fn set_mix(&mut self, mix: f32) {
        self.mix.set_target(MIX.clamp(mix));
    }

    /// Target mix.
    pub fn mix(&self) -> f32 {
        self.mix.target()
    }

    /// Coefficients currently applied.
    pub fn current_coefficients(&self) -> Coefficients {
        self.current
    }

    /// Coefficients being approached.
    pub fn target_coefficients(&self) -> Coefficients {
        self.target
    }

    fn update_target(&mut self) {
        self.target = if self.gain_db.abs() < 1e-4 {
            Coefficients::IDENTITY
        } else {
            let freq = self.freq_hz.min(MAX_FREQ_RATIO * self.sample_rate);
            peaking(self.sample_rate, freq, self.gain_db, HEAD_BUMP_Q)
        };
    }
}

impl TapeModule for HeadBump {
    fn prepare(&mut self, sample_rate: f32, channels: usize) {
        self.sample_rate = checked_sample_rate(sample_rate);
        self.alpha = smoothing_alpha(COEFF_SMOOTHING_S, self.sample_rate);
        self.update_target();
        self.current = self.target;
        self.filters.clear();
        self.filters.resize(channels, Biquad::new());
    }

    fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        let frames = frame_count(buffer.len(), channels);
        if frames == 0 {
            return;
        }
        if self.is_neutral() {
            sanitize_buffer(&mut buffer[..frames * channels]);
            return;
        }

        self.mix.begin_block(frames);
        for frame in buffer.chunks_exact_mut(channels).take(frames) {
            self.current.approach(&self.target, self.alpha);
            let mix = self.mix.advance();
            let coeffs = self.current;

            for (ch, sample) in frame.iter_mut().enumerate() {
                let dry = sanitize(*sample);
                let Some(filter) = self.filters.get_mut(ch) else {
                    *sample = dry;
                    continue;
                };
                let wet = filter.process_with(dry, &coeffs);
                *sample = if wet.is_finite() {
                    dry + mix * (wet - dry)
                } else {
                    filter.clear();
                    0.0
                };
            }
        }
    }

    fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.clear();
        }
        self.current = self.target;
        self.mix.set_immediate(self.mix.target());
    }

    fn is_neutral(&self) -> bool {
        let flat = self.current == Coefficients::IDENTITY && self.target == Coefficients::IDENTITY;
        let dry = self.mix.is_settled() && self.mix.get() == 0.0;
        flat || dry
    }
}
