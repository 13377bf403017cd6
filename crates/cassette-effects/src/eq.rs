//! Three-band tone stage: low shelf, tunable peak, high shelf.
//!
//! Coefficient changes are applied by regenerating the three templates and
//! re-initializing every channel's filters. There is no coefficient
//! smoothing here; the stage is meant for settings that change rarely.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use cassette_core::{
    Biquad, Coefficients, ParamDescriptor, ParamUnit, TapeModule, checked_sample_rate,
    frame_count, high_shelf, low_shelf, peaking, sanitize, sanitize_buffer,
};

/// Low shelf corner.
pub const LOW_SHELF_HZ: f32 = 120.0;
/// High shelf corner.
pub const HIGH_SHELF_HZ: f32 = 6000.0;

const SHELF_SLOPE: f32 = 1.0;
const MAX_FREQ_RATIO: f32 = 0.45;

/// Low shelf gain.
pub const LOW_GAIN: ParamDescriptor =
    ParamDescriptor::new("eq_low_db", "Low", ParamUnit::Decibels, -18.0, 18.0, 0.0);
/// Mid peak gain.
pub const MID_GAIN: ParamDescriptor =
    ParamDescriptor::new("eq_mid_db", "Mid", ParamUnit::Decibels, -18.0, 18.0, 0.0);
/// High shelf gain.
pub const HIGH_GAIN: ParamDescriptor =
    ParamDescriptor::new("eq_high_db", "High", ParamUnit::Decibels, -18.0, 18.0, 0.0);
/// Mid peak frequency.
pub const MID_FREQ: ParamDescriptor = ParamDescriptor::new(
    "eq_mid_freq_hz",
    "Mid Freq",
    ParamUnit::Hertz,
    200.0,
    20000.0,
    1000.0,
);
/// Mid peak Q.
pub const MID_Q: ParamDescriptor =
    ParamDescriptor::new("eq_mid_q", "Mid Q", ParamUnit::None, 0.2, 10.0, 0.707);

/// Band settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqSettings {
    /// Low shelf gain in dB.
    pub low_db: f32,
    /// Mid peak gain in dB.
    pub mid_db: f32,
    /// High shelf gain in dB.
    pub high_db: f32,
    /// Mid peak frequency in Hz.
    pub mid_freq_hz: f32,
    /// Mid peak Q.
    pub mid_q: f32,
}

impl Default for EqSettings {
    fn default() -> Self {
        Self {
            low_db: LOW_GAIN.default,
            mid_db: MID_GAIN.default,
            high_db: HIGH_GAIN.default,
            mid_freq_hz: MID_FREQ.default,
            mid_q: MID_Q.default,
        }
    }
}

impl EqSettings {
    fn clamped(self) -> Self {
        Self {
            low_db: LOW_GAIN.clamp(self.low_db),
            mid_db: MID_GAIN.clamp(self.mid_db),
            high_db: HIGH_GAIN.clamp(self.high_db),
            mid_freq_hz: MID_FREQ.clamp(self.mid_freq_hz),
            mid_q: MID_Q.clamp(self.mid_q),
        }
    }

    /// True when every band is flat.
    pub fn is_flat(&self) -> bool {
        self.low_db == 0.0 && self.mid_db == 0.0 && self.high_db == 0.0
    }
}

/// Three-band EQ.
#[derive(Debug, Clone)]
pub struct Eq {
    sample_rate: f32,
    settings: EqSettings,
    templates: [Coefficients; 3],
    bands: Vec<[Biquad; 3]>,
}

impl Default for Eq {
    fn default() -> Self {
        Self::new()
    }
}

impl Eq {
    /// Creates a flat EQ.
    pub fn new() -> Self {
        Self {
            sample_rate: checked_sample_rate(0.0),
            settings: EqSettings::default(),
            templates: [Coefficients::IDENTITY; 3],
            bands: Vec::new(),
        }
    }

    /// Applies new band settings. Any change rebuilds every filter.
    pub fn set_settings(&mut self, settings: EqSettings) {
        let settings = settings.clamped();
        if settings != self.settings {
            self.settings = settings;
            self.rebuild();
        }
    }

    /// Current settings.
    pub fn settings(&self) -> EqSettings {
        self.settings
    }

    /// Current coefficient templates: low shelf, peak, high shelf.
    pub fn templates(&self) -> [Coefficients; 3] {
        self.templates
    }

    fn rebuild(&mut self) {
        let sr = self.sample_rate;
        let s = self.settings;
        let ceiling = MAX_FREQ_RATIO * sr;
        self.templates = [
            low_shelf(sr, LOW_SHELF_HZ.min(ceiling), s.low_db, SHELF_SLOPE),
            peaking(sr, s.mid_freq_hz.min(ceiling), s.mid_db, s.mid_q),
            high_shelf(sr, HIGH_SHELF_HZ.min(ceiling), s.high_db, SHELF_SLOPE),
        ];
        for channel in &mut self.bands {
            for (filter, coeffs) in channel.iter_mut().zip(self.templates) {
                *filter = Biquad::with_coefficients(coeffs);
            }
        }
    }
}

impl TapeModule for Eq {
    fn prepare(&mut self, sample_rate: f32, channels: usize) {
        self.sample_rate = checked_sample_rate(sample_rate);
        self.bands.clear();
        self.bands.resize(channels, Default::default());
        self.rebuild();
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

        for frame in active.chunks_exact_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let x = sanitize(*sample);
                *sample = match self.bands.get_mut(ch) {
                    Some([low, mid, high]) => {
                        let y = high.process(mid.process(low.process(x)));
                        if y.is_finite() {
                            y
                        } else {
                            low.clear();
                            mid.clear();
                            high.clear();
                            0.0
                        }
                    }
                    None => x,
                };
            }
        }
    }

    fn reset(&mut self) {
        for channel in &mut self.bands {
            for filter in channel.iter_mut() {
                filter.clear();
            }
        }
    }

    fn is_neutral(&self) -> bool {
        self.settings.is_flat()
    }
}
