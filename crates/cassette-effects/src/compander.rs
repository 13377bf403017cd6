//! Multi-channel soft-knee compressor with per-track bypass.
//!
//! Each channel has its own peak envelope and gain smoother. The static
//! curve is the quadratic soft knee:
//!
//! ```text
//! overshoot = level - threshold
//! overshoot <= -W/2        → 0 dB
//! |overshoot| <  W/2       → (1/R - 1)·(overshoot + W/2)² / (2W)
//! overshoot >=  W/2        → (1/R - 1)·overshoot
//! ```
//!
//! The stage is off by default. Turning it on or off crossfades over one
//! block; bypassed tracks are passed through untouched either way.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use cassette_core::{
    BlockRamp, EnvelopeFollower, ParamDescriptor, ParamUnit, SmoothedParam, TapeModule,
    checked_sample_rate, db_to_linear, frame_count, linear_to_db, sanitize, sanitize_buffer,
};

/// Number of tracks addressable by the bypass mask.
pub const MAX_BYPASS_TRACKS: usize = 64;

const GAIN_SMOOTHING_MS: f32 = 5.0;

/// Compression threshold.
pub const THRESHOLD: ParamDescriptor = ParamDescriptor::new(
    "comp_threshold_db",
    "Threshold",
    ParamUnit::Decibels,
    -60.0,
    0.0,
    -18.0,
);
/// Compression ratio.
pub const RATIO: ParamDescriptor =
    ParamDescriptor::new("comp_ratio", "Ratio", ParamUnit::Ratio, 1.0, 20.0, 2.0);
/// Envelope attack.
pub const ATTACK: ParamDescriptor = ParamDescriptor::new(
    "comp_attack_ms",
    "Attack",
    ParamUnit::Milliseconds,
    0.1,
    100.0,
    10.0,
);
/// Envelope release.
pub const RELEASE: ParamDescriptor = ParamDescriptor::new(
    "comp_release_ms",
    "Release",
    ParamUnit::Milliseconds,
    1.0,
    1000.0,
    100.0,
);
/// Knee width.
pub const KNEE: ParamDescriptor =
    ParamDescriptor::new("comp_knee_db", "Knee", ParamUnit::Decibels, 0.0, 24.0, 6.0);
/// Makeup gain.
pub const MAKEUP: ParamDescriptor =
    ParamDescriptor::new("comp_makeup_db", "Makeup", ParamUnit::Decibels, 0.0, 24.0, 0.0);

/// Static gain curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainComputer {
    /// Threshold in dB.
    pub threshold_db: f32,
    /// Ratio, at least 1.
    pub ratio: f32,
    /// Knee width in dB.
    pub knee_db: f32,
}

impl Default for GainComputer {
    fn default() -> Self {
        Self {
            threshold_db: THRESHOLD.default,
            ratio: RATIO.default,
            knee_db: KNEE.default,
        }
    }
}

impl GainComputer {
    /// Gain change in dB (never positive) for an input level in dB.
    #[inline]
    pub fn gain_db(&self, level_db: f32) -> f32 {
        let slope = 1.0 / self.ratio - 1.0;
        let overshoot = level_db - self.threshold_db;
        let half_knee = 0.5 * self.knee_db;

        if overshoot <= -half_knee {
            0.0
        } else if overshoot >= half_knee {
            slope * overshoot
        } else {
            let x = overshoot + half_knee;
            slope * x * x / (2.0 * self.knee_db)
        }
    }
}

/// Soft-knee compander.
///
/// ## Parameters
///
/// | Name | Range | Default |
/// |------|-------|---------|
/// | Threshold | -60.0–0.0 dB | -18.0 |
/// | Ratio | 1.0–20.0 | 2.0 |
/// | Attack | 0.1–100.0 ms | 10.0 |
/// | Release | 1.0–1000.0 ms | 100.0 |
/// | Knee | 0.0–24.0 dB | 6.0 |
/// | Makeup | 0.0–24.0 dB | 0.0 |
///
/// # Example
///
/// ```rust
/// use cassette_core::TapeModule;
/// use cassette_effects::Compander;
///
/// let mut comp = Compander::new();
/// comp.set_enabled(true);
/// comp.set_threshold_db(-24.0);
/// comp.set_ratio(4.0);
/// comp.set_track_bypass(1, true);
/// comp.prepare(48000.0, 2);
///
/// let mut block = vec![0.8f32; 1024];
/// comp.process_interleaved(&mut block, 2);
/// assert_eq!(block[1], 0.8);
/// ```
#[derive(Debug, Clone)]
pub struct Compander {
    sample_rate: f32,
    computer: GainComputer,
    attack_ms: f32,
    release_ms: f32,
    makeup_db: f32,
    enabled: bool,
    bypass_mask: u64,
    wet: BlockRamp,
    followers: Vec<EnvelopeFollower>,
    gains: Vec<SmoothedParam>,
}

impl Default for Compander {
    fn default() -> Self {
        Self::new()
    }
}

impl Compander {
    /// Creates a disabled compander with default settings.
    pub fn new() -> Self {
        Self {
            sample_rate: checked_sample_rate(0.0),
            computer: GainComputer::default(),
            attack_ms: ATTACK.default,
            release_ms: RELEASE.default,
            makeup_db: MAKEUP.default,
            enabled: false,
            bypass_mask: 0,
            wet: BlockRamp::new(0.0),
            followers: Vec::new(),
            gains: Vec::new(),
        }
    }

    /// Enables or disables compression for all non-bypassed tracks.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.wet.set_target(if enabled { 1.0 } else { 0.0 });
    }

    /// True when enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the threshold in dB.
    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.computer.threshold_db = THRESHOLD.clamp(threshold_db);
    }

    /// Sets the ratio.
    pub fn set_ratio(&mut self, ratio: f32) {
        self.computer.ratio = RATIO.clamp(ratio);
    }

    /// Sets the knee width in dB.
    pub fn set_knee_db(&mut self, knee_db: f32) {
        self.computer.knee_db = KNEE.clamp(knee_db);
    }

    /// Sets the envelope attack in ms.
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        let attack_ms = ATTACK.clamp(attack_ms);
        if attack_ms != self.attack_ms {
            self.attack_ms = attack_ms;
            for follower in &mut self.followers {
                follower.set_attack_ms(attack_ms);
            }
        }
    }

    /// Sets the envelope release in ms.
    pub fn set_release_ms(&mut self, release_ms: f32) {
        let release_ms = RELEASE.clamp(release_ms);
        if release_ms != self.release_ms {
            self.release_ms = release_ms;
            for follower in &mut self.followers {
                follower.set_release_ms(release_ms);
            }
        }
    }

    /// Sets the makeup gain in dB.
    pub fn set_makeup_db(&mut self, makeup_db: f32) {
        self.makeup_db = MAKEUP.clamp(makeup_db);
    }

    /// The static curve in use.
    pub fn gain_computer(&self) -> GainComputer {
        self.computer
    }

    /// Bypasses (or restores) one track. Indices past
    /// [`MAX_BYPASS_TRACKS`] are ignored.
    pub fn set_track_bypass(&mut self, track: usize, bypass: bool) {
        if track >= MAX_BYPASS_TRACKS {
            return;
        }
        if bypass {
            self.bypass_mask |= 1u64 << track;
        } else {
            self.bypass_mask &= !(1u64 << track);
        }
    }

    /// True when `track` passes through untouched.
    pub fn is_track_bypassed(&self, track: usize) -> bool {
        track < MAX_BYPASS_TRACKS && self.bypass_mask & (1u64 << track) != 0
    }

    /// Current gain (including makeup) applied to `channel`, in dB.
    pub fn current_gain_db(&self, channel: usize) -> Option<f32> {
        self.gains.get(channel).map(|g| linear_to_db(g.get()))
    }
}

impl TapeModule for Compander {
    fn prepare(&mut self, sample_rate: f32, channels: usize) {
        self.sample_rate = checked_sample_rate(sample_rate);
        #[cfg(feature = "tracing")]
        tracing::debug!("compander: prepare {channels} ch");
        let follower =
            EnvelopeFollower::with_times(self.sample_rate, self.attack_ms, self.release_ms);
        self.followers.clear();
        self.followers.resize(channels, follower);
        let gain = SmoothedParam::with_config(1.0, self.sample_rate, GAIN_SMOOTHING_MS);
        self.gains.clear();
        self.gains.resize(channels, gain);
        self.wet.set_immediate(self.wet.target());
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

        let makeup_db = self.makeup_db;
        let computer = self.computer;
        self.wet.begin_block(frames);
        for frame in active.chunks_exact_mut(channels) {
            let wet = self.wet.advance();
            let states = self.followers.iter_mut().zip(self.gains.iter_mut());
            for (ch, (sample, (follower, gain))) in frame.iter_mut().zip(states).enumerate() {
                let x = sanitize(*sample);
                if ch < MAX_BYPASS_TRACKS && self.bypass_mask & (1u64 << ch) != 0 {
                    *sample = x;
                    continue;
                }
                let level_db = linear_to_db(follower.process(x));
                let target_db = computer.gain_db(level_db) + makeup_db;
                gain.set_target(db_to_linear(target_db));
                let g = gain.advance();
                *sample = x + wet * (x * g - x);
            }
            for sample in frame.iter_mut().skip(self.followers.len()) {
                *sample = sanitize(*sample);
            }
        }
    }

    fn reset(&mut self) {
        for follower in &mut self.followers {
            follower.reset();
        }
        for gain in &mut self.gains {
            gain.set_immediate(1.0);
        }
        self.wet.set_immediate(self.wet.target());
    }

    fn is_neutral(&self) -> bool {
        self.wet.is_settled() && self.wet.get() == 0.0
    }
}
