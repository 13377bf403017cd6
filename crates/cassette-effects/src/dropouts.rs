//! Stochastic dropouts: brief dips in level from oxide defects.
//!
//! # State Machine
//!
//! ```text
//!        p = (rate/60)/fs per sample
//! Idle ─────────────────────────→ Attack ──→ Hold ──→ Release ──→ Idle
//!  1.0                          1.0 → floor  floor   floor → 1.0
//! ```
//!
//! Triggers are only drawn while idle. Attack and release are linear ramps
//! of [`ATTACK_MS`] and [`RELEASE_MS`]; hold lasts a random
//! [`HOLD_MIN_MS`]–[`HOLD_MAX_MS`]. The gain multiplies every channel of a
//! frame and never leaves \[[`FLOOR_GAIN`], 1\].

use cassette_core::{
    ParamDescriptor, ParamUnit, Rng, TapeModule, checked_sample_rate, frame_count, ms_to_samples,
    sanitize, sanitize_buffer,
};

/// Gain at the bottom of a dropout.
pub const FLOOR_GAIN: f32 = 0.25;
/// Fade-out time.
pub const ATTACK_MS: f32 = 4.0;
/// Shortest hold.
pub const HOLD_MIN_MS: f32 = 10.0;
/// Longest hold.
pub const HOLD_MAX_MS: f32 = 30.0;
/// Fade-in time.
pub const RELEASE_MS: f32 = 10.0;

const SEED_SALT: u64 = 0xD409_0175;

/// Average dropouts per minute.
pub const RATE: ParamDescriptor = ParamDescriptor::new(
    "dropout_rate_per_min",
    "Dropouts",
    ParamUnit::PerMinute,
    0.0,
    600.0,
    0.0,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Attack { elapsed: usize },
    Hold { remaining: usize },
    Release { elapsed: usize },
    /// Rectangular dip used when an event length override is set.
    Fixed { remaining: usize },
}

/// Dropout event generator.
///
/// # Example
///
/// ```rust
/// use cassette_core::TapeModule;
/// use cassette_effects::Dropouts;
///
/// let mut dropouts = Dropouts::new();
/// dropouts.set_seed(7);
/// dropouts.set_rate_per_min(120.0);
/// dropouts.prepare(48000.0, 2);
///
/// let mut block = vec![1.0f32; 96000];
/// dropouts.process_interleaved(&mut block, 2);
/// assert!(block.iter().all(|&s| (0.25..=1.0).contains(&s)));
/// ```
#[derive(Debug, Clone)]
pub struct Dropouts {
    sample_rate: f32,
    rate_per_min: f32,
    probability: f64,
    /// `probability` scaled to the full `u64` range.
    threshold: u64,
    attack_samples: usize,
    release_samples: usize,
    hold_min: f32,
    hold_max: f32,
    event_length: Option<usize>,
    phase: Phase,
    count: u64,
    rng: Rng,
}

impl Default for Dropouts {
    fn default() -> Self {
        Self::new()
    }
}

impl Dropouts {
    /// Creates a generator with a zero rate.
    pub fn new() -> Self {
        let mut dropouts = Self {
            sample_rate: checked_sample_rate(0.0),
            rate_per_min: RATE.default,
            probability: 0.0,
            threshold: 0,
            attack_samples: 1,
            release_samples: 1,
            hold_min: 1.0,
            hold_max: 1.0,
            event_length: None,
            phase: Phase::Idle,
            count: 0,
            rng: Rng::new(cassette_core::DEFAULT_SEED ^ SEED_SALT),
        };
        dropouts.update_timing();
        dropouts
    }

    /// Sets the average number of events per minute.
    pub fn set_rate_per_min(&mut self, rate: f32) {
        self.rate_per_min = RATE.clamp(rate);
        self.update_probability();
    }

    /// Events per minute.
    pub fn rate_per_min(&self) -> f32 {
        self.rate_per_min
    }

    /// Per-sample trigger probability while idle.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Reseeds the trigger generator.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng.reseed(seed ^ SEED_SALT);
    }

    /// Replaces attack/hold/release with a rectangular dip of `samples`
    /// (at least one, counting the trigger sample). `None` restores the
    /// normal envelope.
    pub fn set_event_length(&mut self, samples: Option<usize>) {
        self.event_length = samples.map(|n| n.max(1));
    }

    /// Events triggered since construction or the last [`reset`](TapeModule::reset).
    pub fn dropout_count(&self) -> u64 {
        self.count
    }

    /// True while an event is in progress.
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    fn update_probability(&mut self) {
        // Probabilities reach ~4e-9 (0.1/min at 384 kHz), below f32 draw resolution.
        let p = (f64::from(self.rate_per_min) / 60.0) / f64::from(self.sample_rate);
        self.probability = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
        self.threshold = if self.probability >= 1.0 {
            u64::MAX
        } else {
            (self.probability * 18_446_744_073_709_551_616.0) as u64
        };
    }

    fn update_timing(&mut self) {
        let samples = |ms: f32| libm::roundf(ms_to_samples(ms, self.sample_rate)).max(1.0);
        self.attack_samples = samples(ATTACK_MS) as usize;
        self.release_samples = samples(RELEASE_MS) as usize;
        self.hold_min = samples(HOLD_MIN_MS);
        self.hold_max = samples(HOLD_MAX_MS);
    }

    fn draw_hold(&mut self) -> usize {
        (libm::roundf(self.rng.range(self.hold_min, self.hold_max)) as usize).max(1)
    }

    /// Advances one sample and returns the gain for it.
    #[inline]
    fn next_gain(&mut self) -> f32 {
        let gain = match self.phase {
            Phase::Idle => {
                if self.threshold > 0 && self.rng.next_u64() < self.threshold {
                    self.count += 1;
                    if let Some(n) = self.event_length {
                        self.phase = if n > 1 {
                            Phase::Fixed { remaining: n - 1 }
                        } else {
                            Phase::Idle
                        };
                        return FLOOR_GAIN;
                    }
                    self.phase = Phase::Attack { elapsed: 0 };
                }
                1.0
            }
            Phase::Attack { elapsed } => {
                let elapsed = elapsed + 1;
                if elapsed >= self.attack_samples {
                    self.phase = Phase::Hold {
                        remaining: self.draw_hold(),
                    };
                    FLOOR_GAIN
                } else {
                    self.phase = Phase::Attack { elapsed };
                    let t = elapsed as f32 / self.attack_samples as f32;
                    1.0 - (1.0 - FLOOR_GAIN) * t
                }
            }
            Phase::Hold { remaining } => {
                self.phase = if remaining <= 1 {
                    Phase::Release { elapsed: 0 }
                } else {
                    Phase::Hold {
                        remaining: remaining - 1,
                    }
                };
                FLOOR_GAIN
            }
            Phase::Release { elapsed } => {
                let elapsed = elapsed + 1;
                if elapsed >= self.release_samples {
                    self.phase = Phase::Idle;
                    1.0
                } else {
                    self.phase = Phase::Release { elapsed };
                    let t = elapsed as f32 / self.release_samples as f32;
                    FLOOR_GAIN + (1.0 - FLOOR_GAIN) * t
                }
            }
            Phase::Fixed { remaining } => {
                self.phase = if remaining <= 1 {
                    Phase::Idle
                } else {
                    Phase::Fixed {
                        remaining: remaining - 1,
                    }
                };
                FLOOR_GAIN
            }
        };
        gain.clamp(FLOOR_GAIN, 1.0)
    }
}

impl TapeModule for Dropouts {
    fn prepare(&mut self, sample_rate: f32, _channels: usize) {
        self.sample_rate = checked_sample_rate(sample_rate);
        self.update_timing();
        self.update_probability();
        self.phase = Phase::Idle;
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
            let gain = self.next_gain();
            for sample in frame {
                *sample = sanitize(*sample) * gain;
            }
        }
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.count = 0;
    }

    fn is_neutral(&self) -> bool {
        self.threshold == 0 && self.phase == Phase::Idle
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;

    #[test]
    fn zero_rate_is_identity() {
        let mut d = Dropouts::new();
        d.prepare(48000.0, 2);
        assert!(d.is_neutral());
        let input: alloc::vec::Vec<f32> = (0..1024).map(|i| libm::sinf(i as f32 * 0.1)).collect();
        let mut buffer = input.clone();
        d.process_interleaved(&mut buffer, 2);
        assert_eq!(buffer, input);
        assert_eq!(d.dropout_count(), 0);
    }

    #[test]
    fn probability_from_rate() {
        let mut d = Dropouts::new();
        d.prepare(1000.0, 1);
        d.set_rate_per_min(60.0);
        assert!((d.probability() - 0.001).abs() < 1e-12);
        d.set_rate_per_min(1e9);
        assert_eq!(d.rate_per_min(), 600.0);
        d.set_rate_per_min(f32::NAN);
        assert_eq!(d.probability(), 0.0);
    }

    #[test]
    fn envelope_shape() {
        let mut d = Dropouts::new();
        d.prepare(1000.0, 1);
        // Force a trigger on the first sample, then no more.
        d.threshold = u64::MAX;
        let mut gains = vec![0.0f32; 80];
        gains[0] = d.next_gain();
        d.threshold = 0;
        for g in &mut gains[1..] {
            *g = d.next_gain();
        }
        // Trigger sample stays at unity, attack reaches the floor at 4 ms.
        assert_eq!(gains[0], 1.0);
        assert!((gains[1] - (1.0 - 0.75 * 0.25)).abs() < 1e-6);
        assert_eq!(gains[4], FLOOR_GAIN);
        let floor_run = gains.iter().filter(|&&g| g == FLOOR_GAIN).count();
        assert!((10..=32).contains(&floor_run), "floor for {floor_run} samples");
        assert_eq!(d.dropout_count(), 1);
        assert_eq!(gains[79], 1.0);
    }

    #[test]
    fn fixed_length_is_rectangular() {
        let mut d = Dropouts::new();
        d.prepare(48000.0, 1);
        d.set_event_length(Some(5));
        d.threshold = u64::MAX;
        let first: alloc::vec::Vec<f32> = (0..5).map(|_| d.next_gain()).collect();
        assert!(first.iter().all(|&g| g == FLOOR_GAIN));
        assert!(!d.is_active());
        assert_eq!(d.dropout_count(), 1);
    }

    #[test]
    fn gain_never_leaves_range() {
        let mut d = Dropouts::new();
        d.set_seed(4);
        d.set_rate_per_min(600.0);
        d.prepare(8000.0, 2);
        let mut buffer = vec![1.0f32; 2 * 80_000];
        d.process_interleaved(&mut buffer, 2);
        assert!(buffer.iter().all(|&s| (FLOOR_GAIN..=1.0).contains(&s)));
        assert!(d.dropout_count() > 0);
        assert!(buffer.chunks(2).all(|f| f[0] == f[1]));
    }

    #[test]
    fn reset_clears_count() {
        let mut d = Dropouts::new();
        d.set_rate_per_min(600.0);
        d.prepare(1000.0, 1);
        let mut buffer = vec![1.0f32; 10_000];
        d.process_interleaved(&mut buffer, 1);
        assert!(d.dropout_count() > 0);
        d.reset();
        assert_eq!(d.dropout_count(), 0);
        assert!(!d.is_active());
    }
}
