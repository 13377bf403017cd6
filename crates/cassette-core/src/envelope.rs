//! Peak envelope follower with separate attack and release.
//!
//! Drives the compander's level detector. The envelope rises toward `|x|`
//! with the attack coefficient and falls with the release coefficient:
//!
//! ```text
//! coeff = exp(-1 / (time_s * sample_rate))
//! env   = coeff * env + (1 - coeff) * |x|
//! ```

use libm::expf;

use crate::math::{flush_denormal, sanitize};

/// One-pole time coefficient `exp(-1 / (time_s * sample_rate))`.
///
/// Returns `0.0` (no memory) for non-positive times or sample rates.
#[inline]
pub fn time_coefficient(time_ms: f32, sample_rate: f32) -> f32 {
    let samples = time_ms * 0.001 * sample_rate;
    if !samples.is_finite() || samples <= 0.0 {
        0.0
    } else {
        expf(-1.0 / samples)
    }
}

/// Envelope follower for tracking signal amplitude.
///
/// # Example
///
/// ```rust
/// use cassette_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::new(48000.0);
/// env.set_attack_ms(10.0);
/// env.set_release_ms(100.0);
/// let level = env.process(0.5);
/// assert!(level > 0.0 && level < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
}

impl EnvelopeFollower {
    /// Creates a follower with 10 ms attack and 100 ms release.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_times(sample_rate, 10.0, 100.0)
    }

    /// Creates a follower with the given attack and release times.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack_ms: attack_ms.max(0.1),
            release_ms: release_ms.max(1.0),
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Sets the attack time in milliseconds (minimum 0.1 ms).
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.attack_ms = attack_ms.max(0.1);
        self.recalculate_coefficients();
    }

    /// Attack time in milliseconds.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Sets the release time in milliseconds (minimum 1 ms).
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms.max(1.0);
        self.recalculate_coefficients();
    }

    /// Release time in milliseconds.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Updates the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Feeds one sample and returns the envelope level (always >= 0).
    ///
    /// Non-finite input is treated as silence.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let level = sanitize(input).abs();
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = flush_denormal(coeff * self.envelope + (1.0 - coeff) * level);
        self.envelope
    }

    /// Current envelope level.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Resets the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = time_coefficient(self.attack_ms, self.sample_rate);
        self.release_coeff = time_coefficient(self.release_ms, self.sample_rate);
    }
}
