//! One-pole lowpass filter for tape high-frequency loss.
//!
//! A single-pole IIR lowpass in "g" form:
//!
//! ```text
//! s[n] = s[n-1] + g * (x[n] - s[n-1])
//! ```
//!
//! where `g = 1 - exp(-2π * cutoff / sample_rate)`. `g == 1` is an exact
//! passthrough, `g -> 0` freezes the output.
//!
//! # Usage
//!
//! ```rust
//! use cassette_core::{OnePole, one_pole::lowpass_coefficient};
//!
//! let mut lp = OnePole::new(lowpass_coefficient(4000.0, 48000.0));
//! let filtered = lp.process(1.0);
//! assert!(filtered < 1.0);
//! ```

use crate::flush_denormal;
use libm::expf;

/// Lowest cutoff accepted by [`lowpass_coefficient`].
pub const MIN_CUTOFF_HZ: f32 = 20.0;

/// Highest cutoff accepted by [`lowpass_coefficient`], as a fraction of the
/// sample rate.
pub const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Computes the one-pole coefficient for `cutoff_hz`.
///
/// The cutoff is clamped to \[20 Hz, 0.49 * sample_rate\]. Cutoffs within 2%
/// of Nyquist return exactly `1.0` (full-bandwidth passthrough). A
/// non-positive or non-finite sample rate also returns `1.0`.
pub fn lowpass_coefficient(cutoff_hz: f32, sample_rate: f32) -> f32 {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return 1.0;
    }
    let max = MAX_CUTOFF_RATIO * sample_rate;
    let cutoff = if cutoff_hz.is_finite() {
        cutoff_hz.clamp(MIN_CUTOFF_HZ.min(max), max)
    } else {
        max
    };
    // Small slack so that the clamped maximum always lands on passthrough.
    let nyquist = 0.5 * sample_rate;
    if cutoff >= 0.98 * nyquist - 0.01 {
        return 1.0;
    }
    (1.0 - expf(-core::f32::consts::TAU * cutoff / sample_rate)).clamp(0.0, 1.0)
}

/// One-pole (6 dB/oct) lowpass filter with an externally set coefficient.
///
/// # Invariants
///
/// - `g` is kept in \[0, 1\]
/// - `state` is flushed to zero when below 1e-20
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    g: f32,
}

impl Default for OnePole {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl OnePole {
    /// Creates a filter with coefficient `g`.
    pub fn new(g: f32) -> Self {
        Self {
            state: 0.0,
            g: g.clamp(0.0, 1.0),
        }
    }

    /// Sets the coefficient, keeping the state.
    #[inline]
    pub fn set_coefficient(&mut self, g: f32) {
        self.g = if g.is_finite() { g.clamp(0.0, 1.0) } else { 1.0 };
    }

    /// Current coefficient.
    pub fn coefficient(&self) -> f32 {
        self.g
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.process_with(input, self.g)
    }

    /// Processes one sample with a coefficient shared across channels.
    #[inline]
    pub fn process_with(&mut self, input: f32, g: f32) -> f32 {
        if g >= 1.0 {
            self.state = input;
        } else {
            self.state = flush_denormal(self.state + g * (input - self.state));
        }
        self.state
    }

    /// Resets the state to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_dc() {
        let mut lp = OnePole::new(lowpass_coefficient(1000.0, 48000.0));
        let mut out = 0.0;
        for _ in 0..48000 {
            out = lp.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-4, "DC should pass through, got {out}");
    }

    #[test]
    fn attenuates_high_freq() {
        let mut lp = OnePole::new(lowpass_coefficient(100.0, 48000.0));
        let mut sum = 0.0f32;
        for i in 0..4800 {
            let input = if i % 2 == 0 { 1.0 } else { -1.0 };
            sum += lp.process(input).abs();
        }
        let avg = sum / 4800.0;
        assert!(avg < 0.05, "Nyquist signal should be attenuated, avg = {avg}");
    }

    #[test]
    fn near_nyquist_is_exact_passthrough() {
        assert_eq!(lowpass_coefficient(0.49 * 48000.0, 48000.0), 1.0);
        assert_eq!(lowpass_coefficient(1.0e9, 48000.0), 1.0);

        let mut lp = OnePole::new(1.0);
        for i in 0..64 {
            let x = libm::sinf(i as f32 * 0.37);
            assert_eq!(lp.process(x), x);
        }
    }

    #[test]
    fn cutoff_is_clamped_low() {
        assert_eq!(
            lowpass_coefficient(1.0, 48000.0),
            lowpass_coefficient(MIN_CUTOFF_HZ, 48000.0)
        );
        assert!(lowpass_coefficient(f32::NAN, 48000.0).is_finite());
    }

    #[test]
    fn invalid_sample_rate_passes_through() {
        assert_eq!(lowpass_coefficient(1000.0, 0.0), 1.0);
        assert_eq!(lowpass_coefficient(1000.0, f32::NAN), 1.0);
    }

    #[test]
    fn reset_clears_state() {
        let mut lp = OnePole::new(lowpass_coefficient(1000.0, 48000.0));
        lp.process(1.0);
        lp.reset();
        let g = lp.coefficient();
        assert!((lp.process(1.0) - g).abs() < 1e-7);
    }
}
