//! Sine low-frequency oscillator for transport modulation.
//!
//! Drives wow (slow capstan eccentricity), flutter (fast roller chatter) and
//! azimuth wander. Phase is accumulated in cycles, kept in \[0, 1).

use core::f32::consts::TAU;
use libm::{floorf, sinf};

/// Sine LFO with a phase accumulator.
///
/// # Example
///
/// ```rust
/// use cassette_core::Lfo;
///
/// let mut lfo = Lfo::new(48000.0, 0.5);
/// let value = lfo.next();
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    phase: f32,
    phase_inc: f32,
    sample_rate: f32,
    freq_hz: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0, 1.0)
    }
}

impl Lfo {
    /// Creates an LFO at `freq_hz`, starting at phase 0.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut lfo = Self {
            phase: 0.0,
            phase_inc: 0.0,
            sample_rate,
            freq_hz,
        };
        lfo.recalculate();
        lfo
    }

    /// Sets the rate in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.freq_hz = freq_hz;
        self.recalculate();
    }

    /// Rate in Hz.
    pub fn frequency(&self) -> f32 {
        self.freq_hz
    }

    /// Updates the sample rate, keeping the rate in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    /// Sets the phase in cycles; wrapped into \[0, 1).
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = wrap_unit(phase);
    }

    /// Current phase in cycles.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Resets the phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Returns the current value in \[-1, 1\] and advances one sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        self.next_with_offset(0.0)
    }

    /// Like [`next`](Self::next) with an extra phase offset in cycles.
    #[inline]
    pub fn next_with_offset(&mut self, offset: f32) -> f32 {
        let value = sinf(TAU * (self.phase + offset));
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        value
    }

    fn recalculate(&mut self) {
        let inc = if self.sample_rate > 0.0 {
            self.freq_hz / self.sample_rate
        } else {
            0.0
        };
        self.phase_inc = if inc.is_finite() { inc.clamp(0.0, 0.5) } else { 0.0 };
    }
}

#[inline]
fn wrap_unit(x: f32) -> f32 {
    if !x.is_finite() {
        return 0.0;
    }
    let wrapped = x - floorf(x);
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}
