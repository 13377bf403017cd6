//! Biquad (bi-quadratic) filter section and RBJ coefficient designs.
//!
//! The filter runs the transposed direct-form II update:
//!
//! ```text
//! y   = b0*x + z1
//! z1' = b1*x - a1*y + z2
//! z2' = b2*x - a2*y
//! ```
//!
//! Coefficient design follows the RBJ Audio EQ Cookbook. Designs are derived
//! in `f64` and narrowed at the end, which keeps low-frequency shelves and
//! peaks accurate at high sample rates. Every design degrades to the identity
//! filter instead of producing NaN or infinity.

use core::f64::consts::PI;
use libm::{cos, pow, sin, sqrt};

use crate::math::flush_denormal;
use crate::param::glide;

/// Normalized biquad coefficients (`a0 == 1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Feedforward coefficient for x\[n\].
    pub b0: f32,
    /// Feedforward coefficient for x\[n-1\].
    pub b1: f32,
    /// Feedforward coefficient for x\[n-2\].
    pub b2: f32,
    /// Feedback coefficient for y\[n-1\].
    pub a1: f32,
    /// Feedback coefficient for y\[n-2\].
    pub a2: f32,
}

impl Coefficients {
    /// Passthrough coefficients: `y[n] = x[n]`.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Normalizes raw cookbook coefficients by `a0`.
    ///
    /// Returns [`Coefficients::IDENTITY`] when `a0` is non-finite or smaller
    /// than `1e-12` in magnitude, or when any normalized value is non-finite.
    pub fn normalize(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        if !a0.is_finite() || a0.abs() < 1e-12 {
            return Self::IDENTITY;
        }
        let inv = 1.0 / a0;
        let c = Self {
            b0: (b0 * inv) as f32,
            b1: (b1 * inv) as f32,
            b2: (b2 * inv) as f32,
            a1: (a1 * inv) as f32,
            a2: (a2 * inv) as f32,
        };
        if c.is_finite() { c } else { Self::IDENTITY }
    }

    /// True when all five coefficients are finite.
    pub fn is_finite(&self) -> bool {
        self.b0.is_finite()
            && self.b1.is_finite()
            && self.b2.is_finite()
            && self.a1.is_finite()
            && self.a2.is_finite()
    }

    /// True when the poles lie strictly inside the unit circle
    /// (`|a2| < 1` and `|a1| < 1 + a2`).
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }

    /// Moves every coefficient a fraction `alpha` of the way toward `target`.
    ///
    /// Each coefficient steps through [`glide`], so it lands on the target
    /// bit-for-bit instead of stalling a few ulps short.
    #[inline]
    pub fn approach(&mut self, target: &Self, alpha: f32) {
        self.b0 = glide(self.b0, target.b0, alpha);
        self.b1 = glide(self.b1, target.b1, alpha);
        self.b2 = glide(self.b2, target.b2, alpha);
        self.a1 = glide(self.a1, target.a1, alpha);
        self.a2 = glide(self.a2, target.a2, alpha);
    }

    /// Magnitude response in dB at `freq` Hz.
    pub fn response_db(&self, freq: f32, sample_rate: f32) -> f32 {
        if sample_rate <= 0.0 {
            return 0.0;
        }
        let w = 2.0 * PI * f64::from(freq) / f64::from(sample_rate);
        let (c1, s1) = (cos(w), sin(w));
        let (c2, s2) = (cos(2.0 * w), sin(2.0 * w));
        let num_re = f64::from(self.b0) + f64::from(self.b1) * c1 + f64::from(self.b2) * c2;
        let num_im = -(f64::from(self.b1) * s1 + f64::from(self.b2) * s2);
        let den_re = 1.0 + f64::from(self.a1) * c1 + f64::from(self.a2) * c2;
        let den_im = -(f64::from(self.a1) * s1 + f64::from(self.a2) * s2);
        let num = num_re * num_re + num_im * num_im;
        let den = (den_re * den_re + den_im * den_im).max(1e-30);
        (10.0 * libm::log10(num / den).max(-60.0)) as f32
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Second-order IIR section with transposed direct-form II state.
///
/// State values below `1e-20` are flushed to zero after every sample.
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    coeffs: Coefficients,
    z1: f32,
    z2: f32,
}

impl Biquad {
    /// Creates a passthrough biquad.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a biquad with the given coefficients and cleared state.
    pub fn with_coefficients(coeffs: Coefficients) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Sets pre-normalized coefficients (`a0 == 1`), keeping the state.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a1: f32, a2: f32) {
        self.coeffs = Coefficients { b0, b1, b2, a1, a2 };
    }

    /// Replaces the coefficient set, keeping the state.
    #[inline]
    pub fn set(&mut self, coeffs: Coefficients) {
        self.coeffs = coeffs;
    }

    /// Current coefficients.
    pub fn coefficients(&self) -> Coefficients {
        self.coeffs
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + self.z1;
        self.z1 = flush_denormal(c.b1 * input - c.a1 * output + self.z2);
        self.z2 = flush_denormal(c.b2 * input - c.a2 * output);
        output
    }

    /// Processes one sample with externally supplied coefficients.
    ///
    /// Used by smoothers that interpolate coefficients shared across
    /// channels while each channel keeps its own state.
    #[inline]
    pub fn process_with(&mut self, input: f32, c: &Coefficients) -> f32 {
        let output = c.b0 * input + self.z1;
        self.z1 = flush_denormal(c.b1 * input - c.a1 * output + self.z2);
        self.z2 = flush_denormal(c.b2 * input - c.a2 * output);
        output
    }

    /// Clears the filter state.
    pub fn clear(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

/// Shared design preamble: returns `(w0, A)` or `None` when the sample rate
/// is unusable.
fn prewarp(sample_rate: f32, freq_hz: f32, gain_db: f32) -> Option<(f64, f64)> {
    let sr = f64::from(sample_rate);
    if !sr.is_finite() || sr <= 0.0 {
        return None;
    }
    let freq = f64::from(freq_hz);
    let freq = if freq.is_finite() { freq.clamp(0.0, 0.45 * sr) } else { 0.0 };
    let gain = f64::from(gain_db);
    let gain = if gain.is_finite() { gain } else { 0.0 };
    let w0 = 2.0 * PI * freq / sr;
    let a = pow(10.0, gain / 40.0);
    Some((w0, a))
}

/// Low-shelf design with shelf slope `slope` (1.0 = steepest monotonic).
///
/// # Arguments
///
/// * `sample_rate` - Sample rate in Hz; `<= 0` yields the identity filter
/// * `freq_hz` - Shelf midpoint, clamped to \[0, 0.45 * sample_rate\]
/// * `gain_db` - Shelf gain in dB
/// * `slope` - Shelf slope, clamped to \[0.05, 1.0\]
pub fn low_shelf(sample_rate: f32, freq_hz: f32, gain_db: f32, slope: f32) -> Coefficients {
    let Some((w0, a)) = prewarp(sample_rate, freq_hz, gain_db) else {
        return Coefficients::IDENTITY;
    };
    let (cw, sw) = (cos(w0), sin(w0));
    let alpha = shelf_alpha(sw, a, slope);
    let two_sqrt_a_alpha = 2.0 * sqrt(a) * alpha;

    Coefficients::normalize(
        a * ((a + 1.0) - (a - 1.0) * cw + two_sqrt_a_alpha),
        2.0 * a * ((a - 1.0) - (a + 1.0) * cw),
        a * ((a + 1.0) - (a - 1.0) * cw - two_sqrt_a_alpha),
        (a + 1.0) + (a - 1.0) * cw + two_sqrt_a_alpha,
        -2.0 * ((a - 1.0) + (a + 1.0) * cw),
        (a + 1.0) + (a - 1.0) * cw - two_sqrt_a_alpha,
    )
}

/// High-shelf design with shelf slope `slope`.
///
/// Arguments and clamping follow [`low_shelf`].
pub fn high_shelf(sample_rate: f32, freq_hz: f32, gain_db: f32, slope: f32) -> Coefficients {
    let Some((w0, a)) = prewarp(sample_rate, freq_hz, gain_db) else {
        return Coefficients::IDENTITY;
    };
    let (cw, sw) = (cos(w0), sin(w0));
    let alpha = shelf_alpha(sw, a, slope);
    let two_sqrt_a_alpha = 2.0 * sqrt(a) * alpha;

    Coefficients::normalize(
        a * ((a + 1.0) + (a - 1.0) * cw + two_sqrt_a_alpha),
        -2.0 * a * ((a - 1.0) + (a + 1.0) * cw),
        a * ((a + 1.0) + (a - 1.0) * cw - two_sqrt_a_alpha),
        (a + 1.0) - (a - 1.0) * cw + two_sqrt_a_alpha,
        2.0 * ((a - 1.0) - (a + 1.0) * cw),
        (a + 1.0) - (a - 1.0) * cw - two_sqrt_a_alpha,
    )
}

/// Peaking (bell) design.
///
/// `q` of zero or below produces a degenerate denominator and therefore the
/// identity filter.
pub fn peaking(sample_rate: f32, freq_hz: f32, gain_db: f32, q: f32) -> Coefficients {
    let Some((w0, a)) = prewarp(sample_rate, freq_hz, gain_db) else {
        return Coefficients::IDENTITY;
    };
    let q = f64::from(q);
    if q.is_nan() || q <= 0.0 {
        return Coefficients::IDENTITY;
    }
    let (cw, sw) = (cos(w0), sin(w0));
    let alpha = sw / (2.0 * q);

    Coefficients::normalize(
        1.0 + alpha * a,
        -2.0 * cw,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cw,
        1.0 - alpha / a,
    )
}

fn shelf_alpha(sin_w0: f64, a: f64, slope: f32) -> f64 {
    let s = f64::from(slope);
    let s = if s.is_finite() { s.clamp(0.05, 1.0) } else { 1.0 };
    let inner = ((a + 1.0 / a) * (1.0 / s - 1.0) + 2.0).max(0.0);
    sin_w0 / 2.0 * sqrt(inner)
}
