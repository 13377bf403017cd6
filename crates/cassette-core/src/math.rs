//! Mathematical utility functions for tape DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//! - [`rms_to_dbfs`] - Meter conversion with a fixed silence floor
//!
//! # Numerical Hygiene
//!
//! - [`flush_denormal`] - Snap tiny filter state to zero
//! - [`sanitize`] / [`sanitize_buffer`] - Replace NaN and infinities with silence

use libm::{expf, log10f, logf};

/// Level reported for silence or when no samples have been measured.
pub const SILENCE_DB: f32 = -120.0;

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use cassette_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Inputs at or below zero are clamped to `1e-10` (-200 dB).
///
/// # Example
/// ```rust
/// use cassette_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Convert an RMS (or peak) amplitude to dBFS for metering.
///
/// Values below `1e-9` and non-finite values read as [`SILENCE_DB`], and the
/// result never drops below that floor.
#[inline]
pub fn rms_to_dbfs(rms: f32) -> f32 {
    if !rms.is_finite() || rms <= 1e-9 {
        return SILENCE_DB;
    }
    (20.0 * log10f(rms)).max(SILENCE_DB)
}

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Convert milliseconds to samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Convert samples to milliseconds.
#[inline]
pub fn samples_to_ms(samples: f32, sample_rate: f32) -> f32 {
    samples * 1000.0 / sample_rate
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Subnormal floats cause severe CPU slowdowns on most architectures. Values
/// below 1e-20 are replaced with zero, well before the IEEE 754 subnormal
/// range begins. Use this on recursive filter state.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Replace a non-finite sample with silence.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn sanitize(x: f32) -> f32 {
    if x.is_finite() { x } else { 0.0 }
}

/// Replace every non-finite sample in `buffer` with silence.
///
/// Modules call this on their bypass path so that NaN or infinity never
/// leaves a module, even when it is otherwise an identity.
#[inline]
pub fn sanitize_buffer(buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = sanitize(*sample);
    }
}

/// Return `value` when finite, `fallback` otherwise.
#[inline]
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_linear_roundtrip() {
        let original = 0.5;
        let db = linear_to_db(original);
        let back = db_to_linear(db);
        assert!(
            (original - back).abs() < 1e-5,
            "Roundtrip failed: {} -> {} -> {}",
            original,
            db,
            back
        );
    }

    #[test]
    fn test_db_known_values() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(-6.0206) - 0.5).abs() < 0.001);
        assert!((db_to_linear(-60.0) - 0.001).abs() < 1e-6);
    }

    #[test]
    fn test_rms_to_dbfs_floor() {
        assert_eq!(rms_to_dbfs(0.0), SILENCE_DB);
        assert_eq!(rms_to_dbfs(1e-12), SILENCE_DB);
        assert_eq!(rms_to_dbfs(f32::NAN), SILENCE_DB);
        assert!((rms_to_dbfs(1.0)).abs() < 1e-6);
        assert!((rms_to_dbfs(0.1) + 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(1e-10), 1e-10);
    }

    #[test]
    fn test_sanitize_buffer() {
        let mut buffer = [1.0, f32::NAN, f32::INFINITY, -0.5, f32::NEG_INFINITY];
        sanitize_buffer(&mut buffer);
        assert_eq!(buffer, [1.0, 0.0, 0.0, -0.5, 0.0]);
    }

    #[test]
    fn test_finite_or() {
        assert_eq!(finite_or(2.0, 1.0), 2.0);
        assert_eq!(finite_or(f32::NAN, 1.0), 1.0);
    }

    #[test]
    fn test_ms_samples_conversion() {
        let samples = ms_to_samples(10.0, 48000.0);
        assert!((samples - 480.0).abs() < 1e-3);
        assert!((samples_to_ms(samples, 48000.0) - 10.0).abs() < 1e-4);
    }
}
