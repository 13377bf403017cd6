//! Per-channel RMS and peak accumulation.
//!
//! The meter taps the end of the chain. It never alters audio; readings
//! cover everything accumulated since the previous read, then start over.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use cassette_core::{SILENCE_DB, TapeModule, frame_count, rms_to_dbfs};

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum_squares: f64,
    count: u64,
}

/// Block meter for an interleaved stream.
///
/// # Example
///
/// ```rust
/// use cassette_effects::Meters;
///
/// let mut meters = Meters::new();
/// meters.resize(2);
/// meters.accumulate(&[0.5, 0.25, 0.5, 0.25], 2);
///
/// let mut peaks = [0.0f32; 2];
/// assert_eq!(meters.read_peaks_db(&mut peaks), 2);
/// assert!((peaks[0] + 6.02).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Meters {
    rms: Vec<Accumulator>,
    peaks: Vec<f32>,
}

impl Meters {
    /// Creates a meter with no channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of metered channels.
    pub fn channels(&self) -> usize {
        self.rms.len()
    }

    /// Sets the channel count and clears all readings.
    pub fn resize(&mut self, channels: usize) {
        self.rms.clear();
        self.rms.resize(channels, Accumulator::default());
        self.peaks.clear();
        self.peaks.resize(channels, 0.0);
    }

    /// Adds a block to the running totals. Channels beyond
    /// [`channels`](Self::channels) are ignored.
    pub fn accumulate(&mut self, buffer: &[f32], channels: usize) {
        let frames = frame_count(buffer.len(), channels);
        if frames == 0 {
            return;
        }
        for frame in buffer[..frames * channels].chunks_exact(channels) {
            for ((sample, acc), peak) in frame.iter().zip(&mut self.rms).zip(&mut self.peaks) {
                if !sample.is_finite() {
                    continue;
                }
                let s = f64::from(*sample);
                acc.sum_squares += s * s;
                acc.count += 1;
                *peak = peak.max(sample.abs());
            }
        }
    }

    /// Writes each channel's RMS in dBFS since the last RMS read and starts a
    /// new window. Returns the number of values written.
    ///
    /// Channels with nothing accumulated read [`SILENCE_DB`].
    pub fn read_rms_db(&mut self, out: &mut [f32]) -> usize {
        let n = out.len().min(self.rms.len());
        for (slot, acc) in out.iter_mut().zip(&self.rms) {
            *slot = if acc.count == 0 {
                SILENCE_DB
            } else {
                rms_to_dbfs(libm::sqrt(acc.sum_squares / acc.count as f64) as f32)
            };
        }
        self.rms.fill(Accumulator::default());
        n
    }

    /// Writes each channel's peak in dBFS since the last peak read and starts
    /// a new window. Returns the number of values written.
    pub fn read_peaks_db(&mut self, out: &mut [f32]) -> usize {
        let n = out.len().min(self.peaks.len());
        for (slot, peak) in out.iter_mut().zip(&self.peaks) {
            *slot = rms_to_dbfs(*peak);
        }
        self.peaks.fill(0.0);
        n
    }

    /// Drops all readings.
    pub fn clear(&mut self) {
        self.rms.fill(Accumulator::default());
        self.peaks.fill(0.0);
    }
}

impl TapeModule for Meters {
    fn prepare(&mut self, _sample_rate: f32, channels: usize) {
        self.resize(channels);
    }

    fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        self.accumulate(buffer, channels);
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn is_neutral(&self) -> bool {
        true
    }
}
