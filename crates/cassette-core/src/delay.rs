//! Fractional delay line for modulated tape transport effects.
//!
//! [`FractionalDelay`] is a circular buffer read with linear interpolation.
//! Each call reads first and writes second. The sample being processed is
//! tap 0, the newest stored sample is tap 1, and so on, so a delay of exactly
//! zero returns the input unchanged and the slot about to be overwritten is
//! never read.
//!
//! # Example
//!
//! ```rust
//! use cassette_core::FractionalDelay;
//!
//! let mut delay = FractionalDelay::new(64);
//! assert_eq!(delay.process(0.5, 0.0), 0.5);
//! assert_eq!(delay.process(1.0, 1.0), 0.5);
//! assert_eq!(delay.process(0.0, 0.5), 0.5);
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Interpolated circular delay line.
///
/// The buffer is allocated by [`new`](Self::new) or
/// [`resize`](Self::resize) and never reallocates during processing.
#[derive(Debug, Clone)]
pub struct FractionalDelay {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl FractionalDelay {
    /// Creates a delay line with `capacity` stored samples (minimum 2).
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(2)],
            write_pos: 0,
        }
    }

    /// Reallocates to `capacity` samples and clears the history.
    pub fn resize(&mut self, capacity: usize) {
        #[cfg(feature = "tracing")]
        tracing::debug!("delay_resize: {} samples", capacity.max(2));
        self.buffer.clear();
        self.buffer.resize(capacity.max(2), 0.0);
        self.write_pos = 0;
    }

    /// Largest usable delay in samples.
    pub fn max_delay(&self) -> f32 {
        (self.buffer.len() - 2) as f32
    }

    /// Stored samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Reads the input delayed by `delay_samples`, then stores the input.
    ///
    /// The delay is clamped to \[0, [`max_delay`](Self::max_delay)\]; a
    /// non-finite delay reads as zero.
    #[inline]
    pub fn process(&mut self, input: f32, delay_samples: f32) -> f32 {
        let max = self.max_delay();
        let delay = if delay_samples.is_finite() {
            delay_samples.clamp(0.0, max)
        } else {
            0.0
        };

        let tap = delay as usize;
        let frac = delay - tap as f32;
        let a = self.tap(tap, input);
        let output = if frac == 0.0 {
            a
        } else {
            let b = self.tap(tap + 1, input);
            a + (b - a) * frac
        };

        self.buffer[self.write_pos] = input;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
        output
    }

    /// Stores the input without reading.
    #[inline]
    pub fn write(&mut self, input: f32) {
        self.buffer[self.write_pos] = input;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Zeroes the history.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    #[inline]
    fn tap(&self, index: usize, input: f32) -> f32 {
        if index == 0 {
            input
        } else {
            let len = self.buffer.len();
            self.buffer[(self.write_pos + len - index) % len]
        }
    }
}

impl Default for FractionalDelay {
    fn default() -> Self {
        Self::new(2)
    }
}
