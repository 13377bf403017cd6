//! Inter-channel bleed between adjacent track pairs.
//!
//! `left' = left + bleed·right`, `right' = right + bleed·left`, applied to
//! channel pairs (0, 1), (2, 3), and so on, using the pre-mix values of both
//! channels. A trailing unpaired channel is left alone.

use cassette_core::{
    BlockRamp, ParamDescriptor, ParamUnit, TapeModule, db_to_linear, frame_count, sanitize,
    sanitize_buffer,
};

/// Bleed at or below this is off.
pub const OFF_DB: f32 = -120.0;

/// Bleed amount.
pub const AMOUNT: ParamDescriptor =
    ParamDescriptor::new("crosstalk_db", "Crosstalk", ParamUnit::Decibels, OFF_DB, 0.0, OFF_DB);

/// Stereo crosstalk mixer.
#[derive(Debug, Clone)]
pub struct Crosstalk {
    amount_db: f32,
    bleed: BlockRamp,
}

impl Default for Crosstalk {
    fn default() -> Self {
        Self::new()
    }
}

impl Crosstalk {
    /// Creates a mixer with no bleed.
    pub fn new() -> Self {
        Self {
            amount_db: AMOUNT.default,
            bleed: BlockRamp::new(0.0),
        }
    }

    /// Sets the bleed in dB. Negative infinity and anything at or below
    /// [`OFF_DB`] disable the mix.
    pub fn set_amount_db(&mut self, amount_db: f32) {
        self.amount_db = AMOUNT.clamp(amount_db);
        let bleed = if self.amount_db <= OFF_DB {
            0.0
        } else {
            db_to_linear(self.amount_db)
        };
        self.bleed.set_target(bleed);
    }

    /// Bleed in dB.
    pub fn amount_db(&self) -> f32 {
        self.amount_db
    }

    /// Linear bleed the next block ramps toward.
    pub fn bleed(&self) -> f32 {
        self.bleed.target()
    }
}

impl TapeModule for Crosstalk {
    fn prepare(&mut self, _sample_rate: f32, _channels: usize) {
        self.reset();
    }

    fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        let frames = frame_count(buffer.len(), channels);
        if frames == 0 {
            return;
        }
        let active = &mut buffer[..frames * channels];
        if channels < 2 || self.is_neutral() {
            sanitize_buffer(active);
            return;
        }

        self.bleed.begin_block(frames);
        for frame in active.chunks_exact_mut(channels) {
            let bleed = self.bleed.advance();
            for pair in frame.chunks_exact_mut(2) {
                let left = sanitize(pair[0]);
                let right = sanitize(pair[1]);
                pair[0] = left + bleed * right;
                pair[1] = right + bleed * left;
            }
            if channels % 2 == 1 {
                let last = channels - 1;
                frame[last] = sanitize(frame[last]);
            }
        }
    }

    fn reset(&mut self) {
        self.bleed.set_immediate(self.bleed.target());
    }

    fn is_neutral(&self) -> bool {
        self.bleed.is_settled() && self.bleed.get() == 0.0
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;

    #[test]
    fn full_bleed_copies_left_into_right() {
        let mut xt = Crosstalk::new();
        xt.set_amount_db(0.0);
        xt.prepare(48000.0, 2);
        let mut buffer: alloc::vec::Vec<f32> =
            (0..512).map(|i| if i % 2 == 0 { 1.0 } else { 0.0 }).collect();
        xt.process_interleaved(&mut buffer, 2);
        for frame in buffer.chunks(2) {
            assert_eq!(frame[0], 1.0);
            assert_eq!(frame[1], 1.0);
        }
    }

    #[test]
    fn off_is_identity() {
        let mut xt = Crosstalk::new();
        xt.set_amount_db(f32::NEG_INFINITY);
        xt.prepare(48000.0, 2);
        assert_eq!(xt.bleed(), 0.0);
        assert!(xt.is_neutral());
        let input = vec![0.3f32, -0.7, 0.1, 0.9];
        let mut buffer = input.clone();
        xt.process_interleaved(&mut buffer, 2);
        assert_eq!(buffer, input);
    }

    #[test]
    fn mono_is_untouched() {
        let mut xt = Crosstalk::new();
        xt.set_amount_db(0.0);
        xt.prepare(48000.0, 1);
        let mut buffer = vec![0.5f32; 16];
        xt.process_interleaved(&mut buffer, 1);
        assert!(buffer.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn pairs_are_independent() {
        let mut xt = Crosstalk::new();
        xt.set_amount_db(-6.0);
        xt.prepare(48000.0, 5);
        let mut buffer = vec![1.0f32, 0.0, 0.0, 0.0, 0.25];
        xt.process_interleaved(&mut buffer, 5);
        let bleed = db_to_linear(-6.0);
        assert_eq!(buffer[0], 1.0);
        assert!((buffer[1] - bleed).abs() < 1e-6);
        assert_eq!(buffer[2], 0.0);
        assert_eq!(buffer[3], 0.0);
        assert_eq!(buffer[4], 0.25);
    }

    #[test]
    fn bleed_ramps_in() {
        let mut xt = Crosstalk::new();
        xt.prepare(48000.0, 2);
        xt.set_amount_db(0.0);
        let mut buffer = vec![1.0f32, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        xt.process_interleaved(&mut buffer, 2);
        assert!((buffer[1] - 0.25).abs() < 1e-6);
        assert!((buffer[7] - 1.0).abs() < 1e-6);
    }
}
