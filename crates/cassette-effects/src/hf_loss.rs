//! High-frequency loss: two cascaded one-pole lowpasses per channel.
//!
//! The shared coefficient is smoothed once per block with a 20 ms time
//! constant, scaled to the block duration, instead of per sample.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec::Vec;
use cassette_core::{
    BlockSmoother, OnePole, ParamDescriptor, ParamUnit, TapeModule, checked_sample_rate,
    frame_count, one_pole::lowpass_coefficient, sanitize, sanitize_buffer,
};

const COEFF_SMOOTHING_MS: f32 = 20.0;

/// Lowpass cutoff. The default sits above every supported Nyquist limit, so
/// it always lands on passthrough.
pub const CUTOFF: ParamDescriptor = ParamDescriptor::new(
    "lpf_cutoff_hz",
    "Cutoff",
    ParamUnit::Hertz,
    20.0,
    192_000.0,
    192_000.0,
);

/// Cascaded one-pole tape rolloff.
///
/// # Example
///
/// ```rust
/// use cassette_core::TapeModule;
/// use cassette_effects::HfLoss;
///
/// let mut hf = HfLoss::new();
/// hf.set_cutoff_hz(8000.0);
/// hf.prepare(48000.0, 2);
///
/// let mut block = vec![0.0f32; 256];
/// hf.process_interleaved(&mut block, 2);
/// ```
#[derive(Debug, Clone)]
pub struct HfLoss {
    sample_rate: f32,
    cutoff_hz: f32,
    g: BlockSmoother,
    stages: Vec<[OnePole; 2]>,
}

impl Default for HfLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl HfLoss {
    /// Creates a full-bandwidth stage.
    pub fn new() -> Self {
        Self {
            sample_rate: checked_sample_rate(0.0),
            cutoff_hz: CUTOFF.default,
            g: BlockSmoother::new(1.0, COEFF_SMOOTHING_MS),
            stages: Vec::new(),
        }
    }

    /// Sets the cutoff in Hz. Clamped to \[20 Hz, 0.49·fs\] at design time.
    pub fn set_cutoff_hz(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = CUTOFF.clamp(cutoff_hz);
        self.g
            .set_target(lowpass_coefficient(self.cutoff_hz, self.sample_rate));
    }

    /// Requested cutoff in Hz.
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    /// Coefficient in use for the most recent block.
    pub fn coefficient(&self) -> f32 {
        self.g.get()
    }
}

impl TapeModule for HfLoss {
    fn prepare(&mut self, sample_rate: f32, channels: usize) {
        self.sample_rate = checked_sample_rate(sample_rate);
        self.g
            .set_immediate(lowpass_coefficient(self.cutoff_hz, self.sample_rate));
        self.stages.clear();
        self.stages
            .resize(channels, [OnePole::default(), OnePole::default()]);
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

        let g = self.g.advance_block(frames, self.sample_rate);
        for frame in active.chunks_exact_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let x = sanitize(*sample);
                *sample = match self.stages.get_mut(ch) {
                    Some([first, second]) => second.process_with(first.process_with(x, g), g),
                    None => x,
                };
            }
        }
    }

    fn reset(&mut self) {
        for [first, second] in &mut self.stages {
            first.reset();
            second.reset();
        }
        self.g
            .set_immediate(lowpass_coefficient(self.cutoff_hz, self.sample_rate));
    }

    fn is_neutral(&self) -> bool {
        self.g.is_settled() && self.g.get() >= 1.0
    }
}
