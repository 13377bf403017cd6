//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Most channels a single engine processes.
pub const MAX_CHANNELS: usize = 32;
/// Lowest supported sample rate.
pub const MIN_SAMPLE_RATE: f64 = 8000.0;
/// Highest supported sample rate.
pub const MAX_SAMPLE_RATE: f64 = 384000.0;

/// Stream format the engine is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Largest block `process` handles in one pass. Bigger blocks are split.
    pub max_block_frames: usize,
    /// Interleaved channel count.
    pub channels: usize,
    /// Fixed seed for every random source. `None` seeds hiss from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block_frames: 512,
            channels: 2,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Creates a config without a fixed seed.
    pub fn new(sample_rate: f64, max_block_frames: usize, channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_frames,
            channels,
            seed: None,
        }
    }

    /// Same config with a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks every field.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.sample_rate.is_finite()
            || !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate)
        {
            return Err(EngineError::InvalidSampleRate {
                rate: self.sample_rate,
                min: MIN_SAMPLE_RATE,
                max: MAX_SAMPLE_RATE,
            });
        }
        if self.channels == 0 {
            return Err(EngineError::InvalidChannelCount(self.channels));
        }
        if self.channels > MAX_CHANNELS {
            return Err(EngineError::TooManyChannels {
                requested: self.channels,
                max: MAX_CHANNELS,
            });
        }
        if self.max_block_frames == 0 {
            return Err(EngineError::InvalidBlockSize(self.max_block_frames));
        }
        Ok(())
    }
}
