//! Errors returned when configuring the engine.
//!
//! Only the control path can fail. `Engine::process` never returns an error;
//! bad audio input degrades to silence or passthrough instead.

use thiserror::Error;

/// Rejected engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Sample rate outside the supported range, or not finite.
    #[error("invalid sample rate {rate} Hz (supported: {min}..={max} Hz)")]
    InvalidSampleRate {
        /// Requested rate.
        rate: f64,
        /// Lowest supported rate.
        min: f64,
        /// Highest supported rate.
        max: f64,
    },

    /// Zero channels.
    #[error("invalid channel count {0}")]
    InvalidChannelCount(usize),

    /// Zero-frame maximum block size.
    #[error("invalid maximum block size {0}")]
    InvalidBlockSize(usize),

    /// More channels than the engine supports.
    #[error("{requested} channels requested, at most {max} supported")]
    TooManyChannels {
        /// Requested channel count.
        requested: usize,
        /// Supported maximum.
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = EngineError::InvalidSampleRate {
            rate: 0.0,
            min: 8000.0,
            max: 384000.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid sample rate 0 Hz (supported: 8000..=384000 Hz)"
        );
        assert_eq!(
            EngineError::TooManyChannels {
                requested: 40,
                max: 32
            }
            .to_string(),
            "40 channels requested, at most 32 supported"
        );
        assert_eq!(
            EngineError::InvalidBlockSize(0).to_string(),
            "invalid maximum block size 0"
        );
    }
}
