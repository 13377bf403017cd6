//! Cassette Core - DSP kernels for analog tape emulation
//!
//! This crate provides the leaf building blocks of the tape chain, designed
//! for real-time processing with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Module System
//!
//! - [`TapeModule`] - Capability trait for interleaved in-place stages
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothedParam`] - Per-sample exponential smoothing
//! - [`BlockRamp`] - Per-block linear ramps
//! - [`BlockSmoother`] - Exponential smoothing advanced once per block
//! - [`ParamDescriptor`] - Range metadata for user-facing controls
//!
//! ## Filters
//!
//! - [`Biquad`] - Transposed direct-form II section with RBJ designs
//!   ([`low_shelf`], [`high_shelf`], [`peaking`])
//! - [`OnePole`] - 6 dB/oct lowpass in "g" form
//!
//! ## Modulation, Dynamics, Noise
//!
//! - [`Lfo`] - Sine oscillator for wow, flutter and azimuth wander
//! - [`FractionalDelay`] - Linear-interpolated circular delay line
//! - [`EnvelopeFollower`] - Attack/release peak detector
//! - [`Rng`] / [`TiltedNoise`] - Seeded noise source with spectral tilt
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! cassette-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocations in processing paths
//! - **Never NaN**: degenerate designs fall back to identity filters and
//!   non-finite samples are replaced with silence
//! - **Deterministic**: all randomness comes from explicitly seeded [`Rng`]s

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod delay;
pub mod envelope;
pub mod lfo;
pub mod math;
pub mod module;
pub mod noise;
pub mod one_pole;
pub mod param;
pub mod param_info;

pub use biquad::{Biquad, Coefficients, high_shelf, low_shelf, peaking};
pub use delay::FractionalDelay;
pub use envelope::{EnvelopeFollower, time_coefficient};
pub use lfo::Lfo;
pub use math::{
    SILENCE_DB, db_to_linear, finite_or, flush_denormal, lerp, linear_to_db, ms_to_samples,
    rms_to_dbfs, samples_to_ms, sanitize, sanitize_buffer,
};
pub use module::{
    FALLBACK_SAMPLE_RATE, TapeModule, active_len, checked_sample_rate, frame_count,
};
pub use noise::{DEFAULT_SEED, Rng, TiltedNoise};
pub use one_pole::OnePole;
pub use param::{BlockRamp, BlockSmoother, SETTLE_EPSILON, SmoothedParam, glide, smoothing_alpha};
pub use param_info::{ParamDescriptor, ParamUnit};
