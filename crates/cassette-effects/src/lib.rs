//! Cassette Effects - tape artifact stages
//!
//! Each stage implements [`cassette_core::TapeModule`] and processes
//! interleaved audio in place. With default settings every stage is an exact
//! identity.
//!
//! - [`Dropouts`] - Random level dips
//! - [`Compander`] - Noise-reduction style compressor with per-track bypass
//! - [`WowFlutter`] - Transport speed variation via modulated delay
//! - [`HeadBump`] - Low-frequency resonance of the playback head
//! - [`Saturation`] - tanh magnetization with loudness-matched trim
//! - [`HfLoss`] - Two-pole high-frequency rolloff
//! - [`Eq`] - Low shelf, mid peak, high shelf
//! - [`Hiss`] - Seeded, spectrally tilted noise floor
//! - [`Crosstalk`] - Bleed between adjacent tracks
//! - [`Azimuth`] - Wandering inter-channel delay skew
//! - [`Meters`] - RMS and peak readings
//!
//! ## Example
//!
//! ```rust
//! use cassette_core::TapeModule;
//! use cassette_effects::{HfLoss, Saturation};
//!
//! let mut sat = Saturation::new();
//! sat.set_drive_db(-6.0);
//! sat.prepare(48000.0, 2);
//!
//! let mut lpf = HfLoss::new();
//! lpf.set_cutoff_hz(12000.0);
//! lpf.prepare(48000.0, 2);
//!
//! let mut block = vec![0.25f32; 512];
//! sat.process_interleaved(&mut block, 2);
//! lpf.process_interleaved(&mut block, 2);
//! assert!(block.iter().all(|s| s.is_finite()));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod azimuth;
pub mod compander;
pub mod crosstalk;
pub mod dropouts;
pub mod eq;
pub mod head_bump;
pub mod hf_loss;
pub mod hiss;
pub mod meters;
pub mod saturation;
pub mod wow_flutter;

pub use azimuth::Azimuth;
pub use compander::{Compander, GainComputer};
pub use crosstalk::Crosstalk;
pub use dropouts::Dropouts;
pub use eq::{Eq, EqSettings};
pub use head_bump::HeadBump;
pub use hf_loss::HfLoss;
pub use hiss::Hiss;
pub use meters::Meters;
pub use saturation::{Saturation, TrimTable};
pub use wow_flutter::WowFlutter;
