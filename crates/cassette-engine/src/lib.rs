//! Cassette Engine - the tape emulation pipeline
//!
//! Owns one instance of every stage from `cassette-effects`, runs them in a
//! fixed order over interleaved audio, and receives parameters from a
//! control thread through a latest-wins slot.
//!
//! - [`Engine`] - Composition root: prepare, process, meters, reset
//! - [`ParameterSnapshot`] - All user-controllable knobs as one `Copy` value
//! - [`ParamSlot`] - Wait-free, latest-wins handoff of snapshots
//! - [`EngineConfig`] / [`EngineError`] - Stream format and its validation
//!
//! ## Example
//!
//! ```rust
//! use cassette_engine::{Engine, EngineConfig, ParameterSnapshot};
//!
//! let mut engine = Engine::new(EngineConfig::new(44100.0, 256, 2)).unwrap();
//!
//! // Control thread
//! let slot = engine.param_slot();
//! std::thread::spawn(move || slot.store(ParameterSnapshot::tape_default()))
//!     .join()
//!     .unwrap();
//!
//! // Audio thread
//! let mut block = vec![0.25f32; 256 * 2];
//! engine.process(&mut block, 2);
//! assert!(block.iter().all(|s| s.is_finite()));
//! ```
//!
//! ## Logging
//!
//! Uses the `tracing` facade and installs no subscriber. Prepare is logged at
//! `info`, implicit re-prepares and parameter publication at `debug`, and
//! rejected configurations or oversize blocks at `warn`.

mod config;
mod engine;
mod error;
mod slot;
mod snapshot;

pub use config::{EngineConfig, MAX_CHANNELS, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
pub use engine::Engine;
pub use error::EngineError;
pub use slot::ParamSlot;
pub use snapshot::{FIELD_COUNT, NR_BYPASS_TRACK, ParameterSnapshot, TRACK_COUNT};
