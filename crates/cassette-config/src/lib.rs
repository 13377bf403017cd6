//! Presets and preset management for the cassette tape engine.
//!
//! # Features
//!
//! - **Presets**: versioned [`Preset`] files in TOML or JSON
//! - **Factory Presets**: five built-in tape characters
//! - **Validation**: range and finiteness checks against the parameter descriptors
//! - **Paths**: platform preset directory and a small file-per-preset store
//!
//! # Example
//!
//! ```rust
//! use cassette_config::{Preset, get_factory_preset, validate_preset};
//! use cassette_engine::{Engine, EngineConfig};
//!
//! let preset = get_factory_preset("warm-bump").unwrap();
//! validate_preset(&preset).unwrap();
//!
//! let toml = preset.to_toml().unwrap();
//! let loaded = Preset::from_toml(&toml).unwrap();
//!
//! let mut engine = Engine::new(EngineConfig::default()).unwrap();
//! engine.update_parameters(loaded.parameters);
//! ```

mod error;
mod preset;

/// Platform-specific paths and the preset store.
pub mod paths;

/// Parameter and preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_AUTHOR, FACTORY_PRESET_IDS, factory_preset_names, factory_presets,
    get_factory_preset, is_factory_preset,
};
pub use paths::{
    ensure_user_presets_dir, find_preset, find_preset_in, list_presets_in, load_presets_in,
    preset_file_name, preset_name_from_path, resolve_preset, resolve_preset_in, save_preset_in,
    user_config_dir, user_presets_dir,
};
pub use preset::{CURRENT_FORMAT_VERSION, Preset};
pub use validation::{
    ValidationError, ValidationResult, find_descriptor, validate_param, validate_preset,
    validate_snapshot, validate_value,
};
