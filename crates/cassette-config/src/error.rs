//! Error types for preset operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur while loading, saving, or validating presets.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A preset file could not be read.
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A preset file could not be written.
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A preset directory could not be created.
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML preset.
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML encoding failed.
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Malformed JSON preset.
    #[error("failed to parse JSON: {0}")]
    JsonParse(#[source] serde_json::Error),

    /// JSON encoding failed.
    #[error("failed to serialize JSON: {0}")]
    JsonSerialize(#[source] serde_json::Error),

    /// No factory preset or file matched the key.
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// Preset was written by a newer format
    #[error("preset format version {found} is newer than supported version {supported}")]
    IncompatibleVersion {
        /// Version stored in the preset.
        found: u32,
        /// Newest version this build reads.
        supported: u32,
    },

    /// Preset has no usable name
    #[error("preset name is empty")]
    EmptyName,

    /// The preset failed range checks.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    /// [`ConfigError::ReadFile`] for `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// [`ConfigError::WriteFile`] for `path`.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// [`ConfigError::CreateDir`] for `path`.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}
