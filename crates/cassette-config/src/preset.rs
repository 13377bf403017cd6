//! Preset file format and operations.

use std::path::Path;

use cassette_engine::ParameterSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Newest preset format this build reads and writes.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// A named, versioned parameter snapshot.
///
/// Presets are stored as TOML by default. Files with a `.json` extension are
/// read and written as JSON. Missing parameter fields take their neutral
/// default, and a missing `format_version` reads as the current version.
///
/// # TOML Format
///
/// ```toml
/// format_version = 1
/// name = "Warm Bump"
/// author = "Factory"
///
/// [parameters]
/// wow_depth = 0.07
/// head_bump_gain_db = 4.0
/// head_bump_freq_hz = 78.0
/// sat_drive_db = -3.0
/// hiss_level_dbfs = -60.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Format version the preset was written with.
    #[serde(default = "default_format_version")]
    pub format_version: u32,

    /// Display name.
    pub name: String,

    /// Optional author credit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Engine parameters.
    #[serde(default)]
    pub parameters: ParameterSnapshot,
}

fn default_format_version() -> u32 {
    CURRENT_FORMAT_VERSION
}

impl Preset {
    /// Create a preset with neutral parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            format_version: CURRENT_FORMAT_VERSION,
            name: name.into(),
            author: None,
            parameters: ParameterSnapshot::default(),
        }
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the parameters.
    pub fn with_parameters(mut self, parameters: ParameterSnapshot) -> Self {
        self.parameters = parameters;
        self
    }

    /// True if a reader supporting `version` can use this preset.
    pub fn is_compatible(&self, version: u32) -> bool {
        self.format_version <= version
    }

    /// Copy with every parameter made finite and in range.
    pub fn clamped(&self) -> Self {
        Self {
            parameters: self.parameters.sanitized(),
            ..self.clone()
        }
    }

    /// Load a preset from a TOML or JSON file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset = if is_json(path) {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };
        tracing::debug!(path = %path.display(), name = %preset.name, "loaded preset");
        Ok(preset)
    }

    /// Save the preset to a TOML or JSON file, chosen by extension.
    ///
    /// Missing parent directories are created.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = if is_json(path) {
            self.to_json()?
        } else {
            self.to_toml()?
        };
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), name = %self.name, "saved preset");
        Ok(())
    }

    /// Parse a TOML string, rejecting newer format versions.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let preset: Preset = toml::from_str(toml_str)?;
        preset.checked()
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parse a JSON string, rejecting newer format versions.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let preset: Preset = serde_json::from_str(json).map_err(ConfigError::JsonParse)?;
        preset.checked()
    }

    /// Convert the preset to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::JsonSerialize)
    }

    fn checked(self) -> Result<Self, ConfigError> {
        if self.is_compatible(CURRENT_FORMAT_VERSION) {
            Ok(self)
        } else {
            tracing::warn!(
                name = %self.name,
                found = self.format_version,
                supported = CURRENT_FORMAT_VERSION,
                "rejected preset from a newer format"
            );
            Err(ConfigError::IncompatibleVersion {
                found: self.format_version,
                supported: CURRENT_FORMAT_VERSION,
            })
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_new() {
        let preset = Preset::new("Test Preset");
        assert_eq!(preset.name, "Test Preset");
        assert_eq!(preset.format_version, CURRENT_FORMAT_VERSION);
        assert!(preset.author.is_none());
        assert!(preset.parameters.is_neutral());
    }

    #[test]
    fn test_preset_builder() {
        let preset = Preset::new("Builder")
            .with_author("Tests")
            .with_parameters(ParameterSnapshot::tape_default());
        assert_eq!(preset.author.as_deref(), Some("Tests"));
        assert_eq!(preset.parameters, ParameterSnapshot::tape_default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut params = ParameterSnapshot::tape_default();
        params.set_nr_track4_bypass(true);
        params.comp_enabled = true;
        let preset = Preset::new("Unit Test")
            .with_author("Tests")
            .with_parameters(params);

        let toml = preset.to_toml().unwrap();
        assert!(toml.contains("[parameters]"));
        let parsed = Preset::from_toml(&toml).unwrap();
        assert_eq!(parsed, preset);
        assert!(parsed.parameters.nr_track4_bypass());
    }

    #[test]
    fn test_json_round_trip() {
        let preset = Preset::new("Json").with_parameters(ParameterSnapshot {
            hiss_level_dbfs: -55.0,
            lpf_cutoff_hz: 9300.0,
            ..ParameterSnapshot::default()
        });
        let json = preset.to_json().unwrap();
        assert_eq!(Preset::from_json(&json).unwrap(), preset);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let preset = Preset::from_toml(
            r#"
name = "Sparse"

[parameters]
sat_drive_db = -2.0
"#,
        )
        .unwrap();
        assert_eq!(preset.format_version, CURRENT_FORMAT_VERSION);
        assert!(preset.author.is_none());
        assert_eq!(preset.parameters.sat_drive_db, -2.0);
        assert_eq!(preset.parameters.head_bump_gain_db, 0.0);
    }

    #[test]
    fn test_author_omitted_when_none() {
        let toml = Preset::new("Anonymous").to_toml().unwrap();
        assert!(!toml.contains("author"));
    }

    #[test]
    fn test_compatibility() {
        let mut preset = Preset::new("Future");
        assert!(preset.is_compatible(CURRENT_FORMAT_VERSION));
        preset.format_version = CURRENT_FORMAT_VERSION + 1;
        assert!(!preset.is_compatible(CURRENT_FORMAT_VERSION));
        assert!(preset.is_compatible(CURRENT_FORMAT_VERSION + 1));
    }

    #[test]
    fn test_newer_version_rejected() {
        let result = Preset::from_json(r#"{"format_version": 2, "name": "Next"}"#);
        assert!(matches!(
            result,
            Err(ConfigError::IncompatibleVersion {
                found: 2,
                supported: 1
            })
        ));
    }

    #[test]
    fn test_missing_name_is_a_parse_error() {
        assert!(matches!(
            Preset::from_toml("format_version = 1"),
            Err(ConfigError::TomlParse(_))
        ));
        assert!(matches!(
            Preset::from_json("{}"),
            Err(ConfigError::JsonParse(_))
        ));
    }

    #[test]
    fn test_clamped_leaves_original_untouched() {
        let mut preset = Preset::new("Hot");
        preset.parameters.sat_drive_db = 90.0;
        preset.parameters.wow_depth = f32::NAN;

        let clamped = preset.clamped();
        assert_eq!(clamped.parameters.sat_drive_db, 40.0);
        assert_eq!(clamped.parameters.wow_depth, 0.0);
        assert_eq!(clamped.name, "Hot");
        assert_eq!(preset.parameters.sat_drive_db, 90.0);
    }
}
