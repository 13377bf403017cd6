//! Parameter and preset validation.
//!
//! Validation reports problems without touching the data. Use
//! [`Preset::clamped`](crate::Preset::clamped) to obtain a usable copy.
//!
//! # Example
//!
//! ```rust
//! use cassette_config::{Preset, ValidationError, validate_preset};
//!
//! let mut preset = Preset::new("Too Much Bump");
//! preset.parameters.head_bump_gain_db = 30.0;
//!
//! let err = validate_preset(&preset).unwrap_err();
//! assert!(matches!(err, ValidationError::OutOfRange { .. }));
//! ```

use cassette_core::ParamDescriptor;
use cassette_engine::ParameterSnapshot;
use thiserror::Error;

use crate::Preset;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Unknown parameter id.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Parameter id.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// NaN or infinite parameter value.
    #[error("parameter '{param}' is not finite")]
    NonFinite {
        /// Parameter id.
        param: String,
    },

    /// Preset name is empty or whitespace.
    #[error("preset name is empty")]
    EmptyName,

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Looks up the descriptor for a serialized parameter id.
pub fn find_descriptor(id: &str) -> Option<ParamDescriptor> {
    ParameterSnapshot::default()
        .fields()
        .into_iter()
        .map(|(desc, _)| desc)
        .find(|desc| desc.id == id)
}

/// Checks a single value against its descriptor.
pub fn validate_value(desc: &ParamDescriptor, value: f32) -> ValidationResult<f32> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite {
            param: desc.id.to_string(),
        });
    }
    if value < desc.min || value > desc.max {
        return Err(ValidationError::OutOfRange {
            param: desc.id.to_string(),
            value,
            min: desc.min,
            max: desc.max,
        });
    }
    Ok(value)
}

/// Checks a value for the parameter named `id`.
pub fn validate_param(id: &str, value: f32) -> ValidationResult<f32> {
    let desc = find_descriptor(id).ok_or_else(|| ValidationError::UnknownParameter(id.to_string()))?;
    validate_value(&desc, value)
}

/// Checks every continuous field of a snapshot.
pub fn validate_snapshot(snapshot: &ParameterSnapshot) -> ValidationResult<()> {
    let errors: Vec<ValidationError> = snapshot
        .fields()
        .iter()
        .filter_map(|(desc, value)| validate_value(desc, *value).err())
        .collect();
    collapse(errors)
}

/// Checks a preset's name and parameters.
pub fn validate_preset(preset: &Preset) -> ValidationResult<()> {
    let mut errors = Vec::new();
    if preset.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    match validate_snapshot(&preset.parameters) {
        Ok(()) => {}
        Err(ValidationError::Multiple(inner)) => errors.extend(inner),
        Err(e) => errors.push(e),
    }
    collapse(errors)
}

fn collapse(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_snapshot(&ParameterSnapshot::default()).is_ok());
        assert!(validate_snapshot(&ParameterSnapshot::tape_default()).is_ok());
    }

    #[test]
    fn finds_descriptors_by_id() {
        let desc = find_descriptor("lpf_cutoff_hz").unwrap();
        assert_eq!(desc.min, 20.0);
        assert!(find_descriptor("reverb_size").is_none());
    }

    #[test]
    fn validate_param_reports_each_failure() {
        assert_eq!(validate_param("hiss_tilt", 0.5), Ok(0.5));
        assert_eq!(
            validate_param("bogus", 1.0),
            Err(ValidationError::UnknownParameter("bogus".to_string()))
        );
        assert!(matches!(
            validate_param("wow_depth", 2.0),
            Err(ValidationError::OutOfRange { max, .. }) if max == 1.0
        ));
        assert_eq!(
            validate_param("wow_depth", f32::NAN),
            Err(ValidationError::NonFinite {
                param: "wow_depth".to_string()
            })
        );
    }

    #[test]
    fn snapshot_collects_multiple_errors() {
        let snapshot = ParameterSnapshot {
            sat_drive_db: 100.0,
            crosstalk_db: f32::INFINITY,
            ..ParameterSnapshot::default()
        };
        match validate_snapshot(&snapshot) {
            Err(ValidationError::Multiple(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(matches!(&errors[1], ValidationError::NonFinite { param } if param == "crosstalk_db"));
            }
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }

    #[test]
    fn preset_name_must_not_be_blank() {
        let preset = Preset::new("   ");
        assert_eq!(validate_preset(&preset), Err(ValidationError::EmptyName));
    }

    #[test]
    fn multiple_display_joins_messages() {
        let err = ValidationError::Multiple(vec![
            ValidationError::EmptyName,
            ValidationError::UnknownParameter("x".to_string()),
        ]);
        assert_eq!(
            err.to_string(),
            "multiple validation errors: preset name is empty; unknown parameter: x"
        );
    }
}
