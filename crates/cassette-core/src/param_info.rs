//! Parameter metadata for discoverable, range-checked controls.
//!
//! Every user-facing control of the tape chain is described by a
//! [`ParamDescriptor`]: a stable string id, a display name, its unit, and the
//! range that setters clamp to. Presets and validators walk these
//! descriptors instead of hard-coding ranges.
//!
//! # Example
//!
//! ```rust
//! use cassette_core::{ParamDescriptor, ParamUnit};
//!
//! let drive = ParamDescriptor::new("saturation_drive_db", "Drive", ParamUnit::Decibels, -24.0, 24.0, 0.0);
//! assert_eq!(drive.clamp(30.0), 24.0);
//! assert!(drive.contains(0.0));
//! ```

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB).
    Decibels,
    /// Hertz (Hz).
    Hertz,
    /// Milliseconds (ms).
    Milliseconds,
    /// Events per minute.
    PerMinute,
    /// Ratio (n:1).
    Ratio,
    /// Dimensionless amount, usually 0..1.
    None,
}

impl ParamUnit {
    /// Unit suffix for display.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::PerMinute => " /min",
            ParamUnit::Ratio => ":1",
            ParamUnit::None => "",
        }
    }
}

/// Metadata for one continuous parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Stable identifier used in presets (e.g. `"wow_depth"`).
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Unit for display.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Neutral value: the setting at which the owning stage is an identity.
    pub default: f32,
}

impl ParamDescriptor {
    /// Creates a descriptor.
    pub const fn new(
        id: &'static str,
        name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            id,
            name,
            unit,
            min,
            max,
            default,
        }
    }

    /// Clamps `value` into range; non-finite values map to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// True when `value` is finite and inside \[min, max\].
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}
