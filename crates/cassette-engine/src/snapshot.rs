//! The parameter snapshot handed to the engine once per block.
//!
//! A [`ParameterSnapshot`] is plain `Copy` data. The control thread builds a
//! complete snapshot and publishes it through a [`ParamSlot`](crate::ParamSlot);
//! the audio thread copies the latest one at the start of each block and
//! applies every field together.
//!
//! `Default` is the neutral snapshot: every stage is an identity.
//! [`ParameterSnapshot::tape_default`] is the "typical cassette" starting
//! point a host shows on first launch.

use cassette_core::ParamDescriptor;
use cassette_effects::{
    azimuth, compander, crosstalk, dropouts, eq, head_bump, hf_loss, hiss, saturation,
    wow_flutter,
};
use serde::{Deserialize, Serialize};

use crate::MAX_CHANNELS;

/// Number of per-track bypass flags, one for every channel the engine
/// accepts.
pub const TRACK_COUNT: usize = MAX_CHANNELS;

/// Track whose compander is historically bypassed by the "track 4 NR" switch.
pub const NR_BYPASS_TRACK: usize = 3;

/// Number of continuous fields reported by [`ParameterSnapshot::fields`].
pub const FIELD_COUNT: usize = 26;

/// Every user-controllable knob, read as one unit per block.
///
/// Serialized field names match the descriptor ids in `cassette-effects`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSnapshot {
    /// Wow depth, 0..1 of the full 10 ms swing.
    pub wow_depth: f32,
    /// Flutter depth, 0..1 of the full 2.5 ms swing.
    pub flutter_depth: f32,
    /// Wow LFO rate in Hz.
    pub wow_rate_hz: f32,
    /// Flutter LFO rate in Hz.
    pub flutter_rate_hz: f32,

    /// Head bump gain in dB.
    pub head_bump_gain_db: f32,
    /// Head bump center frequency in Hz.
    pub head_bump_freq_hz: f32,
    /// Head bump dry/wet mix.
    pub head_bump_mix: f32,

    /// Saturation drive in dB. 0 bypasses the shaper.
    pub sat_drive_db: f32,
    /// Output trim after saturation in dB.
    pub sat_output_db: f32,

    /// High-frequency loss cutoff in Hz.
    pub lpf_cutoff_hz: f32,

    /// EQ low shelf gain in dB.
    pub eq_low_db: f32,
    /// EQ mid peak gain in dB.
    pub eq_mid_db: f32,
    /// EQ mid peak frequency in Hz.
    pub eq_mid_freq_hz: f32,
    /// EQ mid peak Q.
    pub eq_mid_q: f32,
    /// EQ high shelf gain in dB.
    pub eq_high_db: f32,

    /// Hiss level in dBFS. -200 is silence.
    pub hiss_level_dbfs: f32,
    /// Hiss spectral tilt; negative is darker.
    pub hiss_tilt: f32,

    /// Crosstalk between track pairs in dB. -120 is off.
    pub crosstalk_db: f32,
    /// Azimuth jitter depth in ms.
    pub azimuth_jitter_ms: f32,
    /// Average dropouts per minute.
    pub dropout_rate_per_min: f32,

    /// Compander on/off.
    pub comp_enabled: bool,
    /// Compander threshold in dB.
    pub comp_threshold_db: f32,
    /// Compander ratio.
    pub comp_ratio: f32,
    /// Compander attack in ms.
    pub comp_attack_ms: f32,
    /// Compander release in ms.
    pub comp_release_ms: f32,
    /// Compander knee width in dB.
    pub comp_knee_db: f32,
    /// Compander makeup gain in dB.
    pub comp_makeup_db: f32,

    /// Per-track compander bypass.
    pub track_bypass: [bool; TRACK_COUNT],
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            wow_depth: wow_flutter::WOW_DEPTH.default,
            flutter_depth: wow_flutter::FLUTTER_DEPTH.default,
            wow_rate_hz: wow_flutter::WOW_RATE.default,
            flutter_rate_hz: wow_flutter::FLUTTER_RATE.default,
            head_bump_gain_db: head_bump::GAIN.default,
            head_bump_freq_hz: head_bump::FREQUENCY.default,
            head_bump_mix: head_bump::MIX.default,
            sat_drive_db: saturation::DRIVE.default,
            sat_output_db: saturation::OUTPUT.default,
            lpf_cutoff_hz: hf_loss::CUTOFF.default,
            eq_low_db: eq::LOW_GAIN.default,
            eq_mid_db: eq::MID_GAIN.default,
            eq_mid_freq_hz: eq::MID_FREQ.default,
            eq_mid_q: eq::MID_Q.default,
            eq_high_db: eq::HIGH_GAIN.default,
            hiss_level_dbfs: hiss::LEVEL.default,
            hiss_tilt: hiss::TILT.default,
            crosstalk_db: crosstalk::AMOUNT.default,
            azimuth_jitter_ms: azimuth::JITTER.default,
            dropout_rate_per_min: dropouts::RATE.default,
            comp_enabled: false,
            comp_threshold_db: compander::THRESHOLD.default,
            comp_ratio: compander::RATIO.default,
            comp_attack_ms: compander::ATTACK.default,
            comp_release_ms: compander::RELEASE.default,
            comp_knee_db: compander::KNEE.default,
            comp_makeup_db: compander::MAKEUP.default,
            track_bypass: [false; TRACK_COUNT],
        }
    }
}

impl ParameterSnapshot {
    /// The host's historical first-launch settings.
    ///
    /// Wow and flutter were historically given in seconds (0.6 ms and
    /// 0.3 ms); here they are fractions of the full-scale swing.
    pub fn tape_default() -> Self {
        Self {
            wow_depth: Self::wow_depth_from_seconds(0.0006),
            flutter_depth: Self::flutter_depth_from_seconds(0.0003),
            head_bump_gain_db: 2.0,
            head_bump_freq_hz: 80.0,
            sat_drive_db: -6.0,
            hiss_level_dbfs: -60.0,
            lpf_cutoff_hz: 12000.0,
            azimuth_jitter_ms: 0.2,
            crosstalk_db: -60.0,
            dropout_rate_per_min: 0.2,
            ..Self::default()
        }
    }

    /// Normalized wow depth for a modulation swing given in seconds.
    pub fn wow_depth_from_seconds(seconds: f32) -> f32 {
        seconds * 1000.0 / wow_flutter::MAX_WOW_MS
    }

    /// Normalized flutter depth for a modulation swing given in seconds.
    pub fn flutter_depth_from_seconds(seconds: f32) -> f32 {
        seconds * 1000.0 / wow_flutter::MAX_FLUTTER_MS
    }

    /// True when every stage would be an identity.
    pub fn is_neutral(&self) -> bool {
        let neutral = Self {
            // Fields that only shape an active stage do not matter when the
            // stage itself is off.
            wow_rate_hz: self.wow_rate_hz,
            flutter_rate_hz: self.flutter_rate_hz,
            head_bump_freq_hz: self.head_bump_freq_hz,
            head_bump_mix: self.head_bump_mix,
            eq_mid_freq_hz: self.eq_mid_freq_hz,
            eq_mid_q: self.eq_mid_q,
            hiss_tilt: self.hiss_tilt,
            comp_threshold_db: self.comp_threshold_db,
            comp_ratio: self.comp_ratio,
            comp_attack_ms: self.comp_attack_ms,
            comp_release_ms: self.comp_release_ms,
            comp_knee_db: self.comp_knee_db,
            comp_makeup_db: self.comp_makeup_db,
            track_bypass: self.track_bypass,
            ..Self::default()
        };
        *self == neutral
    }

    /// Every continuous field paired with its descriptor, in pipeline order.
    pub fn fields(&self) -> [(ParamDescriptor, f32); FIELD_COUNT] {
        [
            (dropouts::RATE, self.dropout_rate_per_min),
            (compander::THRESHOLD, self.comp_threshold_db),
            (compander::RATIO, self.comp_ratio),
            (compander::ATTACK, self.comp_attack_ms),
            (compander::RELEASE, self.comp_release_ms),
            (compander::KNEE, self.comp_knee_db),
            (compander::MAKEUP, self.comp_makeup_db),
            (wow_flutter::WOW_DEPTH, self.wow_depth),
            (wow_flutter::FLUTTER_DEPTH, self.flutter_depth),
            (wow_flutter::WOW_RATE, self.wow_rate_hz),
            (wow_flutter::FLUTTER_RATE, self.flutter_rate_hz),
            (head_bump::GAIN, self.head_bump_gain_db),
            (head_bump::FREQUENCY, self.head_bump_freq_hz),
            (head_bump::MIX, self.head_bump_mix),
            (saturation::DRIVE, self.sat_drive_db),
            (saturation::OUTPUT, self.sat_output_db),
            (hf_loss::CUTOFF, self.lpf_cutoff_hz),
            (eq::LOW_GAIN, self.eq_low_db),
            (eq::MID_GAIN, self.eq_mid_db),
            (eq::MID_FREQ, self.eq_mid_freq_hz),
            (eq::MID_Q, self.eq_mid_q),
            (eq::HIGH_GAIN, self.eq_high_db),
            (hiss::LEVEL, self.hiss_level_dbfs),
            (hiss::TILT, self.hiss_tilt),
            (crosstalk::AMOUNT, self.crosstalk_db),
            (azimuth::JITTER, self.azimuth_jitter_ms),
        ]
    }

    /// Copy with non-finite fields replaced by their neutral default and
    /// everything else clamped into range.
    pub fn sanitized(&self) -> Self {
        let f = |value: f32, desc: &ParamDescriptor| {
            if value.is_finite() {
                desc.clamp(value)
            } else {
                desc.default
            }
        };
        Self {
            wow_depth: f(self.wow_depth, &wow_flutter::WOW_DEPTH),
            flutter_depth: f(self.flutter_depth, &wow_flutter::FLUTTER_DEPTH),
            wow_rate_hz: f(self.wow_rate_hz, &wow_flutter::WOW_RATE),
            flutter_rate_hz: f(self.flutter_rate_hz, &wow_flutter::FLUTTER_RATE),
            head_bump_gain_db: f(self.head_bump_gain_db, &head_bump::GAIN),
            head_bump_freq_hz: f(self.head_bump_freq_hz, &head_bump::FREQUENCY),
            head_bump_mix: f(self.head_bump_mix, &head_bump::MIX),
            sat_drive_db: f(self.sat_drive_db, &saturation::DRIVE),
            sat_output_db: f(self.sat_output_db, &saturation::OUTPUT),
            lpf_cutoff_hz: f(self.lpf_cutoff_hz, &hf_loss::CUTOFF),
            eq_low_db: f(self.eq_low_db, &eq::LOW_GAIN),
            eq_mid_db: f(self.eq_mid_db, &eq::MID_GAIN),
            eq_mid_freq_hz: f(self.eq_mid_freq_hz, &eq::MID_FREQ),
            eq_mid_q: f(self.eq_mid_q, &eq::MID_Q),
            eq_high_db: f(self.eq_high_db, &eq::HIGH_GAIN),
            hiss_level_dbfs: f(self.hiss_level_dbfs, &hiss::LEVEL),
            hiss_tilt: f(self.hiss_tilt, &hiss::TILT),
            crosstalk_db: f(self.crosstalk_db, &crosstalk::AMOUNT),
            azimuth_jitter_ms: f(self.azimuth_jitter_ms, &azimuth::JITTER),
            dropout_rate_per_min: f(self.dropout_rate_per_min, &dropouts::RATE),
            comp_enabled: self.comp_enabled,
            comp_threshold_db: f(self.comp_threshold_db, &compander::THRESHOLD),
            comp_ratio: f(self.comp_ratio, &compander::RATIO),
            comp_attack_ms: f(self.comp_attack_ms, &compander::ATTACK),
            comp_release_ms: f(self.comp_release_ms, &compander::RELEASE),
            comp_knee_db: f(self.comp_knee_db, &compander::KNEE),
            comp_makeup_db: f(self.comp_makeup_db, &compander::MAKEUP),
            track_bypass: self.track_bypass,
        }
    }

    /// Historical "track 4 NR bypass" switch.
    pub fn nr_track4_bypass(&self) -> bool {
        self.track_bypass[NR_BYPASS_TRACK]
    }

    /// Sets the historical "track 4 NR bypass" switch.
    pub fn set_nr_track4_bypass(&mut self, bypass: bool) {
        self.track_bypass[NR_BYPASS_TRACK] = bypass;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_neutral() {
        let snapshot = ParameterSnapshot::default();
        assert!(snapshot.is_neutral());
        assert!(!ParameterSnapshot::tape_default().is_neutral());
    }

    #[test]
    fn neutral_ignores_shape_of_disabled_stages() {
        let snapshot = ParameterSnapshot {
            head_bump_freq_hz: 120.0,
            hiss_tilt: -0.5,
            comp_ratio: 8.0,
            ..ParameterSnapshot::default()
        };
        assert!(snapshot.is_neutral());
        let enabled = ParameterSnapshot {
            comp_enabled: true,
            ..ParameterSnapshot::default()
        };
        assert!(!enabled.is_neutral());
    }

    #[test]
    fn tape_default_depths_are_normalized() {
        let snapshot = ParameterSnapshot::tape_default();
        assert!((snapshot.wow_depth - 0.06).abs() < 1e-6);
        assert!((snapshot.flutter_depth - 0.12).abs() < 1e-6);
        assert_eq!(snapshot.lpf_cutoff_hz, 12000.0);
        assert_eq!(snapshot.crosstalk_db, -60.0);
        assert!(!snapshot.nr_track4_bypass());
    }

    #[test]
    fn sanitized_replaces_non_finite_with_default() {
        let dirty = ParameterSnapshot {
            wow_depth: f32::NAN,
            crosstalk_db: f32::NEG_INFINITY,
            lpf_cutoff_hz: f32::INFINITY,
            sat_drive_db: 1000.0,
            eq_mid_q: 0.0,
            ..ParameterSnapshot::tape_default()
        };
        let clean = dirty.sanitized();
        assert_eq!(clean.wow_depth, 0.0);
        assert_eq!(clean.crosstalk_db, crosstalk::OFF_DB);
        assert_eq!(clean.lpf_cutoff_hz, hf_loss::CUTOFF.default);
        assert_eq!(clean.sat_drive_db, saturation::DRIVE.max);
        assert_eq!(clean.eq_mid_q, eq::MID_Q.min);
        assert!(clean.fields().iter().all(|(_, v)| v.is_finite()));
    }

    #[test]
    fn sanitized_is_idempotent() {
        let once = ParameterSnapshot::tape_default().sanitized();
        assert_eq!(once, once.sanitized());
        assert_eq!(once, ParameterSnapshot::tape_default());
    }

    #[test]
    fn fields_cover_every_descriptor_once() {
        let fields = ParameterSnapshot::default().fields();
        for (i, (a, _)) in fields.iter().enumerate() {
            for (b, _) in &fields[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
        for (desc, value) in fields {
            assert_eq!(value, desc.default, "{} not neutral", desc.id);
        }
    }

    #[test]
    fn nr_bypass_maps_to_track_four() {
        let mut snapshot = ParameterSnapshot::default();
        snapshot.set_nr_track4_bypass(true);
        assert!(snapshot.track_bypass[3]);
        assert!(snapshot.nr_track4_bypass());
    }

    #[test]
    fn every_channel_has_a_bypass_flag() {
        let mut snapshot = ParameterSnapshot::default();
        assert_eq!(snapshot.track_bypass.len(), MAX_CHANNELS);
        snapshot.track_bypass[MAX_CHANNELS - 1] = true;
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: ParameterSnapshot = serde_json::from_str(&json).unwrap();
        assert!(back.track_bypass[MAX_CHANNELS - 1]);
        assert_eq!(back.sanitized(), snapshot);
    }

    #[test]
    fn missing_fields_deserialize_to_default() {
        let snapshot: ParameterSnapshot =
            serde_json::from_str(r#"{ "wow_depth": 0.25 }"#).unwrap();
        assert_eq!(snapshot.wow_depth, 0.25);
        assert_eq!(snapshot.hiss_level_dbfs, hiss::LEVEL.default);
        assert_eq!(snapshot.track_bypass, [false; TRACK_COUNT]);
    }
}
