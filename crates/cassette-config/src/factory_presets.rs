//! Factory presets bundled with the library.
//!
//! These are always available without external files. Wow and flutter
//! depths were authored in seconds of modulation and are converted to the
//! engine's normalized depth here.

use cassette_engine::ParameterSnapshot;

use crate::Preset;

/// Author credited on every factory preset.
pub const FACTORY_AUTHOR: &str = "Cassette";

/// Stable ids of the factory presets, in display order.
pub static FACTORY_PRESET_IDS: &[&str] = &[
    "clean-cassette",
    "warm-bump",
    "lo-fi-warble",
    "crunchy-saturation",
    "dusty-archive",
];

struct FactoryEntry {
    id: &'static str,
    name: &'static str,
    wow_s: f32,
    flutter_s: f32,
    bump_db: f32,
    bump_hz: f32,
    drive_db: f32,
    hiss_dbfs: f32,
    cutoff_hz: f32,
    azimuth_ms: f32,
    crosstalk_db: f32,
    dropouts_per_min: f32,
}

static FACTORY: &[FactoryEntry] = &[
    FactoryEntry {
        id: "clean-cassette",
        name: "Clean Cassette",
        wow_s: 0.0005,
        flutter_s: 0.000_25,
        bump_db: 1.5,
        bump_hz: 85.0,
        drive_db: -5.0,
        hiss_dbfs: -65.0,
        cutoff_hz: 13_500.0,
        azimuth_ms: 0.16,
        crosstalk_db: -68.0,
        dropouts_per_min: 0.15,
    },
    FactoryEntry {
        id: "warm-bump",
        name: "Warm Bump",
        wow_s: 0.0007,
        flutter_s: 0.000_35,
        bump_db: 4.0,
        bump_hz: 78.0,
        drive_db: -3.0,
        hiss_dbfs: -60.0,
        cutoff_hz: 12_000.0,
        azimuth_ms: 0.22,
        crosstalk_db: -60.0,
        dropouts_per_min: 0.25,
    },
    FactoryEntry {
        id: "lo-fi-warble",
        name: "Lo-Fi Warble",
        wow_s: 0.0014,
        flutter_s: 0.0008,
        bump_db: 2.0,
        bump_hz: 75.0,
        drive_db: -1.0,
        hiss_dbfs: -54.0,
        cutoff_hz: 9_800.0,
        azimuth_ms: 0.4,
        crosstalk_db: -52.0,
        dropouts_per_min: 0.45,
    },
    FactoryEntry {
        id: "crunchy-saturation",
        name: "Crunchy Saturation",
        wow_s: 0.000_55,
        flutter_s: 0.000_38,
        bump_db: 3.0,
        bump_hz: 90.0,
        drive_db: -2.0,
        hiss_dbfs: -62.0,
        cutoff_hz: 11_200.0,
        azimuth_ms: 0.2,
        crosstalk_db: -55.0,
        dropouts_per_min: 0.28,
    },
    FactoryEntry {
        id: "dusty-archive",
        name: "Dusty Archive",
        wow_s: 0.0011,
        flutter_s: 0.0007,
        bump_db: 1.2,
        bump_hz: 68.0,
        drive_db: -0.5,
        hiss_dbfs: -50.0,
        cutoff_hz: 8_000.0,
        azimuth_ms: 0.55,
        crosstalk_db: -46.0,
        dropouts_per_min: 0.55,
    },
];

impl FactoryEntry {
    fn preset(&self) -> Preset {
        let parameters = ParameterSnapshot {
            wow_depth: ParameterSnapshot::wow_depth_from_seconds(self.wow_s),
            flutter_depth: ParameterSnapshot::flutter_depth_from_seconds(self.flutter_s),
            head_bump_gain_db: self.bump_db,
            head_bump_freq_hz: self.bump_hz,
            sat_drive_db: self.drive_db,
            hiss_level_dbfs: self.hiss_dbfs,
            lpf_cutoff_hz: self.cutoff_hz,
            azimuth_jitter_ms: self.azimuth_ms,
            crosstalk_db: self.crosstalk_db,
            dropout_rate_per_min: self.dropouts_per_min,
            ..ParameterSnapshot::default()
        };
        Preset::new(self.name)
            .with_author(FACTORY_AUTHOR)
            .with_parameters(parameters)
    }
}

/// All factory presets, in display order.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY.iter().map(FactoryEntry::preset).collect()
}

/// Looks up a factory preset by id or display name (case-insensitive).
pub fn get_factory_preset(key: &str) -> Option<Preset> {
    FACTORY
        .iter()
        .find(|entry| entry.id.eq_ignore_ascii_case(key) || entry.name.eq_ignore_ascii_case(key))
        .map(FactoryEntry::preset)
}

/// Display names of the factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY.iter().map(|entry| entry.name).collect()
}

/// True if `key` names a factory preset by id or display name.
pub fn is_factory_preset(key: &str) -> bool {
    get_factory_preset(key).is_some()
}
