//! Property-based tests for the engine and parameter snapshots.

use cassette_engine::{Engine, EngineConfig, FIELD_COUNT, ParameterSnapshot, TRACK_COUNT};
use proptest::prelude::*;

/// Builds a snapshot from normalized values in `fields()` order.
fn snapshot_from(t: &[f32], flags: &[bool]) -> ParameterSnapshot {
    let d = ParameterSnapshot::default().fields();
    let v = |i: usize| d[i].0.min + t[i] * (d[i].0.max - d[i].0.min);
    let mut track_bypass = [false; TRACK_COUNT];
    track_bypass.copy_from_slice(&flags[1..=TRACK_COUNT]);
    ParameterSnapshot {
        dropout_rate_per_min: v(0),
        comp_threshold_db: v(1),
        comp_ratio: v(2),
        comp_attack_ms: v(3),
        comp_release_ms: v(4),
        comp_knee_db: v(5),
        comp_makeup_db: v(6),
        wow_depth: v(7),
        flutter_depth: v(8),
        wow_rate_hz: v(9),
        flutter_rate_hz: v(10),
        head_bump_gain_db: v(11),
        head_bump_freq_hz: v(12),
        head_bump_mix: v(13),
        sat_drive_db: v(14),
        sat_output_db: v(15),
        lpf_cutoff_hz: v(16),
        eq_low_db: v(17),
        eq_mid_db: v(18),
        eq_mid_freq_hz: v(19),
        eq_mid_q: v(20),
        eq_high_db: v(21),
        hiss_level_dbfs: v(22),
        hiss_tilt: v(23),
        crosstalk_db: v(24),
        azimuth_jitter_ms: v(25),
        comp_enabled: flags[0],
        track_bypass,
    }
}

fn snapshot_strategy() -> impl Strategy<Value = ParameterSnapshot> {
    (
        prop::collection::vec(0.0f32..=1.0f32, FIELD_COUNT),
        prop::collection::vec(any::<bool>(), TRACK_COUNT + 1),
    )
        .prop_map(|(t, flags)| snapshot_from(&t, &flags))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any in-range snapshot keeps the output finite.
    #[test]
    fn any_snapshot_gives_finite_output(
        params in snapshot_strategy(),
        input in prop::collection::vec(-1.0f32..=1.0f32, 256..2048),
        channels in 1usize..=4,
        seed in any::<u64>(),
    ) {
        let mut engine = Engine::new(EngineConfig::new(48000.0, 256, channels).with_seed(seed)).unwrap();
        engine.update_parameters(params);
        let mut buffer = input.clone();
        engine.process(&mut buffer, channels);
        engine.process(&mut buffer, channels);
        prop_assert!(buffer.iter().all(|s| s.is_finite()));
    }

    /// The neutral snapshot is an exact identity for any stream shape.
    #[test]
    fn neutral_engine_is_identity(
        input in prop::collection::vec(-1.0f32..=1.0f32, 1..2048),
        channels in 1usize..=8,
        sample_rate in prop::sample::select(vec![8000.0f64, 44100.0, 48000.0, 96000.0, 384000.0]),
    ) {
        let mut engine = Engine::new(EngineConfig::new(sample_rate, 128, channels)).unwrap();
        let mut buffer = input.clone();
        engine.process(&mut buffer, channels);
        prop_assert_eq!(buffer, input);
    }

    /// Sanitizing is idempotent and always yields finite, in-range fields.
    #[test]
    fn sanitized_is_closed(
        raw in prop::collection::vec(prop::num::f32::ANY, FIELD_COUNT),
        flags in prop::collection::vec(any::<bool>(), TRACK_COUNT + 1),
    ) {
        // Feed raw values straight through the normalized builder's slots.
        let d = ParameterSnapshot::default().fields();
        let t: Vec<f32> = raw
            .iter()
            .zip(d.iter())
            .map(|(r, (desc, _))| (r - desc.min) / (desc.max - desc.min))
            .collect();
        let clean = snapshot_from(&t, &flags).sanitized();
        for (desc, value) in clean.fields() {
            prop_assert!(value.is_finite());
            prop_assert!(value >= desc.min && value <= desc.max, "{} = {}", desc.id, value);
        }
        prop_assert_eq!(clean, clean.sanitized());
    }
}
