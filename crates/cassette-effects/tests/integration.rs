//! Statistical and cross-stage behavior over long runs.

use cassette_core::{TapeModule, rms_to_dbfs};
use cassette_effects::{Crosstalk, Dropouts, HfLoss, Hiss, Meters, Saturation};

fn rms(samples: impl Iterator<Item = f32>) -> f32 {
    let (sum, n) = samples.fold((0.0f64, 0usize), |(s, n), x| {
        (s + f64::from(x) * f64::from(x), n + 1)
    });
    (sum / n as f64).sqrt() as f32
}

#[test]
fn dropout_count_converges_to_rate() {
    let mut d = Dropouts::new();
    d.set_seed(2024);
    d.set_event_length(Some(1));
    d.set_rate_per_min(60.0);
    d.prepare(1000.0, 1);

    let mut block = vec![1.0f32; 1000];
    for _ in 0..1000 {
        block.fill(1.0);
        d.process_interleaved(&mut block, 1);
    }
    let count = d.dropout_count();
    assert!((900..=1100).contains(&count), "{count} dropouts, expected ~1000");
}

#[test]
fn dropout_envelope_leaves_most_time_idle() {
    let mut d = Dropouts::new();
    d.set_seed(99);
    d.set_rate_per_min(60.0);
    d.prepare(1000.0, 2);

    let mut block = vec![1.0f32; 2000];
    let mut dipped = 0usize;
    for _ in 0..1000 {
        block.fill(1.0);
        d.process_interleaved(&mut block, 2);
        dipped += block.chunks(2).filter(|f| f[0] < 1.0).count();
    }
    let count = d.dropout_count();
    assert!((800..=1200).contains(&count), "{count} dropouts");
    // Each event dips for roughly 4 + 20 + 10 ms.
    let per_event = dipped as f32 / count as f32;
    assert!((20.0..50.0).contains(&per_event), "{per_event} samples per event");
}

#[test]
fn hiss_level_matches_setting_over_blocks() {
    let mut hiss = Hiss::with_seed(5);
    hiss.set_level_dbfs(-60.0);
    hiss.prepare(48000.0, 2);
    let mut meters = Meters::new();
    meters.prepare(48000.0, 2);

    let mut block = vec![0.0f32; 2 * 480];
    for _ in 0..200 {
        block.fill(0.0);
        hiss.process_interleaved(&mut block, 2);
        meters.process_interleaved(&mut block, 2);
    }
    let mut levels = [0.0f32; 2];
    assert_eq!(meters.read_rms_db(&mut levels), 2);
    for level in levels {
        assert!((level + 60.0).abs() < 1.0, "hiss at {level} dBFS");
    }
}

#[test]
fn hf_loss_attenuates_treble_more_than_bass() {
    let sr = 48000.0;
    let tone = |freq: f32| -> Vec<f32> {
        (0..48000)
            .map(|i| (std::f32::consts::TAU * freq * i as f32 / sr).sin() * 0.5)
            .collect()
    };
    let mut lpf = HfLoss::new();
    lpf.set_cutoff_hz(3000.0);
    lpf.prepare(sr, 1);

    let mut low = tone(200.0);
    lpf.process_interleaved(&mut low, 1);
    lpf.reset();
    let mut high = tone(12000.0);
    lpf.process_interleaved(&mut high, 1);

    let low_db = rms_to_dbfs(rms(low[24000..].iter().copied()));
    let high_db = rms_to_dbfs(rms(high[24000..].iter().copied()));
    assert!(low_db - high_db > 12.0, "low {low_db} dB, high {high_db} dB");
}

#[test]
fn crosstalk_bleed_level() {
    let mut xt = Crosstalk::new();
    xt.set_amount_db(-20.0);
    xt.prepare(48000.0, 2);
    let mut block: Vec<f32> = (0..4800)
        .flat_map(|i| [(i as f32 * 0.05).sin() * 0.5, 0.0])
        .collect();
    xt.process_interleaved(&mut block, 2);
    let left = rms(block[200..].iter().step_by(2).copied());
    let right = rms(block[201..].iter().step_by(2).copied());
    let ratio_db = 20.0 * (right / left).log10();
    assert!((ratio_db + 20.0).abs() < 0.1, "bleed {ratio_db} dB");
}

#[test]
fn saturation_keeps_quiet_signals_near_unity() {
    let mut sat = Saturation::new();
    sat.set_drive_db(-6.0);
    sat.prepare(48000.0, 1);
    let input: Vec<f32> = (0..4800).map(|i| (i as f32 * 0.01).sin() * 0.01).collect();
    let mut out = input.clone();
    sat.process_interleaved(&mut out, 1);
    let in_db = rms_to_dbfs(rms(input[480..].iter().copied()));
    let out_db = rms_to_dbfs(rms(out[480..].iter().copied()));
    assert!((out_db - in_db).abs() < 1.5, "quiet gain {} dB", out_db - in_db);
}
