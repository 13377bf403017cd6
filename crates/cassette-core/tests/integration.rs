//! Integration tests for cassette-core kernels.
//!
//! Verifies DSP accuracy with signal-level measurements: sine analysis for
//! the RBJ designs, cascaded one-pole rolloff, LFO-modulated delay pitch
//! behaviour and seeded noise reproducibility.

use cassette_core::{
    Biquad, FractionalDelay, Lfo, OnePole, Rng, TiltedNoise, high_shelf, low_shelf,
    one_pole::lowpass_coefficient, peaking,
};

const SAMPLE_RATE: f32 = 48000.0;
const TAU: f32 = core::f32::consts::TAU;

fn generate_sine(freq_hz: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|n| libm::sinf(TAU * freq_hz * n as f32 / sample_rate))
        .collect()
}

fn rms(signal: &[f32]) -> f32 {
    let sum_sq: f32 = signal.iter().map(|&s| s * s).sum();
    libm::sqrtf(sum_sq / signal.len() as f32)
}

fn to_db(linear: f32) -> f32 {
    20.0 * libm::log10f(linear.max(1e-10))
}

fn measure_biquad_response(biquad: &mut Biquad, freq_hz: f32) -> f32 {
    let num_samples = 24000;
    let settle_samples = 12000;
    let input = generate_sine(freq_hz, SAMPLE_RATE, num_samples);
    biquad.clear();
    let output: Vec<f32> = input.iter().map(|&s| biquad.process(s)).collect();
    to_db(rms(&output[settle_samples..]) / rms(&input[settle_samples..]))
}

// ============================================================================
// 1. Filter designs
// ============================================================================

#[test]
fn head_bump_peak_measured_gain() {
    let mut biquad = Biquad::with_coefficients(peaking(SAMPLE_RATE, 80.0, 4.0, 0.9));
    let at_center = measure_biquad_response(&mut biquad, 80.0);
    let at_mid = measure_biquad_response(&mut biquad, 2000.0);
    assert!((at_center - 4.0).abs() < 0.3, "center {at_center} dB");
    assert!(at_mid.abs() < 0.3, "mid {at_mid} dB");
}

#[test]
fn shelves_match_analytic_response() {
    let low = low_shelf(SAMPLE_RATE, 120.0, -6.0, 1.0);
    let mut biquad = Biquad::with_coefficients(low);
    let measured = measure_biquad_response(&mut biquad, 40.0);
    let predicted = low.response_db(40.0, SAMPLE_RATE);
    assert!((measured - predicted).abs() < 0.3, "{measured} vs {predicted}");

    let high = high_shelf(SAMPLE_RATE, 6000.0, 6.0, 1.0);
    let mut biquad = Biquad::with_coefficients(high);
    let measured = measure_biquad_response(&mut biquad, 12000.0);
    let predicted = high.response_db(12000.0, SAMPLE_RATE);
    assert!((measured - predicted).abs() < 0.3, "{measured} vs {predicted}");
}

// ============================================================================
// 2. Cascaded one-pole rolloff
// ============================================================================

#[test]
fn cascaded_one_pole_steeper_than_single() {
    let g = lowpass_coefficient(2000.0, SAMPLE_RATE);
    let input = generate_sine(10000.0, SAMPLE_RATE, 9600);

    let mut single = OnePole::new(g);
    let one: Vec<f32> = input.iter().map(|&x| single.process(x)).collect();

    let mut a = OnePole::new(g);
    let mut b = OnePole::new(g);
    let two: Vec<f32> = input.iter().map(|&x| b.process(a.process(x))).collect();

    let single_db = to_db(rms(&one[4800..]) / rms(&input[4800..]));
    let double_db = to_db(rms(&two[4800..]) / rms(&input[4800..]));
    assert!(double_db < single_db - 6.0, "{double_db} vs {single_db}");
}

// ============================================================================
// 3. Modulated delay
// ============================================================================

#[test]
fn lfo_modulated_delay_stays_bounded_and_continuous() {
    let mut lfo = Lfo::new(SAMPLE_RATE, 0.5);
    let mut delay = FractionalDelay::new(2048);
    let input = generate_sine(440.0, SAMPLE_RATE, 48000);
    let max_delay = 480.0;

    let mut prev = 0.0f32;
    let mut max_jump = 0.0f32;
    for &x in &input {
        let d = max_delay * 0.5 * (1.0 + lfo.next());
        let y = delay.process(x * 0.5, d);
        assert!(y.abs() <= 0.5 + 1e-6);
        max_jump = max_jump.max((y - prev).abs());
        prev = y;
    }
    // A 440 Hz sine at 0.5 moves at most ~0.03 per sample; modulation must
    // not add steps beyond that by much.
    assert!(max_jump < 0.05, "max jump {max_jump}");
}

// ============================================================================
// 4. Noise
// ============================================================================

#[test]
fn seeded_noise_reproducible_across_instances() {
    let render = |seed: u64| -> Vec<f32> {
        let mut rng = Rng::new(seed);
        let mut shaper = TiltedNoise::new();
        shaper.set_tilt(0.4);
        (0..1024).map(|_| shaper.process(rng.white())).collect()
    };
    assert_eq!(render(3), render(3));
    assert_ne!(render(3), render(4));
}

#[test]
fn positive_tilt_brightens() {
    let mut rng = Rng::new(21);
    let mut shaper = TiltedNoise::new();
    shaper.set_tilt(0.8);
    let noise: Vec<f32> = (0..96000).map(|_| shaper.process(rng.white())).collect();

    // First difference emphasizes highs; compare against white reference.
    let diff_energy = |s: &[f32]| -> f32 { s.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum() };
    let mut rng = Rng::new(21);
    let white: Vec<f32> = (0..96000).map(|_| rng.white()).collect();
    assert!(diff_energy(&noise) > diff_energy(&white));
}
