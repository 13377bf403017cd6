//! Criterion benchmarks for cassette-core kernels
//!
//! Run with: cargo bench -p cassette-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use cassette_core::{
    Biquad, Coefficients, EnvelopeFollower, FractionalDelay, Lfo, OnePole, Rng, TiltedNoise,
    one_pole::lowpass_coefficient, peaking,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_biquad(c: &mut Criterion) {
    let mut group = c.benchmark_group("Biquad");
    let coeffs = peaking(SAMPLE_RATE, 80.0, 3.0, 0.9);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        group.bench_with_input(
            BenchmarkId::new("process", block_size),
            &block_size,
            |b, _| {
                let mut biquad = Biquad::with_coefficients(coeffs);
                b.iter(|| {
                    for &sample in &input {
                        black_box(biquad.process(black_box(sample)));
                    }
                });
            },
        );
    }

    group.bench_function("peaking_design", |b| {
        b.iter(|| {
            black_box(peaking(
                black_box(SAMPLE_RATE),
                black_box(80.0),
                black_box(3.0),
                black_box(0.9),
            ))
        });
    });

    group.bench_function("coefficient_approach", |b| {
        let mut current = Coefficients::IDENTITY;
        b.iter(|| {
            current.approach(black_box(&coeffs), black_box(0.001));
            black_box(current)
        });
    });

    group.finish();
}

fn bench_one_pole_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("OnePoleCascade");
    let g = lowpass_coefficient(12000.0, SAMPLE_RATE);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        group.bench_with_input(
            BenchmarkId::new("process", block_size),
            &block_size,
            |b, _| {
                let mut first = OnePole::new(g);
                let mut second = OnePole::new(g);
                b.iter(|| {
                    for &sample in &input {
                        black_box(second.process(first.process(black_box(sample))));
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_modulated_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("ModulatedDelay");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        group.bench_with_input(
            BenchmarkId::new("process", block_size),
            &block_size,
            |b, _| {
                let mut lfo = Lfo::new(SAMPLE_RATE, 0.6);
                let mut delay = FractionalDelay::new(1024);
                b.iter(|| {
                    for &sample in &input {
                        let d = 240.0 * (1.0 + lfo.next());
                        black_box(delay.process(black_box(sample), d));
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_noise_and_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("NoiseEnvelope");
    let block_size = 512;
    let input = generate_test_signal(block_size);

    group.bench_function("tilted_noise_512", |b| {
        let mut rng = Rng::new(1);
        let mut shaper = TiltedNoise::new();
        shaper.set_tilt(0.3);
        b.iter(|| {
            for _ in 0..block_size {
                black_box(shaper.process(rng.white()));
            }
        });
    });

    group.bench_function("envelope_512", |b| {
        let mut env = EnvelopeFollower::new(SAMPLE_RATE);
        b.iter(|| {
            for &sample in &input {
                black_box(env.process(black_box(sample)));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_biquad,
    bench_one_pole_cascade,
    bench_modulated_delay,
    bench_noise_and_envelope
);
criterion_main!(benches);
