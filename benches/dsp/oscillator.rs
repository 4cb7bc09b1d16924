//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use blocksound::dsp::oscillator::{OscillatorBlock, OscillatorParams, OscillatorType};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let params = OscillatorParams::default();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Sine - sin() per sample
        let mut osc = OscillatorBlock::new();
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), OscillatorType::Sine, &params, 48_000.0);
            })
        });

        // FastSine - polynomial approximation
        let mut osc = OscillatorBlock::new();
        group.bench_with_input(BenchmarkId::new("fast_sine", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), OscillatorType::FastSine, &params, 48_000.0);
            })
        });

        // Square - branch per sample
        let mut osc = OscillatorBlock::new();
        group.bench_with_input(BenchmarkId::new("square", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), OscillatorType::Square, &params, 48_000.0);
            })
        });

        let mut osc = OscillatorBlock::new();
        group.bench_with_input(BenchmarkId::new("triangle", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), OscillatorType::Triangle, &params, 48_000.0);
            })
        });
    }

    group.finish();
}
