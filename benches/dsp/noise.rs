//! Benchmarks for the three noise colours.

use std::hint::black_box;

use blocksound::dsp::noise::{NoiseBlock, NoiseType};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, kind) in [
            ("white", NoiseType::White),
            ("pink", NoiseType::Pink),
            ("brown", NoiseType::Brown),
        ] {
            let mut noise = NoiseBlock::new();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    noise.render(black_box(&mut buffer), black_box(kind));
                })
            });
        }
    }

    group.finish();
}
