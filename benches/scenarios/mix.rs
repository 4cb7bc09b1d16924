//! Benchmarks for mixing scheduled sources.
//!
//! Sources start mid-block so the sample-accurate offset path is exercised
//! on the first block, then run steadily.

use std::hint::black_box;

use blocksound::{
    engine::SourceMixer,
    graph::{NoiseNode, OscillatorNode, SourceNode},
    io::AudioBus,
};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

fn mixer_with(size: usize, sources: Vec<Box<dyn SourceNode>>) -> SourceMixer {
    let mut mixer = SourceMixer::new(SAMPLE_RATE, size);
    for source in sources {
        mixer.add_source(source);
    }
    mixer
}

fn started<N: SourceNode + 'static>(mut node: N, when: f64) -> Box<dyn SourceNode> {
    node.scheduler_mut()
        .start(when)
        .expect("fresh node accepts start");
    Box::new(node)
}

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    for &size in BLOCK_SIZES {
        let mut out = AudioBus::new(2, size, SAMPLE_RATE);

        // === NOISE: white + pink + brown ===
        let mut noise = mixer_with(
            size,
            vec![
                started(NoiseNode::white(), 0.0),
                started(NoiseNode::pink(), 0.0005),
                started(NoiseNode::brown(), 0.001),
            ],
        );
        group.bench_with_input(BenchmarkId::new("3_noise", size), &size, |b, _| {
            b.iter(|| noise.process_block(black_box(&mut out)))
        });

        // === DENSE: 16 oscillators, half of them silent ===
        let sources = (0..16)
            .map(|i| {
                let osc = OscillatorNode::sine().with_frequency(110.0 * (i + 1) as f32);
                if i % 2 == 0 {
                    started(osc, 0.0)
                } else {
                    Box::new(osc) as Box<dyn SourceNode>
                }
            })
            .collect();
        let mut dense = mixer_with(size, sources);
        group.bench_with_input(BenchmarkId::new("16_osc_sparse", size), &size, |b, _| {
            b.iter(|| dense.process_block(black_box(&mut out)))
        });
    }

    group.finish();
}
