//! Benchmarks for HRTF kernel construction and lookup.

use std::hint::black_box;

use blocksound::{
    io::AudioBus,
    spatial::{kernel::KernelFft, HrtfDatabase, HrtfKernel},
};
use criterion::Criterion;

fn impulse_loader(path: &str) -> Option<AudioBus> {
    let azimuth: usize = path.get(23..26)?.parse().ok()?;
    let mut left = vec![0.0; 512];
    let mut right = vec![0.0; 512];
    left[24 + azimuth / 15] = 1.0;
    right[24] = 1.0;
    Some(AudioBus::from_channels(vec![left, right], 44_100.0))
}

pub fn bench_spatial(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/spatial");

    let fft = KernelFft::new(512);
    let mut impulse = vec![0.0f32; 512];
    impulse[30] = 1.0;
    group.bench_function("kernel_from_impulse", |b| {
        b.iter(|| HrtfKernel::from_impulse(black_box(&impulse), 44_100.0, &fft))
    });

    let database = HrtfDatabase::new(44_100.0, &impulse_loader).expect("synthetic set loads");
    group.bench_function("lookup", |b| {
        let mut index = 0;
        b.iter(|| {
            index = (index + 1) % HrtfDatabase::number_of_azimuths();
            let lookup = database.lookup(black_box(0.3), index, black_box(20.0));
            black_box(lookup.map(|k| k.frame_delay_l))
        })
    });

    group.finish();
}
