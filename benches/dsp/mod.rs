//! Benchmarks for generator kernels.

mod noise;
mod oscillator;

pub use noise::bench_noise;
pub use oscillator::bench_oscillator;
