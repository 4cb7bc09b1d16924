//! Benchmarks for scheduled-source and spatial scenarios.

mod mix;
mod spatial;

pub use mix::bench_mix;
pub use spatial::bench_spatial;
