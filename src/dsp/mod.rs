//! Low-level DSP primitives used by the source nodes.
//!
//! These components are allocation-free and realtime-safe. Their output is
//! bit-reproducible: given the same seed and parameters they produce the same
//! samples on every run.

/// White, pink and brown noise from a shared 31-bit LCG.
pub mod noise;
/// Phase-accumulating oscillator waveforms.
pub mod oscillator;

pub use noise::{NoiseBlock, NoiseType};
pub use oscillator::{OscillatorBlock, OscillatorParams, OscillatorType};
