//! Schedulable source nodes.
//!
//! Every node pairs a [`RenderBlockScheduler`](crate::engine::RenderBlockScheduler)
//! with a generator. The scheduler decides which frames of a block sound;
//! the generator fills them.

/// Caller-supplied generator callback.
pub mod function;
/// Core traits shared by all source nodes.
pub mod node;
/// White, pink and brown noise sources.
pub mod noise;
/// Periodic waveform sources.
pub mod oscillator;
/// Name-based node construction.
pub mod registry;
/// Enumerated node settings with validated values.
pub mod setting;
/// Scheduler + generator composition.
pub mod source;

pub use function::{FunctionGenerator, FunctionNode, SourceFn};
pub use node::{RenderCtx, SourceNode};
pub use noise::{NoiseGenerator, NoiseNode};
pub use oscillator::{OscillatorGenerator, OscillatorNode};
pub use registry::NodeRegistry;
pub use setting::EnumSetting;
pub use source::{Generator, ScheduledSource};
