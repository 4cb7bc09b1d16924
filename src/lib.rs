pub mod config;
pub mod dsp;
pub mod engine; // Block scheduling and cross-thread schedule requests
pub mod error;
pub mod graph; // Schedulable source nodes
pub mod io;
pub mod spatial; // HRTF database and its asynchronous loader

pub use config::EngineConfig;
pub use error::{ConfigError, ScheduleError, SettingError, SpatialError};

/// Largest block a render callback may ask for.
pub const MAX_BLOCK_SIZE: usize = 2048;
/// Default block size, in frames.
pub const RENDER_QUANTUM: usize = 128;
