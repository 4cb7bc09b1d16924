//! Error types shared across the crate.
//!
//! Render-path errors are `Copy` so they can be recorded on the audio thread
//! without allocating.

use thiserror::Error;

/// An enumerated setting was given a value outside its label table.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingError {
    #[error("value {value} out of range for setting `{setting}` ({count} options)")]
    OutOfRange {
        setting: &'static str,
        value: u32,
        count: u32,
    },

    #[error("unknown label for setting `{setting}`")]
    UnknownLabel { setting: &'static str },
}

/// A start/stop request that the scheduler refused.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ScheduleError {
    /// The node already played to completion; `reset` it first.
    #[error("source has already finished")]
    AlreadyFinished,

    /// Stop requested on a source that was never started.
    #[error("stop requested before start")]
    NotScheduled,

    /// Stop requested earlier than the start time.
    #[error("invalid schedule ordering: stop at {stop}s precedes start at {start}s")]
    InvalidOrdering { start: f64, stop: f64 },

    /// Times must be finite and non-negative.
    #[error("invalid schedule time {0}")]
    InvalidTime(f64),

    /// The request queue to the render thread is full.
    #[error("schedule queue is full")]
    QueueFull,
}

/// Failures while building or querying the HRTF database.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpatialError {
    /// The bus loader could not provide an impulse response.
    #[error("missing HRTF asset `{0}`")]
    MissingAsset(String),

    /// The asset loaded but cannot be used as a stereo impulse response.
    #[error("malformed HRTF asset `{path}`: {reason}")]
    MalformedAsset { path: String, reason: &'static str },

    /// Azimuth index beyond the database grid.
    #[error("azimuth index {index} out of range (0..{total})")]
    AzimuthOutOfRange { index: usize, total: usize },

    /// Elevation is not on the raw elevation grid.
    #[error("elevation {0} is not a supported grid elevation")]
    InvalidElevation(i32),

    /// The loader worker pool could not be created.
    #[error("failed to build loader pool: {0}")]
    Pool(String),
}

/// Invalid [`EngineConfig`](crate::EngineConfig) values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    SampleRate(f32),

    #[error("block size {size} must be within 1..={max}")]
    BlockSize { size: usize, max: usize },

    #[error("loader pool needs at least one thread")]
    LoaderThreads,

    #[error("schedule queue capacity must be non-zero")]
    QueueCapacity,
}
