#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, MAX_BLOCK_SIZE, RENDER_QUANTUM};

/// Runtime settings for a render engine instance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Frames per render block. Must not exceed [`MAX_BLOCK_SIZE`].
    pub block_size: usize,
    /// Worker threads used for HRTF database construction.
    pub loader_threads: usize,
    /// Slots in each source's off-thread schedule queue.
    pub schedule_queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: RENDER_QUANTUM,
            loader_threads: 1,
            schedule_queue_capacity: 64,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::BlockSize {
                size: self.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        if self.loader_threads == 0 {
            return Err(ConfigError::LoaderThreads);
        }
        if self.schedule_queue_capacity == 0 {
            return Err(ConfigError::QueueCapacity);
        }
        Ok(())
    }

    /// Duration of one block in seconds.
    pub fn block_duration(&self) -> f64 {
        self.block_size as f64 / self.sample_rate as f64
    }
}
