//! Head-related transfer function (HRTF) kernels for binaural panning.
//!
//! [`HrtfDatabase`] turns a measured impulse-response set into convolution
//! kernels for every supported direction. Building it takes long enough that
//! it is done off the audio thread by an [`HrtfDatabaseLoader`] on a shared
//! [`LoaderPool`]; the render side only ever polls `is_loaded()` and borrows
//! the finished database.

pub mod database;
pub mod elevation;
pub mod kernel;
pub mod loader;
pub mod pool;

pub use database::{fft_size_for_sample_rate, HrtfDatabase};
pub use elevation::{HrtfElevation, KernelLookup};
pub use kernel::HrtfKernel;
pub use loader::{HrtfDatabaseLoader, LoaderState};
pub use pool::LoaderPool;

use crate::io::AudioBus;

/// Resolves an impulse-response asset name to audio.
///
/// Returns `None` when the asset is missing or unreadable; the database
/// treats that as fatal.
pub trait BusLoader: Send + Sync {
    fn load_bus(&self, path: &str) -> Option<AudioBus>;
}

impl<F> BusLoader for F
where
    F: Fn(&str) -> Option<AudioBus> + Send + Sync,
{
    fn load_bus(&self, path: &str) -> Option<AudioBus> {
        self(path)
    }
}
