use std::sync::Arc;

use crate::{error::SpatialError, EngineConfig};

/// Bounded worker pool for background construction jobs.
///
/// Cloning shares the same threads. Jobs never run on the caller's thread.
#[derive(Clone)]
pub struct LoaderPool {
    pool: Arc<rayon::ThreadPool>,
}

impl LoaderPool {
    pub fn new(threads: usize) -> Result<Self, SpatialError> {
        if threads == 0 {
            return Err(SpatialError::Pool("at least one thread is required".into()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("hrtf-loader-{i}"))
            .build()
            .map_err(|err| SpatialError::Pool(err.to_string()))?;

        log::debug!("loader pool started with {threads} thread(s)");
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, SpatialError> {
        Self::new(config.loader_threads)
    }

    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}
