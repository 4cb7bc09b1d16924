use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, OnceLock,
    },
};

use parking_lot::{Condvar, Mutex};

use crate::spatial::{database::HrtfDatabase, pool::LoaderPool, BusLoader};

/*
Asynchronous HRTF Loading
=========================

Building a database takes a few hundred milliseconds of FFT work, far too
long for an audio callback. The loader runs it as one job on a LoaderPool
and publishes the result for lock-free reads:

  control thread             worker                   render thread
  --------------             ------                   -------------
  start_loading ──spawn──>   HrtfDatabase::new
                             slot.set(db)
                             state = Loaded  ───────> is_loaded()  (atomic)
                             notify waiters           database()   (no lock)

States
------

    NotStarted --load_asynchronously--> Loading --+--> Loaded
                                                  +--> Failed

Only the first `load_asynchronously` moves NotStarted to Loading; later
calls do nothing. Loaded and Failed are terminal. A failed load is logged
and never retried; create a new loader to try again.

The job holds a strong reference to the loader, so the loader outlives
any work in flight even when every caller handle is dropped.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoaderState {
    NotStarted = 0,
    Loading = 1,
    Loaded = 2,
    Failed = 3,
}

impl LoaderState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::Loading,
            2 => Self::Loaded,
            _ => Self::Failed,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Loaded | Self::Failed)
    }
}

pub struct HrtfDatabaseLoader {
    state: AtomicU8,
    database: OnceLock<HrtfDatabase>,
    sample_rate: f32,
    bus_loader: Arc<dyn BusLoader>,

    // Completion flag for blocking waiters
    finished: Mutex<bool>,
    finished_cv: Condvar,
}

impl HrtfDatabaseLoader {
    /// Loader that has not started any work yet.
    pub fn new(sample_rate: f32, bus_loader: Arc<dyn BusLoader>) -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU8::new(LoaderState::NotStarted as u8),
            database: OnceLock::new(),
            sample_rate,
            bus_loader,
            finished: Mutex::new(false),
            finished_cv: Condvar::new(),
        })
    }

    /// Create a loader and immediately submit its construction job.
    pub fn start_loading(
        pool: &LoaderPool,
        sample_rate: f32,
        bus_loader: Arc<dyn BusLoader>,
    ) -> Arc<Self> {
        let loader = Self::new(sample_rate, bus_loader);
        loader.load_asynchronously(pool);
        loader
    }

    /// Submit the construction job unless one was already submitted.
    pub fn load_asynchronously(self: &Arc<Self>, pool: &LoaderPool) {
        let claimed = self.state.compare_exchange(
            LoaderState::NotStarted as u8,
            LoaderState::Loading as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if claimed.is_err() {
            return;
        }

        let loader = Arc::clone(self);
        pool.spawn(move || loader.run());
    }

    fn run(&self) {
        log::info!("loading HRTF database at {} Hz", self.sample_rate);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            HrtfDatabase::new(self.sample_rate, self.bus_loader.as_ref())
        }));

        let state = match result {
            Ok(Ok(database)) => {
                // The slot is written once, before anyone can see Loaded
                if self.database.set(database).is_ok() {
                    log::info!("HRTF database loaded at {} Hz", self.sample_rate);
                    LoaderState::Loaded
                } else {
                    LoaderState::Failed
                }
            }
            Ok(Err(err)) => {
                log::error!("HRTF database not loaded: {err}");
                LoaderState::Failed
            }
            Err(_) => {
                log::error!("HRTF database not loaded: bus loader panicked");
                LoaderState::Failed
            }
        };
        self.state.store(state as u8, Ordering::Release);

        let mut finished = self.finished.lock();
        *finished = true;
        self.finished_cv.notify_all();
    }

    /// True once the database is available. Never blocks.
    pub fn is_loaded(&self) -> bool {
        self.state() == LoaderState::Loaded
    }

    /// Block until the construction job has finished, successfully or not.
    ///
    /// Returns immediately if loading never started or already finished.
    /// Not for the render thread.
    pub fn wait_until_loaded(&self) {
        let state = self.state();
        if state == LoaderState::NotStarted || state.is_terminal() {
            return;
        }

        let mut finished = self.finished.lock();
        while !*finished {
            self.finished_cv.wait(&mut finished);
        }
    }

    /// The database, once loaded.
    pub fn database(&self) -> Option<&HrtfDatabase> {
        if self.is_loaded() {
            self.database.get()
        } else {
            None
        }
    }

    pub fn database_sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn state(&self) -> LoaderState {
        LoaderState::from_u8(self.state.load(Ordering::Acquire))
    }
}
