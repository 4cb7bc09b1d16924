//! Render-clock plumbing: per-node block scheduling, the request queue that
//! feeds it from other threads, and a minimal mixer that drives sources.

pub mod message;
pub mod mixer;
pub mod scheduler;

pub use message::{ScheduleReceiver, ScheduleRequest};
#[cfg(feature = "rtrb")]
pub use message::{schedule_queue, ScheduleSender};
pub use mixer::SourceMixer;
pub use scheduler::{RenderBlockScheduler, RenderRange, ScheduleState};
