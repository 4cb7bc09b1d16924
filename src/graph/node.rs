use crate::{engine::RenderBlockScheduler, io::AudioBus};

/// Context passed to source nodes during rendering
///
/// Holding a `&RenderCtx` is what marks a call as happening on the render
/// thread. It contains:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - current_frame: Render clock position of the block's first frame
/// - frames: Number of frames in this block
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub current_frame: u64,
    pub frames: usize,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, current_frame: u64, frames: usize) -> Self {
        Self {
            sample_rate,
            current_frame,
            frames,
        }
    }

    /// Block start on the render clock, in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_frame as f64 / self.sample_rate as f64
    }

    /// Context for the block that follows this one.
    pub fn next_block(&self) -> Self {
        Self {
            current_frame: self.current_frame + self.frames as u64,
            ..*self
        }
    }
}

/// Core trait for schedulable generators
///
/// Every source renders into a bus owned by its output slot, honouring the
/// sample-accurate range its scheduler computes for the block.
pub trait SourceNode: Send {
    /// Render one block. Frames outside the scheduled range are zeroed.
    fn process(&mut self, ctx: &RenderCtx, out: &mut AudioBus);

    /// Clear generator state (filter history, phase, PRNG) and the schedule.
    fn reset(&mut self, ctx: &RenderCtx);

    /// True when the node cannot contribute sound at `now`, letting the
    /// graph skip it.
    fn propagates_silence(&self, _now: f64) -> bool {
        let scheduler = self.scheduler();
        !scheduler.is_playing_or_scheduled() || scheduler.has_finished()
    }

    /// Apply schedule requests queued from other threads.
    ///
    /// Default implementation does nothing (no queue attached).
    fn apply_pending(&mut self) {}

    fn scheduler(&self) -> &RenderBlockScheduler;

    fn scheduler_mut(&mut self) -> &mut RenderBlockScheduler;

    /// Channels this node expects in its output bus.
    fn output_channels(&self) -> usize;
}

/// Allow boxed nodes to be used as nodes (for dynamic dispatch)
impl SourceNode for Box<dyn SourceNode> {
    fn process(&mut self, ctx: &RenderCtx, out: &mut AudioBus) {
        (**self).process(ctx, out)
    }

    fn reset(&mut self, ctx: &RenderCtx) {
        (**self).reset(ctx)
    }

    fn propagates_silence(&self, now: f64) -> bool {
        (**self).propagates_silence(now)
    }

    fn apply_pending(&mut self) {
        (**self).apply_pending()
    }

    fn scheduler(&self) -> &RenderBlockScheduler {
        (**self).scheduler()
    }

    fn scheduler_mut(&mut self) -> &mut RenderBlockScheduler {
        (**self).scheduler_mut()
    }

    fn output_channels(&self) -> usize {
        (**self).output_channels()
    }
}
