use crate::{
    engine::RenderRange,
    graph::{
        node::RenderCtx,
        source::{Generator, ScheduledSource},
    },
    io::AudioBus,
};

/// Per-channel generator callback: `(channel_index, destination)`.
///
/// `destination` is exactly the scheduled run of frames for this block.
pub type SourceFn = Box<dyn FnMut(usize, &mut [f32]) + Send>;

/// Scheduled source that delegates sample generation to a user function,
/// called once per channel per block.
pub type FunctionNode = ScheduledSource<FunctionGenerator>;

#[derive(Default)]
pub struct FunctionGenerator {
    function: Option<SourceFn>,
}

impl FunctionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function<F>(function: F) -> Self
    where
        F: FnMut(usize, &mut [f32]) + Send + 'static,
    {
        Self {
            function: Some(Box::new(function)),
        }
    }
}

impl Generator for FunctionGenerator {
    fn is_configured(&self) -> bool {
        self.function.is_some()
    }

    fn generate(&mut self, _ctx: &RenderCtx, range: RenderRange, out: &mut AudioBus) {
        let Some(function) = self.function.as_mut() else {
            return;
        };
        for (index, channel) in out.channels_mut().enumerate() {
            function(index, &mut channel[range.offset..range.end()]);
        }
    }

    // The function owns its own state
    fn reset(&mut self) {}
}

impl FunctionNode {
    /// Function node with `channels` outputs and no function yet; it renders
    /// silence until [`set_function`](Self::set_function) is called.
    pub fn with_channels(channels: usize) -> Self {
        ScheduledSource::new(FunctionGenerator::new(), channels)
    }

    pub fn from_fn<F>(channels: usize, function: F) -> Self
    where
        F: FnMut(usize, &mut [f32]) + Send + 'static,
    {
        ScheduledSource::new(FunctionGenerator::with_function(function), channels)
    }

    /// Replace the function. Must be called where the node is owned (i.e.
    /// between blocks).
    pub fn set_function<F>(&mut self, function: F)
    where
        F: FnMut(usize, &mut [f32]) + Send + 'static,
    {
        self.generator_mut().function = Some(Box::new(function));
    }

    pub fn clear_function(&mut self) {
        self.generator_mut().function = None;
    }

    pub fn has_function(&self) -> bool {
        self.generator().function.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::SourceNode;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn no_function_means_silence() {
        let mut node = FunctionNode::with_channels(2);
        node.start(0.0).unwrap();

        let mut bus = AudioBus::from_channels(vec![vec![0.5; 32]; 2], SAMPLE_RATE);
        node.process(&RenderCtx::new(SAMPLE_RATE, 0, 32), &mut bus);
        assert!(bus.is_silent());
        assert!(bus.channel(1).unwrap().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn function_sees_channel_and_scheduled_frames() {
        let mut node = FunctionNode::from_fn(2, |channel, dest| {
            dest.fill(channel as f32 + 1.0);
        });
        node.start(8.0 / SAMPLE_RATE as f64).unwrap();

        let mut bus = AudioBus::new(2, 32, SAMPLE_RATE);
        node.process(&RenderCtx::new(SAMPLE_RATE, 0, 32), &mut bus);

        let left = bus.channel(0).unwrap();
        let right = bus.channel(1).unwrap();
        assert!(left[..8].iter().all(|s| *s == 0.0));
        assert!(left[8..].iter().all(|s| *s == 1.0));
        assert!(right[8..].iter().all(|s| *s == 2.0));
    }

    #[test]
    fn called_once_per_channel_per_block() {
        use std::sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        };

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut node = FunctionNode::from_fn(3, move |_, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        node.start(0.0).unwrap();

        let mut bus = AudioBus::new(3, 16, SAMPLE_RATE);
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, 16);
        node.process(&ctx, &mut bus);
        node.process(&ctx.next_block(), &mut bus);
        assert_eq!(calls.load(Ordering::Relaxed), 6);
    }
}
