use crate::{
    graph::node::{RenderCtx, SourceNode},
    io::AudioBus,
    MAX_BLOCK_SIZE,
};

/// Index of a source inside a [`SourceMixer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceId(pub usize);

struct Slot {
    node: Box<dyn SourceNode>,
    scratch: AudioBus,
}

/// Drives a set of source nodes on one render clock and sums them.
///
/// Each source renders into its own scratch bus, sized when the source is
/// added, so rendering neither allocates nor frees. Sources that
/// report `propagates_silence` are skipped for the block.
pub struct SourceMixer {
    slots: Vec<Slot>,
    sample_rate: f32,
    max_frames: usize,
    current_frame: u64,
}

impl SourceMixer {
    pub fn new(sample_rate: f32, max_frames: usize) -> Self {
        Self {
            slots: Vec::new(),
            sample_rate,
            max_frames: max_frames.clamp(1, MAX_BLOCK_SIZE),
            current_frame: 0,
        }
    }

    /// Mixer sized from an engine configuration.
    pub fn from_config(config: &crate::EngineConfig) -> Self {
        Self::new(config.sample_rate, config.block_size)
    }

    /// Take ownership of `node`. Call off the render thread.
    pub fn add_source(&mut self, node: Box<dyn SourceNode>) -> SourceId {
        let channels = node.output_channels().max(1);
        self.slots.push(Slot {
            node,
            scratch: AudioBus::new(channels, self.max_frames, self.sample_rate),
        });
        SourceId(self.slots.len() - 1)
    }

    pub fn source(&self, id: SourceId) -> Option<&dyn SourceNode> {
        self.slots.get(id.0).map(|slot| slot.node.as_ref())
    }

    pub fn source_mut(&mut self, id: SourceId) -> Option<&mut Box<dyn SourceNode>> {
        self.slots.get_mut(id.0).map(|slot| &mut slot.node)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop sources that have played to completion. Invalidates
    /// [`SourceId`]s; call off the render thread.
    pub fn remove_finished(&mut self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|slot| !slot.node.scheduler().has_finished());
        before - self.slots.len()
    }

    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    /// Render clock position in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_frame as f64 / self.sample_rate as f64
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Render one block into `out` and advance the clock by its length.
    ///
    /// Blocks longer than the mixer's maximum are truncated to it.
    pub fn process_block(&mut self, out: &mut AudioBus) {
        let frames = out.length();
        self.process_frames(out, frames);
    }

    /// Render the first `frames` frames of `out`; the rest is zeroed.
    pub fn process_frames(&mut self, out: &mut AudioBus, frames: usize) {
        let frames = frames.min(out.length()).min(self.max_frames);
        let ctx = RenderCtx::new(self.sample_rate, self.current_frame, frames);
        let now = ctx.current_time();

        out.zero();
        for slot in &mut self.slots {
            // Queued requests may wake a silent source, so apply them first
            slot.node.apply_pending();
            if slot.node.propagates_silence(now) {
                continue;
            }

            slot.node.process(&ctx, &mut slot.scratch);
            out.sum_from(&slot.scratch);
        }

        self.current_frame += frames as u64;
    }

    /// Reset every source and rewind the clock to zero.
    pub fn reset(&mut self) {
        let ctx = RenderCtx::new(self.sample_rate, 0, self.max_frames);
        for slot in &mut self.slots {
            slot.node.reset(&ctx);
            slot.scratch.zero();
        }
        self.current_frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FunctionNode, NoiseNode};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn constant(value: f32) -> FunctionNode {
        FunctionNode::from_fn(1, move |_, dest| dest.fill(value))
    }

    #[test]
    fn sums_playing_sources() {
        let mut mixer = SourceMixer::new(SAMPLE_RATE, 64);
        let mut a = constant(0.25);
        let mut b = constant(0.5);
        a.start(0.0).unwrap();
        b.start(0.0).unwrap();
        mixer.add_source(Box::new(a));
        mixer.add_source(Box::new(b));

        let mut out = AudioBus::new(1, 64, SAMPLE_RATE);
        mixer.process_block(&mut out);
        assert!(out.channel(0).unwrap().iter().all(|s| *s == 0.75));
        assert_eq!(mixer.current_frame(), 64);
    }

    #[test]
    fn unscheduled_sources_are_skipped() {
        let mut mixer = SourceMixer::new(SAMPLE_RATE, 32);
        mixer.add_source(Box::new(NoiseNode::white()));

        let mut out = AudioBus::new(2, 32, SAMPLE_RATE);
        mixer.process_block(&mut out);
        assert!(out.is_silent());
        assert!(out.channel(1).unwrap().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn source_starting_in_second_block() {
        let mut mixer = SourceMixer::new(SAMPLE_RATE, 32);
        let mut node = constant(1.0);
        node.start(40.0 / SAMPLE_RATE as f64).unwrap();
        let id = mixer.add_source(Box::new(node));

        let mut out = AudioBus::new(1, 32, SAMPLE_RATE);
        mixer.process_block(&mut out);
        assert!(out.channel(0).unwrap().iter().all(|s| *s == 0.0));

        mixer.process_block(&mut out);
        let samples = out.channel(0).unwrap();
        assert!(samples[..8].iter().all(|s| *s == 0.0));
        assert!(samples[8..].iter().all(|s| *s == 1.0));

        let elapsed = mixer.source(id).unwrap().scheduler().elapsed();
        assert!((elapsed - 32.0 / SAMPLE_RATE as f64).abs() < 1e-12);
    }

    #[test]
    fn partial_blocks_advance_by_frames_rendered() {
        let mut mixer = SourceMixer::new(SAMPLE_RATE, 32);
        let mut node = constant(1.0);
        node.start(0.0).unwrap();
        mixer.add_source(Box::new(node));

        let mut out = AudioBus::new(1, 32, SAMPLE_RATE);
        mixer.process_frames(&mut out, 20);
        let samples = out.channel(0).unwrap();
        assert!(samples[..20].iter().all(|s| *s == 1.0));
        assert!(samples[20..].iter().all(|s| *s == 0.0));
        assert_eq!(mixer.current_frame(), 20);
    }

    #[test]
    fn finished_sources_can_be_removed() {
        let mut mixer = SourceMixer::new(SAMPLE_RATE, 16);
        let mut node = constant(1.0);
        node.start_for(0.0, 8.0 / SAMPLE_RATE as f64).unwrap();
        mixer.add_source(Box::new(node));

        let mut out = AudioBus::new(1, 16, SAMPLE_RATE);
        mixer.process_block(&mut out);
        assert_eq!(mixer.remove_finished(), 1);
        assert!(mixer.is_empty());
    }
}
