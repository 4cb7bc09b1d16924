use crate::{
    engine::{RenderBlockScheduler, RenderRange},
    error::ScheduleError,
    graph::node::{RenderCtx, SourceNode},
    io::AudioBus,
};

/// The sound-producing half of a scheduled source.
///
/// `generate` only ever sees the frames the scheduler decided should sound;
/// everything else in the bus has already been zeroed.
pub trait Generator: Send {
    /// False when there is nothing to run (e.g. no user function set). The
    /// node then outputs silence.
    fn is_configured(&self) -> bool {
        true
    }

    fn generate(&mut self, ctx: &RenderCtx, range: RenderRange, out: &mut AudioBus);

    fn reset(&mut self);
}

/// A generator driven by a sample-accurate block scheduler.
pub struct ScheduledSource<G> {
    scheduler: RenderBlockScheduler,
    generator: G,
    channels: usize,
    initialized: bool,
}

impl<G: Generator> ScheduledSource<G> {
    pub fn new(generator: G, channels: usize) -> Self {
        Self {
            scheduler: RenderBlockScheduler::new(),
            generator,
            channels,
            initialized: true,
        }
    }

    /// Source whose schedule can also be driven from another thread through
    /// the returned sender.
    #[cfg(feature = "rtrb")]
    pub fn with_queue(
        generator: G,
        channels: usize,
        capacity: usize,
    ) -> (Self, crate::engine::ScheduleSender) {
        let (scheduler, tx) = RenderBlockScheduler::with_queue(capacity);
        let source = Self {
            scheduler,
            generator,
            channels,
            initialized: true,
        };
        (source, tx)
    }

    pub fn start(&mut self, when: f64) -> Result<(), ScheduleError> {
        self.scheduler.start(when)
    }

    pub fn start_for(&mut self, when: f64, duration: f64) -> Result<(), ScheduleError> {
        self.scheduler.start_for(when, duration)
    }

    pub fn stop(&mut self, when: f64) -> Result<(), ScheduleError> {
        self.scheduler.stop(when)
    }

    pub fn initialize(&mut self) {
        self.initialized = true;
    }

    /// An uninitialized source renders silence but keeps its schedule.
    pub fn uninitialize(&mut self) {
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }
}

impl<G: Generator> SourceNode for ScheduledSource<G> {
    fn process(&mut self, ctx: &RenderCtx, out: &mut AudioBus) {
        self.apply_pending();

        if !self.initialized || out.number_of_channels() == 0 || !self.generator.is_configured() {
            out.zero();
            return;
        }

        let frames = ctx.frames.min(out.length());
        let range = self
            .scheduler
            .compute_render_range(ctx.current_time(), frames, ctx.sample_rate);

        if range.is_silent() {
            out.zero();
            return;
        }

        // Silence leading up to the start, and trailing after the stop
        out.zero_range(0..range.offset);
        out.zero_range(range.end()..out.length());

        self.generator.generate(ctx, range, out);

        self.scheduler.advance(frames, ctx.sample_rate);
        out.clear_silent_flag();
    }

    fn reset(&mut self, _ctx: &RenderCtx) {
        self.generator.reset();
        self.scheduler.reset();
    }

    fn apply_pending(&mut self) {
        self.scheduler.apply_pending();
        if self.scheduler.take_reset_request() {
            self.generator.reset();
        }
    }

    fn scheduler(&self) -> &RenderBlockScheduler {
        &self.scheduler
    }

    fn scheduler_mut(&mut self) -> &mut RenderBlockScheduler {
        &mut self.scheduler
    }

    fn output_channels(&self) -> usize {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes 1.0 into every frame it is given.
    struct Ones {
        configured: bool,
        resets: usize,
    }

    impl Generator for Ones {
        fn is_configured(&self) -> bool {
            self.configured
        }

        fn generate(&mut self, _ctx: &RenderCtx, range: RenderRange, out: &mut AudioBus) {
            for channel in out.channels_mut() {
                channel[range.offset..range.end()].fill(1.0);
            }
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn ones() -> Ones {
        Ones {
            configured: true,
            resets: 0,
        }
    }

    const SAMPLE_RATE: f32 = 44_100.0;

    #[test]
    fn frames_outside_range_are_zeroed() {
        let mut source = ScheduledSource::new(ones(), 2);
        source.start(0.0005).unwrap();

        let mut bus = AudioBus::from_channels(vec![vec![9.0; 128]; 2], SAMPLE_RATE);
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, 128);
        source.process(&ctx, &mut bus);

        for ch in 0..2 {
            let data = bus.channel(ch).unwrap();
            assert!(data[..22].iter().all(|s| *s == 0.0));
            assert!(data[22..].iter().all(|s| *s == 1.0));
        }
        assert!(!bus.is_silent());
    }

    #[test]
    fn unconfigured_generator_outputs_silence() {
        let mut source = ScheduledSource::new(
            Ones {
                configured: false,
                resets: 0,
            },
            1,
        );
        source.start(0.0).unwrap();

        let mut bus = AudioBus::from_channels(vec![vec![9.0; 64]], SAMPLE_RATE);
        source.process(&RenderCtx::new(SAMPLE_RATE, 0, 64), &mut bus);

        assert!(bus.channel(0).unwrap().iter().all(|s| *s == 0.0));
        assert!(bus.is_silent());
        assert_eq!(source.scheduler().elapsed(), 0.0);
    }

    #[test]
    fn uninitialized_source_outputs_silence() {
        let mut source = ScheduledSource::new(ones(), 1);
        source.start(0.0).unwrap();
        source.uninitialize();

        let mut bus = AudioBus::from_channels(vec![vec![9.0; 64]], SAMPLE_RATE);
        source.process(&RenderCtx::new(SAMPLE_RATE, 0, 64), &mut bus);
        assert!(bus.channel(0).unwrap().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn elapsed_advances_only_when_sounding() {
        let mut source = ScheduledSource::new(ones(), 1);
        let mut bus = AudioBus::new(1, 128, SAMPLE_RATE);
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, 128);

        source.process(&ctx, &mut bus);
        assert_eq!(source.scheduler().elapsed(), 0.0);

        source.start(0.0).unwrap();
        source.process(&ctx.next_block(), &mut bus);
        assert!((source.scheduler().elapsed() - 128.0 / SAMPLE_RATE as f64).abs() < 1e-12);
    }

    #[test]
    fn propagates_silence_tracks_schedule() {
        let mut source = ScheduledSource::new(ones(), 1);
        assert!(source.propagates_silence(0.0));

        source.start_for(0.0, 0.001).unwrap();
        assert!(!source.propagates_silence(0.0));

        let mut bus = AudioBus::new(1, 128, SAMPLE_RATE);
        source.process(&RenderCtx::new(SAMPLE_RATE, 0, 128), &mut bus);
        assert!(source.propagates_silence(0.01));

        source.reset(&RenderCtx::new(SAMPLE_RATE, 128, 128));
        assert_eq!(source.generator().resets, 1);
        assert!(source.scheduler().start_time() == 0.0 && source.propagates_silence(0.0));
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn queued_reset_clears_generator() {
        let (mut source, mut tx) = ScheduledSource::with_queue(ones(), 1, 4);
        tx.start(0.0).unwrap();
        tx.reset().unwrap();
        source.apply_pending();
        assert_eq!(source.generator().resets, 1);
        assert!(source.propagates_silence(0.0));
    }
}
