use crate::{
    dsp::noise::{NoiseBlock, NoiseType},
    engine::RenderRange,
    error::SettingError,
    graph::{
        node::RenderCtx,
        setting::EnumSetting,
        source::{Generator, ScheduledSource},
    },
    io::AudioBus,
};

/// Scheduled white/pink/brown noise source.
///
/// One generator state per node. With several output channels the channels
/// are filled one after another from the same sequence, so channel 1
/// continues where channel 0 stopped.
pub type NoiseNode = ScheduledSource<NoiseGenerator>;

pub struct NoiseGenerator {
    noise_type: EnumSetting,
    block: NoiseBlock,
}

impl NoiseGenerator {
    pub fn new(kind: NoiseType) -> Self {
        Self::from_block(kind, NoiseBlock::new())
    }

    pub fn with_seed(kind: NoiseType, seed: u32) -> Self {
        Self::from_block(kind, NoiseBlock::with_seed(seed))
    }

    fn from_block(kind: NoiseType, block: NoiseBlock) -> Self {
        let mut noise_type = EnumSetting::new("type", "TYPE", NoiseType::LABELS);
        noise_type.set_index(kind.index());
        Self { noise_type, block }
    }

    pub fn noise_type(&self) -> NoiseType {
        NoiseType::try_from(self.noise_type.value_u32()).unwrap_or_default()
    }

    pub fn set_noise_type(&mut self, kind: NoiseType) {
        self.noise_type.set_index(kind.index());
    }

    /// Select the colour by setting index. Out-of-range indices are rejected
    /// and the current colour is kept.
    pub fn set_type_index(&mut self, index: u32) -> Result<(), SettingError> {
        self.noise_type.set_u32(index)
    }

    pub fn setting(&self) -> &EnumSetting {
        &self.noise_type
    }
}

impl Generator for NoiseGenerator {
    fn generate(&mut self, _ctx: &RenderCtx, range: RenderRange, out: &mut AudioBus) {
        let kind = self.noise_type();
        for channel in out.channels_mut() {
            self.block.render(&mut channel[range.offset..range.end()], kind);
        }
    }

    fn reset(&mut self) {
        self.block.reset();
    }
}

impl NoiseNode {
    /// Mono noise source of the given colour.
    pub fn with_type(kind: NoiseType) -> Self {
        ScheduledSource::new(NoiseGenerator::new(kind), 1)
    }

    pub fn white() -> Self {
        Self::with_type(NoiseType::White)
    }

    pub fn pink() -> Self {
        Self::with_type(NoiseType::Pink)
    }

    pub fn brown() -> Self {
        Self::with_type(NoiseType::Brown)
    }

    pub fn noise_type(&self) -> NoiseType {
        self.generator().noise_type()
    }

    pub fn set_type(&mut self, kind: NoiseType) {
        self.generator_mut().set_noise_type(kind);
    }

    pub fn set_type_index(&mut self, index: u32) -> Result<(), SettingError> {
        self.generator_mut().set_type_index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dsp::noise::WhiteNoise, graph::node::SourceNode};

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn renders_white_sequence_after_offset() {
        let mut node = NoiseNode::white();
        node.start(16.0 / SAMPLE_RATE as f64).unwrap();

        let mut bus = AudioBus::new(1, 64, SAMPLE_RATE);
        node.process(&RenderCtx::new(SAMPLE_RATE, 0, 64), &mut bus);

        let mut reference = WhiteNoise::new();
        let out = bus.channel(0).unwrap();
        assert!(out[..16].iter().all(|s| *s == 0.0));
        for sample in &out[16..] {
            assert_eq!(sample.to_bits(), reference.next_sample().to_bits());
        }
    }

    #[test]
    fn channels_share_one_sequence() {
        let mut node = ScheduledSource::new(NoiseGenerator::new(NoiseType::White), 2);
        node.start(0.0).unwrap();

        let mut bus = AudioBus::new(2, 8, SAMPLE_RATE);
        node.process(&RenderCtx::new(SAMPLE_RATE, 0, 8), &mut bus);

        let mut reference = [0.0f32; 16];
        WhiteNoise::new().render(&mut reference);
        assert_eq!(bus.channel(0).unwrap(), &reference[..8]);
        assert_eq!(bus.channel(1).unwrap(), &reference[8..]);
    }

    #[test]
    fn identically_seeded_nodes_match() {
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, 64);
        let render = |seed: u32| {
            let mut node = ScheduledSource::new(NoiseGenerator::with_seed(NoiseType::Pink, seed), 1);
            node.start(0.0).unwrap();
            let mut bus = AudioBus::new(1, 64, SAMPLE_RATE);
            node.process(&ctx, &mut bus);
            bus.channel(0).unwrap().to_vec()
        };

        assert_eq!(render(42), render(42));
        assert_ne!(render(42), render(43));
        assert_ne!(render(42), render(crate::dsp::noise::DEFAULT_SEED));
    }

    #[test]
    fn invalid_type_index_keeps_previous_type() {
        let mut node = NoiseNode::pink();
        assert!(node.set_type_index(7).is_err());
        assert_eq!(node.noise_type(), NoiseType::Pink);

        node.set_type_index(2).unwrap();
        assert_eq!(node.noise_type(), NoiseType::Brown);
    }

    #[test]
    fn reset_restarts_sequence() {
        let ctx = RenderCtx::new(SAMPLE_RATE, 0, 32);
        let mut node = NoiseNode::brown();
        let mut first = AudioBus::new(1, 32, SAMPLE_RATE);
        let mut second = AudioBus::new(1, 32, SAMPLE_RATE);

        node.start(0.0).unwrap();
        node.process(&ctx, &mut first);
        node.reset(&ctx);
        node.start(0.0).unwrap();
        node.process(&ctx, &mut second);

        assert_eq!(first.channel(0), second.channel(0));
    }
}
