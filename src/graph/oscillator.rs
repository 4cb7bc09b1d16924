use crate::{
    dsp::oscillator::{OscillatorBlock, OscillatorParams, OscillatorType},
    engine::RenderRange,
    error::SettingError,
    graph::{
        node::RenderCtx,
        setting::EnumSetting,
        source::{Generator, ScheduledSource},
    },
    io::AudioBus,
};

/*
Audio Oscillator
================

A scheduled periodic source. Parameters are held constant for a block;
sample-accurate automation is left to the graph.

Waveforms (phase p in [0, 2pi), amplitude A, bias B):

  Sine      B + A sin(p)
  FastSine  B + A burk(p)        p kept in [-pi, pi), Taylor series to x^11
  Square    B + (p < pi ? A : -A)
  Sawtooth  B + A - (A / pi) p
  Triangle  B - A + (2A / pi) p              for p < pi
            B + 3A - (2A / pi) p             otherwise
  None      silence

Detune is in cents and scales the frequency by 2^(cents / 1200).

Example usage:
  let mut osc = OscillatorNode::sine().with_frequency(220.0);
  osc.start(0.0)?;
*/

/// Scheduled mono oscillator. Extra output channels receive a copy of
/// channel 0.
pub type OscillatorNode = ScheduledSource<OscillatorGenerator>;

pub struct OscillatorGenerator {
    waveform: EnumSetting,
    params: OscillatorParams,
    osc: OscillatorBlock,
}

impl OscillatorGenerator {
    pub fn new(waveform: OscillatorType) -> Self {
        let mut setting = EnumSetting::new("type", "TYPE", OscillatorType::LABELS);
        setting.set_index(waveform.index());
        Self {
            waveform: setting,
            params: OscillatorParams::default(),
            osc: OscillatorBlock::new(),
        }
    }

    pub fn waveform(&self) -> OscillatorType {
        OscillatorType::try_from(self.waveform.value_u32()).unwrap_or_default()
    }

    pub fn params(&self) -> &OscillatorParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut OscillatorParams {
        &mut self.params
    }
}

impl Generator for OscillatorGenerator {
    fn generate(&mut self, ctx: &RenderCtx, range: RenderRange, out: &mut AudioBus) {
        let waveform = self.waveform();
        let Some(first) = out.channel_mut(0) else {
            return;
        };
        let run = &mut first[range.offset..range.end()];
        self.osc.render(run, waveform, &self.params, ctx.sample_rate);

        for ch in 1..out.number_of_channels() {
            out.copy_channel_range(0, ch, range.offset..range.end());
        }
    }

    fn reset(&mut self) {
        self.osc.reset();
    }
}

impl OscillatorNode {
    /// Mono oscillator of the given waveform at 440 Hz.
    pub fn with_waveform(waveform: OscillatorType) -> Self {
        ScheduledSource::new(OscillatorGenerator::new(waveform), 1)
    }

    pub fn sine() -> Self {
        Self::with_waveform(OscillatorType::Sine)
    }

    pub fn fast_sine() -> Self {
        Self::with_waveform(OscillatorType::FastSine)
    }

    pub fn square() -> Self {
        Self::with_waveform(OscillatorType::Square)
    }

    pub fn sawtooth() -> Self {
        Self::with_waveform(OscillatorType::Sawtooth)
    }

    pub fn triangle() -> Self {
        Self::with_waveform(OscillatorType::Triangle)
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.generator_mut().params.frequency = frequency;
        self
    }

    /// Detune in cents (100 cents = 1 semitone).
    pub fn with_detune(mut self, cents: f32) -> Self {
        self.generator_mut().params.detune = cents;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.generator_mut().params.amplitude = amplitude;
        self
    }

    pub fn with_bias(mut self, bias: f32) -> Self {
        self.generator_mut().params.bias = bias;
        self
    }

    pub fn waveform(&self) -> OscillatorType {
        self.generator().waveform()
    }

    pub fn set_waveform(&mut self, waveform: OscillatorType) {
        self.generator_mut().waveform.set_index(waveform.index());
    }

    pub fn set_waveform_index(&mut self, index: u32) -> Result<(), SettingError> {
        self.generator_mut().waveform.set_u32(index)
    }
}
