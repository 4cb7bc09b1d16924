#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SettingError;

/*
Noise Generators
================

All three colours are driven by the same white source: a 31-bit linear
congruential generator.

    state' = (state * 435898247 + 382842987) mod 2^31

Each state is mapped to a float by centring it on 2^30 and scaling:

    white = ((state & 0x7fffffff) - 0x40000000) / 0x40000000    in [-1, 1)
    white = white * 0.5 - 1.0                                    in [-1.5, -0.5)

The second line shifts the signal off-centre. Consumers already expect this
exact sequence, so it stays bit-for-bit as is; the DC offset is theirs to
remove.

Pink
----
Paul Kellet's refined filter: six one-pole sections at staggered corner
frequencies, a direct white term and a one-sample carry term, summed and
scaled by 0.11 to bring the gain back near unity.

    b0 = 0.99886 * b0 + white * 0.0555179
    b1 = 0.99332 * b1 + white * 0.0750759
    b2 = 0.96900 * b2 + white * 0.1538520
    b3 = 0.86650 * b3 + white * 0.3104856
    b4 = 0.55000 * b4 + white * 0.5329522
    b5 = -0.7616 * b5 - white * 0.0168980
    out = (b0 + b1 + b2 + b3 + b4 + b5 + b6 + white * 0.5362) * 0.11
    b6 = white * 0.115926

Brown
-----
A leaky integrator of white noise:

    brown = (brown + 0.02 * white) / 1.02
    out   = brown * 3.5

Reference: http://noisehack.com/generate-noise-web-audio-api/
*/

/// Seed every white generator starts from (and returns to on reset).
pub const DEFAULT_SEED: u32 = 1_489_853_723;

const LCG_MULTIPLIER: u32 = 435_898_247;
const LCG_INCREMENT: u32 = 382_842_987;
const STATE_MASK: u32 = 0x7fff_ffff;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoiseType {
    #[default]
    White,
    Pink,
    Brown,
}

impl NoiseType {
    /// Labels in setting-index order.
    pub const LABELS: &'static [&'static str] = &["White", "Pink", "Brown"];

    pub fn index(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for NoiseType {
    type Error = SettingError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::White),
            1 => Ok(Self::Pink),
            2 => Ok(Self::Brown),
            _ => Err(SettingError::OutOfRange {
                setting: "type",
                value,
                count: Self::LABELS.len() as u32,
            }),
        }
    }
}

/// 31-bit LCG white noise.
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    seed: u32,
    state: u32,
}

impl Default for WhiteNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl WhiteNoise {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u32) -> Self {
        let seed = seed & STATE_MASK;
        Self { seed, state: seed }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let centred = (self.state & STATE_MASK) as i32 - 0x4000_0000;
        let white = centred as f32 * (1.0 / 0x4000_0000 as f32);
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT)
            & STATE_MASK;
        white * 0.5 - 1.0
    }

    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Rewind to the seed.
    pub fn reset(&mut self) {
        self.state = self.seed;
    }
}

/// Pink colouring filter state.
#[derive(Debug, Clone, Default)]
pub struct PinkFilter {
    b: [f32; 7],
}

impl PinkFilter {
    #[inline]
    pub fn process(&mut self, white: f32) -> f32 {
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + white * 0.055_517_9;
        b[1] = 0.99332 * b[1] + white * 0.075_075_9;
        b[2] = 0.96900 * b[2] + white * 0.153_852;
        b[3] = 0.86650 * b[3] + white * 0.310_485_6;
        b[4] = 0.55000 * b[4] + white * 0.532_952_2;
        b[5] = -0.7616 * b[5] - white * 0.016_898;
        let out = (b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362) * 0.11;
        b[6] = white * 0.115_926;
        out
    }

    pub fn reset(&mut self) {
        self.b = [0.0; 7];
    }
}

/// Brownian (leaky integrator) filter state.
#[derive(Debug, Clone, Default)]
pub struct BrownFilter {
    last: f32,
}

impl BrownFilter {
    #[inline]
    pub fn process(&mut self, white: f32) -> f32 {
        let brown = (self.last + 0.02 * white) / 1.02;
        self.last = brown;
        brown * 3.5
    }

    pub fn reset(&mut self) {
        self.last = 0.0;
    }
}

/// One white source feeding whichever colour is selected.
///
/// Switching colour keeps the white sequence and both filter histories.
#[derive(Debug, Clone, Default)]
pub struct NoiseBlock {
    white: WhiteNoise,
    pink: PinkFilter,
    brown: BrownFilter,
}

impl NoiseBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u32) -> Self {
        Self {
            white: WhiteNoise::with_seed(seed),
            ..Default::default()
        }
    }

    pub fn render(&mut self, out: &mut [f32], kind: NoiseType) {
        match kind {
            NoiseType::White => self.white.render(out),
            NoiseType::Pink => {
                for sample in out.iter_mut() {
                    *sample = self.pink.process(self.white.next_sample());
                }
            }
            NoiseType::Brown => {
                for sample in out.iter_mut() {
                    *sample = self.brown.process(self.white.next_sample());
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.white.reset();
        self.pink.reset();
        self.brown.reset();
    }
}
