#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::SettingError;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OscillatorType {
    /// Writes silence.
    None,
    #[default]
    Sine,
    /// Taylor-series sine, cheaper than `sin()` and accurate to ~1e-6.
    FastSine,
    Square,
    Sawtooth,
    Triangle,
}

impl OscillatorType {
    pub const LABELS: &'static [&'static str] =
        &["None", "Sine", "FastSine", "Square", "Sawtooth", "Triangle"];

    pub fn index(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for OscillatorType {
    type Error = SettingError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::None,
            1 => Self::Sine,
            2 => Self::FastSine,
            3 => Self::Square,
            4 => Self::Sawtooth,
            5 => Self::Triangle,
            _ => {
                return Err(SettingError::OutOfRange {
                    setting: "type",
                    value,
                    count: Self::LABELS.len() as u32,
                })
            }
        })
    }
}

/// Constant per-block oscillator parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorParams {
    /// Hz
    pub frequency: f32,
    /// Cents; 100 cents = 1 semitone.
    pub detune: f32,
    pub amplitude: f32,
    /// Constant added to every sample.
    pub bias: f32,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            frequency: 440.0,
            detune: 0.0,
            amplitude: 1.0,
            bias: 0.0,
        }
    }
}

/// Phase-accumulating oscillator core.
#[derive(Debug, Clone, Default)]
pub struct OscillatorBlock {
    phase: f64,
}

impl OscillatorBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn render(
        &mut self,
        destination: &mut [f32],
        waveform: OscillatorType,
        params: &OscillatorParams,
        sample_rate: f32,
    ) {
        // Detune below a hundredth of a cent is ignored
        let mut frequency = params.frequency;
        if params.detune.abs() > 0.01 {
            frequency *= 2.0_f32.powf(params.detune / 1200.0);
        }
        let increment = (2.0 * PI as f32 * frequency / sample_rate) as f64;
        let amp = params.amplitude;
        let bias = params.bias;

        // The phase may come from the other window after a waveform change
        let window = if matches!(waveform, OscillatorType::FastSine) {
            PhaseWindow::Centered
        } else {
            PhaseWindow::Unit
        };
        self.phase = window.wrap(self.phase);

        match waveform {
            OscillatorType::None => destination.fill(0.0),
            OscillatorType::Sine => {
                for sample in destination.iter_mut() {
                    *sample = bias + amp * self.phase.sin() as f32;
                    self.advance(increment, PhaseWindow::Unit);
                }
            }
            OscillatorType::FastSine => {
                for sample in destination.iter_mut() {
                    *sample = bias + amp * fast_sine(self.phase);
                    self.advance(increment, PhaseWindow::Centered);
                }
            }
            OscillatorType::Square => {
                for sample in destination.iter_mut() {
                    *sample = bias + if self.phase < PI { amp } else { -amp };
                    self.advance(increment, PhaseWindow::Unit);
                }
            }
            OscillatorType::Sawtooth => {
                for sample in destination.iter_mut() {
                    *sample = bias + amp - (amp / PI as f32) * self.phase as f32;
                    self.advance(increment, PhaseWindow::Unit);
                }
            }
            OscillatorType::Triangle => {
                for sample in destination.iter_mut() {
                    let phase = self.phase as f32;
                    let slope = 2.0 * amp / PI as f32;
                    *sample = if self.phase < PI {
                        bias - amp + slope * phase
                    } else {
                        bias + 3.0 * amp - slope * phase
                    };
                    self.advance(increment, PhaseWindow::Unit);
                }
            }
        }
    }

    #[inline]
    fn advance(&mut self, increment: f64, window: PhaseWindow) {
        self.phase = window.wrap(self.phase + increment);
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

// Sine-family phases live in [0, 2pi); the fast sine runs in [-pi, pi).
#[derive(Debug, Clone, Copy)]
enum PhaseWindow {
    Unit,
    Centered,
}

impl PhaseWindow {
    #[inline]
    fn wrap(self, phase: f64) -> f64 {
        match self {
            Self::Unit => phase.rem_euclid(TAU),
            Self::Centered => (phase + PI).rem_euclid(TAU) - PI,
        }
    }
}

/// Burk's Taylor-series sine, valid for phase in [-pi, pi].
/// https://www.musicdsp.org/en/latest/Synthesis/13-sine-calculation.html
#[inline]
pub fn fast_sine(phase: f64) -> f32 {
    const IF3: f64 = 1.0 / (2.0 * 3.0);
    const IF5: f64 = IF3 / (4.0 * 5.0);
    const IF7: f64 = IF5 / (6.0 * 7.0);
    const IF9: f64 = IF7 / (8.0 * 9.0);
    const IF11: f64 = IF9 / (10.0 * 11.0);

    // Fold into [-pi/2, pi/2] where the series is most accurate
    let x = if phase > FRAC_PI_2 {
        PI - phase
    } else if phase < -FRAC_PI_2 {
        -(PI + phase)
    } else {
        phase
    };
    let x2 = x * x;

    (x * (x2 * (x2 * (x2 * (x2 * ((x2 * -IF11) + IF9) - IF7) + IF5) - IF3) + 1.0)) as f32
}
