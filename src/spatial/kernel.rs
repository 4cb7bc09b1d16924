use std::{f64::consts::PI, sync::Arc};

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/*
HRTF Kernel
===========

One ear's impulse response for one direction, stored as a spectrum ready
for FFT convolution plus the leading delay that was stripped from it.

Building a kernel from a measured impulse response:

  1. Analysis FFT of size N/2 (N = convolution FFT size).
  2. Average group delay: the magnitude-weighted mean of the unwrapped
     phase step between bins, converted to frames

         delay = -mean(dphase) / (2pi / (N/2))

     keeping 20 frames of headroom for the leading edge.
  3. Remove that delay (rotate each bin's phase), zero DC, inverse FFT.
  4. Truncate to N/2 frames with a short linear fade-out
     (sample_rate / 4410 frames, 10 frames at 44.1 kHz).
  5. Zero-pad to N and forward FFT.

The stripped delay is reapplied by the panner as a fractional delay line,
so kernels for neighbouring directions can be interpolated without comb
filtering.

Interpolated kernels blend magnitudes in decibels and group delays per bin,
then clear the second half of the time-domain response so the result is
still safe for linear convolution at size N.
*/

const GROUP_DELAY_HEADROOM: f64 = 20.0;
const MIN_MAGNITUDE: f64 = 1e-10;

/// Forward/inverse FFT plans shared by every kernel of one database.
pub struct KernelFft {
    fft_size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    analysis_forward: Arc<dyn Fft<f32>>,
    analysis_inverse: Arc<dyn Fft<f32>>,
}

impl KernelFft {
    /// Plans for convolution size `fft_size` (a power of two, at least 4).
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let analysis_size = fft_size / 2;
        Self {
            fft_size,
            forward: planner.plan_fft_forward(fft_size),
            inverse: planner.plan_fft_inverse(fft_size),
            analysis_forward: planner.plan_fft_forward(analysis_size),
            analysis_inverse: planner.plan_fft_inverse(analysis_size),
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }
}

#[derive(Debug, Clone)]
pub struct HrtfKernel {
    spectrum: Vec<Complex<f32>>,
    frame_delay: f32,
    sample_rate: f32,
}

impl HrtfKernel {
    /// Kernel from a measured impulse response.
    pub fn from_impulse(impulse: &[f32], sample_rate: f32, fft: &KernelFft) -> Self {
        let analysis_size = fft.fft_size / 2;

        let mut analysis: Vec<Complex<f32>> = (0..analysis_size)
            .map(|i| Complex::new(impulse.get(i).copied().unwrap_or(0.0), 0.0))
            .collect();
        fft.analysis_forward.process(&mut analysis);
        let frame_delay = extract_average_group_delay(&mut analysis);
        fft.analysis_inverse.process(&mut analysis);

        // rustfft leaves the inverse unnormalised
        let scale = 1.0 / analysis_size as f32;
        let truncated = impulse.len().min(analysis_size);
        let mut response: Vec<f32> = analysis[..truncated].iter().map(|c| c.re * scale).collect();

        let fade_frames = (sample_rate / 4410.0) as usize;
        if fade_frames < truncated {
            let fade_start = truncated - fade_frames;
            for (i, sample) in response[fade_start..].iter_mut().enumerate() {
                *sample *= 1.0 - i as f32 / fade_frames as f32;
            }
        }

        let mut spectrum = vec![Complex::new(0.0, 0.0); fft.fft_size];
        for (bin, sample) in spectrum.iter_mut().zip(&response) {
            bin.re = *sample;
        }
        fft.forward.process(&mut spectrum);

        Self {
            spectrum,
            frame_delay: frame_delay as f32,
            sample_rate,
        }
    }

    /// Kernel between `a` (x = 0) and `b` (x = 1).
    pub fn interpolate(a: &HrtfKernel, b: &HrtfKernel, x: f32, fft: &KernelFft) -> Self {
        let x = x.clamp(0.0, 1.0);
        let frame_delay = (1.0 - x) * a.frame_delay + x * b.frame_delay;

        let mut spectrum = interpolate_spectra(&a.spectrum, &b.spectrum, x as f64);

        // Keep the second half of the response empty for linear convolution
        fft.inverse.process(&mut spectrum);
        let n = spectrum.len();
        let scale = 1.0 / n as f32;
        for (i, bin) in spectrum.iter_mut().enumerate() {
            if i < n / 2 {
                *bin = Complex::new(bin.re * scale, 0.0);
            } else {
                *bin = Complex::new(0.0, 0.0);
            }
        }
        fft.forward.process(&mut spectrum);

        Self {
            spectrum,
            frame_delay,
            sample_rate: a.sample_rate,
        }
    }

    /// Full `fft_size`-bin spectrum of the zero-padded response.
    pub fn spectrum(&self) -> &[Complex<f32>] {
        &self.spectrum
    }

    pub fn fft_size(&self) -> usize {
        self.spectrum.len()
    }

    /// Leading delay removed from the response, in frames.
    pub fn frame_delay(&self) -> f32 {
        self.frame_delay
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Estimate and remove the average group delay of `bins` in place,
/// returning it in frames. DC is zeroed.
fn extract_average_group_delay(bins: &mut [Complex<f32>]) -> f64 {
    let n = bins.len();
    let half = n / 2;
    let phase_per_frame = 2.0 * PI / n as f64;

    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut last_phase = 0.0;
    for bin in &bins[..half] {
        let magnitude = bin.norm() as f64;
        let phase = bin.arg() as f64;
        let delta = wrap_phase(phase - last_phase);
        last_phase = phase;

        weighted_sum += magnitude * delta;
        weight_sum += magnitude;
    }

    if weight_sum <= 0.0 {
        return 0.0;
    }

    let mut delay = -(weighted_sum / weight_sum) / phase_per_frame;
    if delay > GROUP_DELAY_HEADROOM {
        delay -= GROUP_DELAY_HEADROOM;
    }

    add_constant_group_delay(bins, -delay);
    bins[0] = Complex::new(0.0, 0.0);
    delay
}

/// Shift every bin below Nyquist by `frames` of delay, mirroring the
/// conjugate half so the signal stays real.
fn add_constant_group_delay(bins: &mut [Complex<f32>], frames: f64) {
    let n = bins.len();
    let phase_step = -frames * 2.0 * PI / n as f64;

    for i in 1..n / 2 {
        let (magnitude, phase) = bins[i].to_polar();
        let shifted = Complex::from_polar(magnitude, phase + (i as f64 * phase_step) as f32);
        bins[i] = shifted;
        bins[n - i] = shifted.conj();
    }
}

fn interpolate_spectra(a: &[Complex<f32>], b: &[Complex<f32>], x: f64) -> Vec<Complex<f32>> {
    let n = a.len().min(b.len());
    let half = n / 2;
    let mut out = vec![Complex::new(0.0, 0.0); n];
    if n == 0 {
        return out;
    }

    // DC and Nyquist are real; blend linearly
    out[0] = a[0] * (1.0 - x) as f32 + b[0] * x as f32;
    if half > 0 {
        out[half] = a[half] * (1.0 - x) as f32 + b[half] * x as f32;
    }

    let mut last_phase_a = 0.0;
    let mut last_phase_b = 0.0;
    let mut phase_accum = 0.0;

    for i in 1..half {
        let (mag_a, phase_a) = polar64(a[i]);
        let (mag_b, phase_b) = polar64(b[i]);

        let db_a = 20.0 * mag_a.max(MIN_MAGNITUDE).log10();
        let db_b = 20.0 * mag_b.max(MIN_MAGNITUDE).log10();

        let mut s1 = 1.0 - x;
        let mut s2 = x;

        // Favour the quieter kernel near deep notches so high zeroes survive
        let threshold = if i > 16 { 5.0 } else { 2.0 };
        let db_diff = db_a - db_b;
        if db_diff < -threshold && db_a < 0.0 {
            s1 = s1.powf(0.75);
            s2 = 1.0 - s1;
        } else if db_diff > threshold && db_b < 0.0 {
            s2 = s2.powf(0.75);
            s1 = 1.0 - s2;
        }

        let magnitude = 10f64.powf(0.05 * (s1 * db_a + s2 * db_b));

        let delta_a = wrap_phase(phase_a - last_phase_a);
        let delta_b = wrap_phase(phase_b - last_phase_b);
        last_phase_a = phase_a;
        last_phase_b = phase_b;

        let blend = if delta_a - delta_b > PI {
            s1 * delta_a + s2 * (2.0 * PI + delta_b)
        } else if delta_b - delta_a > PI {
            s1 * (2.0 * PI + delta_a) + s2 * delta_b
        } else {
            s1 * delta_a + s2 * delta_b
        };
        phase_accum = wrap_phase(phase_accum + blend);

        let bin = Complex::from_polar(magnitude as f32, phase_accum as f32);
        out[i] = bin;
        out[n - i] = bin.conj();
    }

    out
}

fn polar64(c: Complex<f32>) -> (f64, f64) {
    (c.norm() as f64, c.arg() as f64)
}

#[inline]
fn wrap_phase(mut phase: f64) -> f64 {
    if phase > PI {
        phase -= 2.0 * PI;
    }
    if phase < -PI {
        phase += 2.0 * PI;
    }
    phase
}
