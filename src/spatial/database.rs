use crate::{
    error::SpatialError,
    spatial::{
        elevation::{
            HrtfElevation, KernelLookup, ELEVATION_SPACING, MAX_ELEVATION, MIN_ELEVATION,
            NUMBER_OF_TOTAL_AZIMUTHS,
        },
        kernel::KernelFft,
        BusLoader,
    },
};

/// Number of measured elevation rings (-45..=90 step 15).
pub const NUMBER_OF_ELEVATIONS: usize =
    ((MAX_ELEVATION - MIN_ELEVATION) / ELEVATION_SPACING) as usize + 1;

/// Convolution FFT size used for kernels at `sample_rate`.
pub fn fft_size_for_sample_rate(sample_rate: f32) -> usize {
    if sample_rate < 88_200.0 {
        512
    } else {
        1024
    }
}

/// Precomputed HRTF kernels for every supported direction.
///
/// Built in one go; a database either has every ring or does not exist.
/// Kernels are read-only after construction and shared by reference.
pub struct HrtfDatabase {
    elevations: Vec<HrtfElevation>,
    sample_rate: f32,
    fft_size: usize,
}

impl HrtfDatabase {
    /// Load and process every impulse response through `loader`.
    ///
    /// This is slow (hundreds of FFTs per ring) and belongs on a worker
    /// thread; see [`HrtfDatabaseLoader`](crate::spatial::HrtfDatabaseLoader).
    pub fn new(sample_rate: f32, loader: &dyn BusLoader) -> Result<Self, SpatialError> {
        let fft_size = fft_size_for_sample_rate(sample_rate);
        let fft = KernelFft::new(fft_size);

        let elevations = (0..NUMBER_OF_ELEVATIONS)
            .map(|i| {
                let elevation = MIN_ELEVATION + i as i32 * ELEVATION_SPACING;
                HrtfElevation::load(elevation, sample_rate, &fft, loader)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            elevations,
            sample_rate,
            fft_size,
        })
    }

    /// Kernels for `azimuth_index` on the ring nearest below
    /// `elevation_angle` (clamped to the supported range), with frame
    /// delays blended toward the next azimuth by `azimuth_blend`.
    pub fn lookup(
        &self,
        azimuth_blend: f64,
        azimuth_index: usize,
        elevation_angle: f64,
    ) -> Result<KernelLookup<'_>, SpatialError> {
        let index = elevation_index(elevation_angle);
        let ring = self
            .elevations
            .get(index)
            .ok_or(SpatialError::InvalidElevation(elevation_angle as i32))?;
        ring.kernels_from_azimuth(azimuth_blend, azimuth_index)
    }

    /// Azimuth positions per ring.
    pub fn number_of_azimuths() -> usize {
        NUMBER_OF_TOTAL_AZIMUTHS
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }
}

fn elevation_index(elevation_angle: f64) -> usize {
    let angle = if elevation_angle.is_nan() {
        MIN_ELEVATION as f64
    } else {
        elevation_angle.clamp(MIN_ELEVATION as f64, MAX_ELEVATION as f64)
    };
    ((angle - MIN_ELEVATION as f64) / ELEVATION_SPACING as f64) as usize
}
