use crate::{
    error::SpatialError,
    spatial::{
        kernel::{HrtfKernel, KernelFft},
        BusLoader,
    },
};

/// Degrees between measured azimuths.
pub const AZIMUTH_SPACING: i32 = 15;
/// Measured azimuths per elevation (0..360 step 15).
pub const NUMBER_OF_RAW_AZIMUTHS: usize = 24;
/// Kernels per raw azimuth step, including the measured one.
pub const INTERPOLATION_FACTOR: usize = 8;
pub const NUMBER_OF_TOTAL_AZIMUTHS: usize = NUMBER_OF_RAW_AZIMUTHS * INTERPOLATION_FACTOR;

pub const MIN_ELEVATION: i32 = -45;
pub const MAX_ELEVATION: i32 = 90;
pub const ELEVATION_SPACING: i32 = 15;

// The measurement set stops below the pole for most azimuths
const MAX_ELEVATIONS: [i32; NUMBER_OF_RAW_AZIMUTHS] = [
    90, 45, 60, 45, 75, 45, 60, 45, 75, 45, 60, 45, 75, 45, 60, 45, 75, 45, 60, 45, 75, 45, 60, 45,
];

/// Asset name of the measured response for a raw grid point.
///
/// Negative elevations are written as `360 + elevation`.
pub fn asset_name(azimuth: i32, elevation: i32) -> String {
    let elevation = if elevation < 0 {
        elevation + 360
    } else {
        elevation
    };
    format!("IRC_Composite_C_R0195_T{azimuth:03}_P{elevation:03}.wav")
}

/// Highest measured elevation at a raw azimuth.
pub fn max_elevation(azimuth: i32) -> i32 {
    let index = (azimuth / AZIMUTH_SPACING) as usize % NUMBER_OF_RAW_AZIMUTHS;
    MAX_ELEVATIONS[index]
}

/// Left and right kernels for one measured direction.
pub fn load_kernel_pair(
    azimuth: i32,
    elevation: i32,
    sample_rate: f32,
    fft: &KernelFft,
    loader: &dyn BusLoader,
) -> Result<(HrtfKernel, HrtfKernel), SpatialError> {
    let on_grid = |value: i32, spacing: i32| value % spacing == 0;
    if !(0..360).contains(&azimuth) || !on_grid(azimuth, AZIMUTH_SPACING) {
        return Err(SpatialError::AzimuthOutOfRange {
            index: azimuth.max(0) as usize,
            total: 360,
        });
    }
    if !(MIN_ELEVATION..=MAX_ELEVATION).contains(&elevation)
        || !on_grid(elevation, ELEVATION_SPACING)
    {
        return Err(SpatialError::InvalidElevation(elevation));
    }

    let path = asset_name(azimuth, elevation.min(max_elevation(azimuth)));
    let bus = loader
        .load_bus(&path)
        .ok_or_else(|| SpatialError::MissingAsset(path.clone()))?;

    if bus.number_of_channels() < 2 {
        return Err(SpatialError::MalformedAsset {
            path,
            reason: "expected a stereo impulse response",
        });
    }
    if bus.length() == 0 {
        return Err(SpatialError::MalformedAsset {
            path,
            reason: "impulse response is empty",
        });
    }

    let (Some(left), Some(right)) = (bus.channel(0), bus.channel(1)) else {
        return Err(SpatialError::MalformedAsset {
            path,
            reason: "expected a stereo impulse response",
        });
    };

    Ok((
        HrtfKernel::from_impulse(left, sample_rate, fft),
        HrtfKernel::from_impulse(right, sample_rate, fft),
    ))
}

/// Kernels for a full ring of azimuths at one elevation.
pub struct HrtfElevation {
    kernels_l: Vec<HrtfKernel>,
    kernels_r: Vec<HrtfKernel>,
    elevation: i32,
}

/// Kernels and blended delays for one direction.
#[derive(Debug, Clone, Copy)]
pub struct KernelLookup<'a> {
    pub kernel_l: &'a HrtfKernel,
    pub kernel_r: &'a HrtfKernel,
    pub frame_delay_l: f64,
    pub frame_delay_r: f64,
}

impl HrtfElevation {
    /// Load the 24 measured azimuths at `elevation` and fill in the
    /// interpolated ones. Any missing asset fails the whole ring.
    pub fn load(
        elevation: i32,
        sample_rate: f32,
        fft: &KernelFft,
        loader: &dyn BusLoader,
    ) -> Result<Self, SpatialError> {
        let mut kernels_l = Vec::with_capacity(NUMBER_OF_TOTAL_AZIMUTHS);
        let mut kernels_r = Vec::with_capacity(NUMBER_OF_TOTAL_AZIMUTHS);

        for raw in 0..NUMBER_OF_RAW_AZIMUTHS {
            let azimuth = raw as i32 * AZIMUTH_SPACING;
            let (left, right) = load_kernel_pair(azimuth, elevation, sample_rate, fft, loader)?;
            kernels_l.push(left);
            kernels_r.push(right);
        }

        Ok(Self {
            kernels_l: expand_ring(&kernels_l, fft),
            kernels_r: expand_ring(&kernels_r, fft),
            elevation,
        })
    }

    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    pub fn number_of_azimuths(&self) -> usize {
        self.kernels_l.len()
    }

    /// Kernels at `azimuth_index` with delays blended toward the next index
    /// (wrapping) by `azimuth_blend`. Blends outside `[0, 1]` count as 0.
    pub fn kernels_from_azimuth(
        &self,
        azimuth_blend: f64,
        azimuth_index: usize,
    ) -> Result<KernelLookup<'_>, SpatialError> {
        let total = self.kernels_l.len();
        let (Some(kernel_l), Some(kernel_r)) = (
            self.kernels_l.get(azimuth_index),
            self.kernels_r.get(azimuth_index),
        ) else {
            return Err(SpatialError::AzimuthOutOfRange {
                index: azimuth_index,
                total,
            });
        };

        let blend = if (0.0..=1.0).contains(&azimuth_blend) {
            azimuth_blend
        } else {
            0.0
        };

        let next = (azimuth_index + 1) % total;
        let mix = |a: f32, b: f32| (1.0 - blend) * a as f64 + blend * b as f64;

        Ok(KernelLookup {
            kernel_l,
            kernel_r,
            frame_delay_l: mix(kernel_l.frame_delay(), self.kernels_l[next].frame_delay()),
            frame_delay_r: mix(kernel_r.frame_delay(), self.kernels_r[next].frame_delay()),
        })
    }
}

/// Insert `INTERPOLATION_FACTOR - 1` kernels between consecutive raw
/// kernels, wrapping from the last back to the first.
fn expand_ring(raw: &[HrtfKernel], fft: &KernelFft) -> Vec<HrtfKernel> {
    let mut ring = Vec::with_capacity(raw.len() * INTERPOLATION_FACTOR);
    for (i, kernel) in raw.iter().enumerate() {
        let next = &raw[(i + 1) % raw.len()];
        ring.push(kernel.clone());
        for step in 1..INTERPOLATION_FACTOR {
            let x = step as f32 / INTERPOLATION_FACTOR as f32;
            ring.push(HrtfKernel::interpolate(kernel, next, x, fft));
        }
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::AudioBus;

    #[test]
    fn asset_names_wrap_negative_elevations() {
        assert_eq!(asset_name(0, 0), "IRC_Composite_C_R0195_T000_P000.wav");
        assert_eq!(asset_name(15, -45), "IRC_Composite_C_R0195_T015_P315.wav");
        assert_eq!(asset_name(345, 90), "IRC_Composite_C_R0195_T345_P090.wav");
    }

    #[test]
    fn elevation_is_clamped_per_azimuth() {
        let requested = std::sync::Mutex::new(Vec::new());
        let loader = |path: &str| {
            requested.lock().unwrap().push(path.to_string());
            Some(AudioBus::from_channels(vec![vec![1.0; 32]; 2], 44_100.0))
        };
        let fft = KernelFft::new(64);
        load_kernel_pair(15, 90, 44_100.0, &fft, &loader).unwrap();
        load_kernel_pair(0, 90, 44_100.0, &fft, &loader).unwrap();
        assert_eq!(
            *requested.lock().unwrap(),
            [
                "IRC_Composite_C_R0195_T015_P045.wav",
                "IRC_Composite_C_R0195_T000_P090.wav",
            ]
        );
    }

    #[test]
    fn off_grid_points_are_rejected() {
        let loader = |_: &str| -> Option<AudioBus> { None };
        let fft = KernelFft::new(64);
        assert!(matches!(
            load_kernel_pair(0, 10, 44_100.0, &fft, &loader),
            Err(SpatialError::InvalidElevation(10))
        ));
        assert!(matches!(
            load_kernel_pair(7, 0, 44_100.0, &fft, &loader),
            Err(SpatialError::AzimuthOutOfRange { .. })
        ));
    }

    #[test]
    fn mono_asset_is_malformed() {
        let loader = |_: &str| Some(AudioBus::from_channels(vec![vec![1.0; 32]], 44_100.0));
        let fft = KernelFft::new(64);
        assert!(matches!(
            load_kernel_pair(0, 0, 44_100.0, &fft, &loader),
            Err(SpatialError::MalformedAsset { .. })
        ));
    }

    #[test]
    fn ring_has_interpolated_kernels() {
        let loader = |_: &str| Some(AudioBus::from_channels(vec![vec![0.5; 32]; 2], 44_100.0));
        let fft = KernelFft::new(64);
        let ring = HrtfElevation::load(0, 44_100.0, &fft, &loader).unwrap();
        assert_eq!(ring.number_of_azimuths(), NUMBER_OF_TOTAL_AZIMUTHS);
        assert!(ring.kernels_from_azimuth(0.0, NUMBER_OF_TOTAL_AZIMUTHS).is_err());
    }
}
