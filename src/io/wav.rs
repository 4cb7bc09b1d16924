use std::path::{Path, PathBuf};

use crate::{io::AudioBus, spatial::BusLoader};

/// Read a WAV file into a de-interleaved bus.
pub fn read_wav(path: &Path) -> Result<AudioBus, hound::Error> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1u32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_val))
                .collect::<Result<_, _>>()?
        }
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
    };

    let frames = samples.len() / channels;
    let mut data = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (channel, sample) in data.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }

    Ok(AudioBus::from_channels(data, spec.sample_rate as f32))
}

/// Write interleaved samples as a 32-bit float WAV file.
pub fn write_wav(
    path: &Path,
    samples: &[f32],
    channels: u16,
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

/// Bus loader resolving asset names relative to a directory of WAV files.
#[derive(Debug, Clone)]
pub struct WavDirectoryLoader {
    root: PathBuf,
}

impl WavDirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BusLoader for WavDirectoryLoader {
    fn load_bus(&self, path: &str) -> Option<AudioBus> {
        let full = self.root.join(path);
        match read_wav(&full) {
            Ok(bus) => Some(bus),
            Err(err) => {
                log::warn!("failed to read {}: {err}", full.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_keeps_channel_layout() {
        let dir = std::env::temp_dir().join(format!("blocksound-wav-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stereo.wav");

        // L/R frames: (0.1, -0.1), (0.2, -0.2), (0.3, -0.3)
        let interleaved = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        write_wav(&path, &interleaved, 2, 44_100).unwrap();

        let loader = WavDirectoryLoader::new(&dir);
        let bus = loader.load_bus("stereo.wav").expect("bus should load");
        assert_eq!(bus.number_of_channels(), 2);
        assert_eq!(bus.length(), 3);
        assert_eq!(bus.sample_rate(), 44_100.0);
        assert_eq!(bus.channel(1).unwrap(), &[-0.1, -0.2, -0.3]);

        assert!(loader.load_bus("missing.wav").is_none());
        std::fs::remove_dir_all(&dir).ok();
    }
}
