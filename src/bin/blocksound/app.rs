use std::{path::PathBuf, sync::Arc, time::Duration};

use blocksound::{
    dsp::NoiseType,
    engine::SourceMixer,
    graph::{NoiseGenerator, ScheduledSource},
    io::{wav::write_wav, AudioBus, WavDirectoryLoader},
    spatial::{HrtfDatabaseLoader, LoaderPool},
    EngineConfig,
};
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result as EyreResult,
};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

// Fade in after a short pause so the offset start is audible
const START_DELAY: f64 = 0.25;

pub struct Blocksound {
    noise: NoiseType,
    seconds: f64,
    output: Option<PathBuf>,
    hrtf_dir: Option<PathBuf>,
    config: EngineConfig,
}

impl Blocksound {
    pub fn new() -> Self {
        Self {
            noise: NoiseType::White,
            seconds: 2.0,
            output: None,
            hrtf_dir: None,
            config: EngineConfig::default(),
        }
    }

    pub fn noise(mut self, noise: NoiseType) -> Self {
        self.noise = noise;
        self
    }

    pub fn seconds(mut self, seconds: f64) -> Self {
        self.seconds = seconds;
        self
    }

    /// Render to this WAV file instead of the output device.
    pub fn output(mut self, path: PathBuf) -> Self {
        self.output = Some(path);
        self
    }

    /// Load an HRTF set from this directory in the background.
    pub fn hrtf_dir(mut self, dir: PathBuf) -> Self {
        self.hrtf_dir = Some(dir);
        self
    }

    pub fn run(mut self) -> EyreResult<()> {
        // The device decides the rate when playing live
        let device = match self.output {
            Some(_) => None,
            None => Some(open_device()?),
        };
        if let Some((_, config)) = &device {
            self.config.sample_rate = config.sample_rate().0 as f32;
        }
        self.config.validate().wrap_err("invalid engine configuration")?;

        let loader = self.start_hrtf_loading()?;

        let mixer = self.build_mixer()?;
        match (device, &self.output) {
            (Some((device, config)), _) => self.play(mixer, device, config)?,
            (None, Some(path)) => self.render_to_file(mixer, path)?,
            (None, None) => {}
        }

        if let Some(loader) = loader {
            loader.wait_until_loaded();
            match loader.database() {
                Some(db) => log::info!(
                    "HRTF database ready: {} azimuths, {}-point kernels",
                    blocksound::spatial::HrtfDatabase::number_of_azimuths(),
                    db.fft_size()
                ),
                None => log::warn!("HRTF database unavailable"),
            }
        }
        Ok(())
    }

    fn start_hrtf_loading(&self) -> EyreResult<Option<Arc<HrtfDatabaseLoader>>> {
        let Some(dir) = &self.hrtf_dir else {
            return Ok(None);
        };
        let pool = LoaderPool::from_config(&self.config)?;
        let loader = HrtfDatabaseLoader::start_loading(
            &pool,
            self.config.sample_rate,
            Arc::new(WavDirectoryLoader::new(dir)),
        );
        Ok(Some(loader))
    }

    fn build_mixer(&self) -> EyreResult<SourceMixer> {
        let (node, mut schedule) = ScheduledSource::with_queue(
            NoiseGenerator::new(self.noise),
            1,
            self.config.schedule_queue_capacity,
        );

        // Applied by the render side at the first block boundary
        schedule
            .start_for(START_DELAY, self.seconds)
            .wrap_err("failed to schedule noise source")?;

        let mut mixer = SourceMixer::from_config(&self.config);
        mixer.add_source(Box::new(node));
        Ok(mixer)
    }

    fn total_frames(&self) -> usize {
        ((START_DELAY + self.seconds) * self.config.sample_rate as f64).ceil() as usize
    }

    fn render_to_file(&self, mut mixer: SourceMixer, path: &std::path::Path) -> EyreResult<()> {
        let block_size = self.config.block_size;
        let total = self.total_frames();
        let mut block = AudioBus::new(1, block_size, self.config.sample_rate);
        let mut samples = Vec::with_capacity(total);

        while samples.len() < total {
            mixer.process_block(&mut block);
            let channel = block.channel(0).ok_or_else(|| eyre!("mixer bus has no channels"))?;
            let take = (total - samples.len()).min(block_size);
            samples.extend_from_slice(&channel[..take]);
        }

        write_wav(path, &samples, 1, self.config.sample_rate as u32)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {} frames to {}", samples.len(), path.display());
        Ok(())
    }

    fn play(
        &self,
        mut mixer: SourceMixer,
        device: cpal::Device,
        config: cpal::SupportedStreamConfig,
    ) -> EyreResult<()> {
        let channels = config.channels() as usize;
        let block_size = self.config.block_size;
        let mut block = AudioBus::new(1, block_size, self.config.sample_rate);
        let mut interleaved = vec![0.0f32; block_size * channels];

        log::info!(
            "playing {:?} noise at {} Hz, {} channel(s)",
            self.noise,
            self.config.sample_rate,
            channels
        );

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                for chunk in data.chunks_mut(block_size * channels) {
                    let frames = chunk.len() / channels;
                    mixer.process_frames(&mut block, frames);
                    let out = &mut interleaved[..frames * channels];
                    block.interleave_into(out, channels);
                    chunk[..out.len()].copy_from_slice(out);
                }
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;
        stream.play()?;

        std::thread::sleep(Duration::from_secs_f64(START_DELAY + self.seconds + 0.1));
        Ok(())
    }
}

impl Default for Blocksound {
    fn default() -> Self {
        Self::new()
    }
}

fn open_device() -> EyreResult<(cpal::Device, cpal::SupportedStreamConfig)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    if config.sample_format() != cpal::SampleFormat::F32 {
        return Err(eyre!("output device must accept f32 samples"));
    }
    Ok((device, config))
}
