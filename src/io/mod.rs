// Purpose - external interfaces: sample buffers and asset loading

pub mod bus;
pub mod wav;

pub use bus::AudioBus;
pub use wav::WavDirectoryLoader;
