//! blocksound - render a scheduled noise source
//!
//! Run with: cargo run -- [white|pink|brown] [--seconds N] [--out file.wav] [--hrtf DIR]
//!
//! Without `--out` the noise plays on the default output device.

mod app;

use std::path::PathBuf;

use app::Blocksound;
use blocksound::dsp::NoiseType;
use color_eyre::eyre::{bail, eyre, WrapErr};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    TermLogger::init(
        LevelFilter::Info,
        ConfigBuilder::new().set_time_level(LevelFilter::Off).build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .wrap_err("failed to install logger")?;

    let mut app = Blocksound::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "white" => app = app.noise(NoiseType::White),
            "pink" => app = app.noise(NoiseType::Pink),
            "brown" => app = app.noise(NoiseType::Brown),
            "--seconds" => {
                let value = args.next().ok_or_else(|| eyre!("--seconds needs a value"))?;
                let seconds: f64 = value
                    .parse()
                    .wrap_err_with(|| format!("invalid duration `{value}`"))?;
                app = app.seconds(seconds);
            }
            "--out" => {
                let path = args.next().ok_or_else(|| eyre!("--out needs a path"))?;
                app = app.output(PathBuf::from(path));
            }
            "--hrtf" => {
                let dir = args.next().ok_or_else(|| eyre!("--hrtf needs a directory"))?;
                app = app.hrtf_dir(PathBuf::from(dir));
            }
            other => bail!("unknown argument `{other}`"),
        }
    }

    app.run()
}
