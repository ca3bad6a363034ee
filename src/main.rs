use spin_capture::{
    camera,
    cli::CliArgs,
    config::Config,
    frame::FrameProcessor,
    logging,
    property::PropertyId,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::Path;

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    spin_capture::initialize(cli_args.debug, cli_args.log_file.as_deref())?;

    let config = Config::load(&cli_args)?;
    logging::log_app_config(&config);

    let mut cap = camera::open(&config.camera).context("Failed to open camera")?;

    if cli_args.dump_properties {
        let snapshot = cap.snapshot()?;
        println!("{}", snapshot.to_json()?);
        return Ok(());
    }

    info!("Entering main acquisition loop");
    for _ in 0..config.stream.frames {
        let frame = if config.stream.average > 1 {
            cap.read_average(config.stream.average)?
        } else {
            cap.read()?
        };

        let scaled = FrameProcessor::scale(&frame, config.stream.scale)?;
        let stats = FrameProcessor::stats(&frame);
        info!(
            "Frame {} at {} us: {}x{} -> {}x{}, min {} max {} mean {:.1}",
            frame.nframe,
            frame.exposure_time,
            frame.width,
            frame.height,
            scaled.width(),
            scaled.height(),
            stats.min,
            stats.max,
            stats.mean
        );

        if let Some(folder) = &config.stream.save {
            let path = Path::new(folder).join(format!("frame_{:05}.png", frame.nframe));
            FrameProcessor::save_png(&scaled, &path)
                .with_context(|| format!("Failed to save frame: {}", path.display()))?;
        }
    }

    match cap.get(PropertyId::Fps) {
        Ok(fps) => info!("Resulting frame rate: {} fps", fps),
        Err(e) => warn!("Could not read frame rate: {}", e),
    }

    cap.release();
    info!("Acquisition stopped, application shutting down");

    Ok(())
}
