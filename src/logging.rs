use anyhow::{Context, Result};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::{debug, info, LevelFilter};
use std::io;

use crate::config::Config;

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger: coloured lines on stdout plus, when
/// `log_file` is given, dated lines appended to that file.
///
/// A plain level in `RUST_LOG` (`warn`, `trace`, ...) takes precedence over
/// `verbosity`.
pub fn setup_logging(verbosity: u8, log_file: Option<&str>) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or_else(|| level_for(verbosity));

    let stdout_config = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                Local::now().format("[%H:%M:%S]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .chain(io::stdout());

    let mut base_config = fern::Dispatch::new().level(level).chain(stdout_config);

    if let Some(path) = log_file {
        let file = fern::log_file(path)
            .with_context(|| format!("Failed to open log file: {}", path))?;
        // Files keep the date.
        base_config = base_config.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{}[{}][{}] {}",
                        Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                        record.target(),
                        record.level(),
                        message
                    ))
                })
                .chain(file),
        );
    }

    base_config.apply().context("Failed to install logger")?;

    info!("Logging system initialized");
    debug!("Debug logging enabled");

    Ok(())
}

pub fn log_app_start(version: &str) {
    info!("Starting spin-capture v{}", version);
}

pub fn log_app_config(config: &Config) {
    let setting = |value: Option<f64>| value.map_or("unchanged".to_string(), |v| v.to_string());
    info!("Application configured with:");
    info!("  Camera:");
    info!("    Index: {}", config.camera.index);
    info!("    Exposure: {}", config.camera.exposure);
    info!("    Gain: {}", config.camera.gain);
    info!("    Gamma: {}", setting(config.camera.gamma));
    info!("    FPS: {}", setting(config.camera.fps));
    info!("    Brightness: {}", setting(config.camera.brightness));
    info!("  Stream:");
    info!("    Frames: {}", config.stream.frames);
    info!("    Average: {}", config.stream.average);
    info!("    Scale: {}", config.stream.scale);
    info!(
        "    Save folder: {}",
        config.stream.save.as_deref().unwrap_or("none")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0), LevelFilter::Info);
        assert_eq!(level_for(1), LevelFilter::Debug);
        assert_eq!(level_for(2), LevelFilter::Trace);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }
}
