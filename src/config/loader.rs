use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::camera::CameraConfig;
use crate::cli::CliArgs;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Frames to grab before exiting.
    pub frames: usize,
    /// Frames averaged into each output frame.
    pub average: usize,
    /// Display scale applied to every frame.
    pub scale: f32,
    /// Folder for scaled PNG snapshots; nothing is written when unset.
    pub save: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            frames: 10,
            average: 1,
            scale: 0.25,
            save: None,
        }
    }
}

impl Config {
    pub fn load(cli_args: &CliArgs) -> Result<Self> {
        let mut config = match cli_args.config.as_deref() {
            Some(path) => Self::from_file(path)?,
            None => {
                info!("No configuration file given, using defaults");
                Self::default()
            }
        };

        config.override_with_cli_args(cli_args);

        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        info!("Loading configuration from {}", path);

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        toml::from_str(&config_str).with_context(|| format!("Failed to parse config file: {}", path))
    }

    fn override_with_cli_args(&mut self, args: &CliArgs) {
        if let Some(index) = args.index {
            self.camera.index = index;
        }
        if let Some(exposure) = args.exposure {
            self.camera.exposure = exposure;
        }
        if let Some(gain) = args.gain {
            self.camera.gain = gain;
        }
        if args.gamma.is_some() {
            self.camera.gamma = args.gamma;
        }
        if args.fps.is_some() {
            self.camera.fps = args.fps;
        }
        if args.brightness.is_some() {
            self.camera.brightness = args.brightness;
        }

        if let Some(frames) = args.frames {
            self.stream.frames = frames;
        }
        if let Some(average) = args.average {
            self.stream.average = average;
        }
        if let Some(scale) = args.scale {
            self.stream.scale = scale;
        }
        if args.save.is_some() {
            self.stream.save = args.save.clone();
        }
    }

    fn validate(&self) -> Result<()> {
        self.camera
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid camera configuration")?;

        if !(self.stream.scale > 0.0 && self.stream.scale.is_finite()) {
            return Err(anyhow::anyhow!("Scale must be a positive number"));
        }
        if self.stream.average == 0 {
            return Err(anyhow::anyhow!("At least one frame must be averaged"));
        }

        if let Some(save) = &self.stream.save {
            if save.is_empty() {
                return Err(anyhow::anyhow!("Save folder cannot be empty"));
            }
            let save_folder = Path::new(save);
            if !save_folder.exists() {
                warn!("Save folder does not exist. Creating it.");
                fs::create_dir_all(save_folder)
                    .with_context(|| format!("Failed to create save folder: {}", save))?;
            }
        }

        Ok(())
    }
}
