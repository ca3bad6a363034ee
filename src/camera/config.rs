use log::info;
use serde::{Deserialize, Serialize};

use crate::capture::VideoCapture;
use crate::device::CameraDevice;
use crate::error::CameraResult;
use crate::property::{PropertyId, AUTO_SENTINEL};

/// Properties applied to a camera right after it is opened.
///
/// `exposure` and `gain` use `-1` for automatic control; the optional
/// settings are left at the device's current value when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub exposure: f64,
    pub gain: f64,
    pub gamma: Option<f64>,
    pub fps: Option<f64>,
    pub brightness: Option<f64>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            exposure: AUTO_SENTINEL,
            gain: AUTO_SENTINEL,
            gamma: None,
            fps: None,
            brightness: None,
        }
    }
}

impl CameraConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    pub fn with_exposure(mut self, exposure: f64) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.exposure <= 0.0 && self.exposure != AUTO_SENTINEL {
            return Err("Exposure must be greater than 0, or -1 for auto".to_string());
        }
        if self.gain < 0.0 && self.gain != AUTO_SENTINEL {
            return Err("Gain must not be negative, or -1 for auto".to_string());
        }
        if self.gamma.is_some_and(|g| g <= 0.0) {
            return Err("Gamma must be greater than 0".to_string());
        }
        if self.fps.is_some_and(|f| f <= 0.0) {
            return Err("FPS must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Set exposure, gain, gamma, fps and brightness, in that order.
    /// Stops at the first property the camera rejects.
    pub fn apply<D: CameraDevice>(&self, cap: &mut VideoCapture<D>) -> CameraResult<()> {
        cap.set(PropertyId::Exposure, self.exposure)?;
        cap.set(PropertyId::Gain, self.gain)?;
        let optional = [
            (PropertyId::Gamma, self.gamma),
            (PropertyId::Fps, self.fps),
            (PropertyId::Brightness, self.brightness),
        ];
        for (id, value) in optional {
            if let Some(value) = value {
                cap.set(id, value)?;
            }
        }
        info!(
            "Camera {} configured: exposure {}, gain {}",
            self.index,
            describe(self.exposure),
            describe(self.gain)
        );
        Ok(())
    }
}

fn describe(value: f64) -> String {
    if value == AUTO_SENTINEL {
        "auto".to_string()
    } else {
        value.to_string()
    }
}
