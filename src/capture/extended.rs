use log::{debug, info, warn};
use std::sync::Arc;

use super::VideoCapture;
use crate::device::CameraDevice;
use crate::error::{AppError, CameraError, CameraResult, Result};
use crate::frame::{Frame, FrameBuffer, FrameProcessor, HdrImage};
use crate::node::{NodeAccessor, NodeValue};
use crate::property::rules::*;
use crate::property::PropertyId;

/// Exposure ratio between neighbouring frames when the count is automatic.
const AUTO_LADDER_RATIO: f64 = 2.0;

/// Frames of an exposure bracket and the HDR image merged from them.
#[derive(Debug, Clone)]
pub struct HdrCapture {
    pub image: HdrImage,
    pub frames: Vec<Frame>,
    pub times: Vec<f64>,
}

/// Geometrically spaced exposure times from `t_min` to `t_max`.
///
/// Without `num`, enough steps are used that neighbouring times differ by
/// at most a factor of two.
pub fn exposure_ladder(t_min: f64, t_max: f64, num: Option<usize>) -> Vec<f64> {
    let num = num.unwrap_or_else(|| {
        let mut num = 2;
        while t_min > 0.0 && t_max > t_min * AUTO_LADDER_RATIO.powi(num as i32) {
            num += 1;
        }
        num
    });
    match num {
        0 => Vec::new(),
        1 => vec![t_min],
        _ => {
            let ratio = t_max / t_min;
            let last = (num - 1) as f64;
            (0..num)
                .map(|i| {
                    if i + 1 == num {
                        t_max
                    } else {
                        t_min * ratio.powf(i as f64 / last)
                    }
                })
                .collect()
        }
    }
}

/// Node values changed by a bracket capture.
struct BracketState {
    nodes: Vec<(&'static str, NodeValue)>,
    auto_software_trigger: bool,
}

impl<D: CameraDevice> VideoCapture<D> {
    /// Grab `num` consecutive frames and return their per-pixel mean.
    pub fn read_average(&mut self, num: usize) -> Result<Frame> {
        if num == 0 {
            return Err(AppError::frame_processing("cannot average zero frames"));
        }
        let mut buffer = FrameBuffer::new(num);
        for _ in 0..num {
            buffer.push(Arc::new(self.read()?));
        }
        FrameProcessor::average(buffer.iter().map(|f| &**f))
    }

    /// Grab one software-triggered frame per exposure time, with gain fixed
    /// at its current value.
    ///
    /// Trigger, exposure and gain settings are put back afterwards, also
    /// when a capture fails.
    pub fn read_exposure_bracketing(&mut self, times: &[f64]) -> Result<Vec<Frame>> {
        if times.is_empty() {
            return Err(AppError::config("exposure bracket needs at least one time"));
        }
        let saved = self.save_bracket_state()?;
        info!("Capturing exposure bracket of {} frames", times.len());

        let captured = self.capture_bracket(times);
        let restored = self.restore_bracket_state(saved);
        match (captured, restored) {
            (Ok(frames), Ok(())) => Ok(frames),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), restored) => {
                if let Err(restore_error) = restored {
                    warn!("Camera state not fully restored: {}", restore_error);
                }
                Err(e.into())
            }
        }
    }

    /// Capture a bracket from `t_min` to `t_max` (clamped to the device's
    /// exposure limits) with gamma forced to 1, and merge it into an HDR
    /// image relative to exposure `t_ref`.
    pub fn read_hdr(
        &mut self,
        t_min: f64,
        t_max: f64,
        num: Option<usize>,
        t_ref: f64,
    ) -> Result<HdrCapture> {
        let (lo, hi) = {
            let device = self.opened()?;
            NodeAccessor::new(device.nodes_mut()).limits(EXPOSURE_TIME)?
        };
        let t_min = t_min.clamp(lo, hi);
        let t_max = t_max.clamp(lo, hi);
        if t_min > t_max {
            return Err(AppError::config(format!(
                "HDR exposure range is empty: {t_min} > {t_max}"
            )));
        }
        let times = exposure_ladder(t_min, t_max, num);
        debug!("HDR exposure times: {:?}", times);

        let gamma = self.get_node_value(GAMMA).ok();
        let gamma_enable = self.get_node_value(GAMMA_ENABLE).ok();
        let frames = match gamma {
            Some(_) => match self.set(PropertyId::Gamma, 1.0) {
                Ok(()) => self.read_exposure_bracketing(&times),
                Err(e) => Err(e.into()),
            },
            None => self.read_exposure_bracketing(&times),
        };

        if let Some(gamma) = gamma {
            if let Err(e) = self.set_node_value(GAMMA, gamma) {
                warn!("Could not restore {}: {}", GAMMA, e);
            }
        }
        if let Some(enable) = gamma_enable {
            if let Err(e) = self.set_node_value(GAMMA_ENABLE, enable) {
                warn!("Could not restore {}: {}", GAMMA_ENABLE, e);
            }
        }

        let frames = frames?;
        let image = FrameProcessor::merge_hdr(&frames, &times, t_ref)?;
        Ok(HdrCapture {
            image,
            frames,
            times,
        })
    }

    fn save_bracket_state(&mut self) -> CameraResult<BracketState> {
        // Restore order matters: manual values go back while their auto mode
        // is still Off.
        let names = [
            TRIGGER_SELECTOR,
            TRIGGER_MODE,
            TRIGGER_SOURCE,
            GAIN,
            GAIN_AUTO,
            EXPOSURE_TIME,
            EXPOSURE_AUTO,
        ];
        let mut nodes = Vec::with_capacity(names.len());
        for name in names {
            nodes.push((name, self.get_node_value(name)?));
        }
        Ok(BracketState {
            nodes,
            auto_software_trigger: self.auto_software_trigger,
        })
    }

    fn capture_bracket(&mut self, times: &[f64]) -> CameraResult<Vec<Frame>> {
        let gain = self.get(PropertyId::Gain)?;
        self.set_node_value(TRIGGER_SELECTOR, NodeValue::Enumeration("FrameStart".into()))?;
        self.set_node_value(TRIGGER_MODE, NodeValue::Enumeration("On".into()))?;
        self.set_node_value(TRIGGER_SOURCE, NodeValue::Enumeration("Software".into()))?;
        self.auto_software_trigger = true;
        self.set(PropertyId::Gain, gain)?;

        let mut frames = Vec::with_capacity(times.len());
        for &time in times {
            self.set(PropertyId::Exposure, time)?;
            let frame = self.read()?;
            debug!("Bracket frame {} at {} us", frame.nframe, time);
            frames.push(frame);
        }
        Ok(frames)
    }

    fn restore_bracket_state(&mut self, saved: BracketState) -> CameraResult<()> {
        self.auto_software_trigger = saved.auto_software_trigger;
        let mut first_error: Option<CameraError> = None;
        for (name, value) in saved.nodes {
            if let Err(e) = self.set_node_value(name, value) {
                warn!("Could not restore {}: {}", name, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
