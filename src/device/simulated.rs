use image::GrayImage;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::CameraDevice;
use crate::error::{CameraError, CameraResult};
use crate::frame::Frame;
use crate::node::{MemoryNodeMap, RawValue, SimNode};
use crate::property::rules::*;

const SENSOR_WIDTH: i64 = 640;
const SENSOR_HEIGHT: i64 = 480;
const MAX_FRAME_RATE: f64 = 200.0;
/// Exposure at which the synthetic scene renders at its nominal brightness.
const REFERENCE_EXPOSURE_US: f64 = 10_000.0;
const NOISE_AMPLITUDE: f64 = 2.0;

const DEVICE_MODEL_NAME: &str = "DeviceModelName";
const DEVICE_SERIAL_NUMBER: &str = "DeviceSerialNumber";

fn resulting_frame_rate(map: &MemoryNodeMap) -> Option<RawValue> {
    let exposure = map.float_value(EXPOSURE_TIME)?;
    let sensor_limit = MAX_FRAME_RATE.min(1e6 / exposure);
    let rate = if map.bool_value(ACQUISITION_FRAME_RATE_ENABLE)? {
        map.float_value(ACQUISITION_FRAME_RATE)?.min(sensor_limit)
    } else {
        sensor_limit
    };
    Some(RawValue::Float(rate))
}

/// Node tree of a monochrome USB3 machine-vision camera.
///
/// Manual exposure and gain are only writable while their auto mode is
/// `Off`, the frame rate and gamma only while their enable flag is set, and
/// `TriggerSoftware` only while software triggering is configured.
pub fn simulated_node_map() -> MemoryNodeMap {
    let auto_modes = [AUTO_OFF, "Once", AUTO_CONTINUOUS];
    MemoryNodeMap::new()
        .with_node(SimNode::string(DEVICE_MODEL_NAME, "Simulated Mono USB3").read_only())
        .with_node(SimNode::string(DEVICE_SERIAL_NUMBER, "SIM00000").read_only())
        .with_node(SimNode::integer(WIDTH, SENSOR_WIDTH, 16, SENSOR_WIDTH).read_only())
        .with_node(SimNode::integer(HEIGHT, SENSOR_HEIGHT, 16, SENSOR_HEIGHT).read_only())
        .with_node(SimNode::float(DEVICE_TEMPERATURE, 38.5, -20.0, 100.0).read_only())
        .with_node(SimNode::boolean(ACQUISITION_FRAME_RATE_ENABLE, false))
        .with_node(
            SimNode::float(ACQUISITION_FRAME_RATE, 30.0, 1.0, MAX_FRAME_RATE)
                .writable_when_true(ACQUISITION_FRAME_RATE_ENABLE),
        )
        .with_node(
            SimNode::float(ACQUISITION_RESULTING_FRAME_RATE, 0.0, 0.0, MAX_FRAME_RATE).read_only(),
        )
        .with_node(SimNode::float(EV_COMPENSATION, 0.0, -2.0, 2.0))
        .with_node(SimNode::enumeration(EXPOSURE_AUTO, &auto_modes, AUTO_CONTINUOUS))
        .with_node(
            SimNode::float(EXPOSURE_TIME, REFERENCE_EXPOSURE_US, 6.0, 30_000_000.0)
                .writable_when_entry(EXPOSURE_AUTO, AUTO_OFF),
        )
        .with_node(SimNode::enumeration(GAIN_AUTO, &auto_modes, AUTO_CONTINUOUS))
        .with_node(SimNode::float(GAIN, 0.0, 0.0, 47.99).writable_when_entry(GAIN_AUTO, AUTO_OFF))
        .with_node(SimNode::boolean(GAMMA_ENABLE, false))
        .with_node(SimNode::float(GAMMA, 0.8, 0.25, 4.0).writable_when_true(GAMMA_ENABLE))
        .with_node(SimNode::enumeration(BALANCE_WHITE_AUTO, &auto_modes, AUTO_OFF))
        .with_node(SimNode::enumeration(
            TRIGGER_SELECTOR,
            &["FrameStart", "AcquisitionStart"],
            "FrameStart",
        ))
        .with_node(SimNode::enumeration(TRIGGER_MODE, &["Off", "On"], "Off"))
        .with_node(SimNode::enumeration(
            TRIGGER_SOURCE,
            &["Software", "Line0", "Line1", "Line2", "Line3"],
            "Line0",
        ))
        .with_node(SimNode::float(TRIGGER_DELAY, 9.0, 9.0, 65_520.0))
        .with_node(
            SimNode::command(TRIGGER_SOFTWARE)
                .writable_when_entry(TRIGGER_MODE, "On")
                .available_when_entry(TRIGGER_SOURCE, "Software"),
        )
        .with_node(SimNode::enumeration(
            DEVICE_INDICATOR_MODE,
            &["Inactive", "Active", "ErrorStatus"],
            "Active",
        ))
        .with_derived(ACQUISITION_RESULTING_FRAME_RATE, resulting_frame_rate)
}

/// A camera that renders a noisy horizontal gradient.
///
/// Brightness follows the exposure time and gain currently held in the node
/// tree. With `TriggerMode=On` and `TriggerSource=Software`, a frame is only
/// delivered after `TriggerSoftware` has been executed.
pub struct SimulatedCamera {
    index: u32,
    nodes: MemoryNodeMap,
    rng: StdRng,
    nframe: u64,
    timestamp_ns: u64,
    triggers_consumed: usize,
    released: bool,
}

impl SimulatedCamera {
    /// Open the simulated camera at `index`. Only index 0 exists.
    pub fn open(index: u32) -> CameraResult<Self> {
        if index != 0 {
            return Err(CameraError::device(format!("no camera at index {index}")));
        }
        info!("Opened simulated camera {}", index);
        Ok(Self::with_nodes(simulated_node_map(), u64::from(index)))
    }

    /// Wrap a custom node tree. `seed` fixes the noise pattern.
    pub fn with_nodes(nodes: MemoryNodeMap, seed: u64) -> Self {
        Self {
            index: 0,
            nodes,
            rng: StdRng::seed_from_u64(seed),
            nframe: 0,
            timestamp_ns: 0,
            triggers_consumed: 0,
            released: false,
        }
    }

    fn software_triggered(&self) -> bool {
        self.nodes.entry(TRIGGER_MODE) == Some("On")
            && self.nodes.entry(TRIGGER_SOURCE) == Some("Software")
    }

    fn render(&mut self) -> GrayImage {
        let width = self.nodes.float_value(WIDTH).unwrap_or(SENSOR_WIDTH as f64) as u32;
        let height = self.nodes.float_value(HEIGHT).unwrap_or(SENSOR_HEIGHT as f64) as u32;
        let exposure = self
            .nodes
            .float_value(EXPOSURE_TIME)
            .unwrap_or(REFERENCE_EXPOSURE_US);
        let gain_db = self.nodes.float_value(GAIN).unwrap_or(0.0);
        let gamma = if self.nodes.bool_value(GAMMA_ENABLE) == Some(true) {
            self.nodes.float_value(GAMMA).unwrap_or(1.0)
        } else {
            1.0
        };

        let scale = exposure / REFERENCE_EXPOSURE_US * 10f64.powf(gain_db / 20.0);
        let x_span = f64::from(width.saturating_sub(1).max(1));
        let y_span = f64::from(height.saturating_sub(1).max(1));
        trace!(
            "Rendering {}x{} frame at {} us, {} dB, gamma {}",
            width,
            height,
            exposure,
            gain_db,
            gamma
        );

        let rng = &mut self.rng;
        GrayImage::from_fn(width, height, |x, y| {
            let radiance = 0.02 + 0.5 * f64::from(x) / x_span + 0.1 * f64::from(y) / y_span;
            let level = (radiance * scale).clamp(0.0, 1.0).powf(gamma) * 255.0
                + rng.gen_range(-NOISE_AMPLITUDE..=NOISE_AMPLITUDE);
            image::Luma([level.round().clamp(0.0, 255.0) as u8])
        })
    }
}

impl CameraDevice for SimulatedCamera {
    type Nodes = MemoryNodeMap;

    fn nodes(&self) -> &MemoryNodeMap {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut MemoryNodeMap {
        &mut self.nodes
    }

    fn next_frame(&mut self) -> CameraResult<Frame> {
        if self.released {
            return Err(CameraError::frame_capture("camera released"));
        }
        if self.software_triggered() {
            let executed = self.nodes.writes_to(TRIGGER_SOFTWARE);
            if executed <= self.triggers_consumed {
                return Err(CameraError::frame_capture("waiting for software trigger"));
            }
            self.triggers_consumed = executed;
        }

        let data = self.render();
        let exposure = self
            .nodes
            .float_value(EXPOSURE_TIME)
            .unwrap_or(REFERENCE_EXPOSURE_US);
        let rate = self
            .nodes
            .float_value(ACQUISITION_RESULTING_FRAME_RATE)
            .filter(|r| *r > 0.0)
            .unwrap_or(MAX_FRAME_RATE);
        self.timestamp_ns += (1e9 / rate) as u64;

        let frame = Frame::new(data, self.nframe, self.timestamp_ns, exposure);
        debug!("Simulated frame {} ({} us)", self.nframe, exposure);
        self.nframe += 1;
        Ok(frame)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            info!("Released simulated camera {}", self.index);
        }
    }
}
