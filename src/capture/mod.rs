//! OpenCV-style capture facade over a connected camera.

mod extended;

pub use extended::{exposure_ladder, HdrCapture};

use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::device::CameraDevice;
use crate::error::{CameraError, CameraResult, Result};
use crate::frame::Frame;
use crate::node::{NodeAccessor, NodeMap, NodeValue};
use crate::property::rules::TRIGGER_SOFTWARE;
use crate::property::{PropertyEngine, PropertyId, PropertyValue};

/// Every property's current value, or the reason it could not be read.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PropertySnapshot {
    pub values: BTreeMap<String, PropertyValue>,
    pub errors: BTreeMap<String, String>,
}

impl PropertySnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Generic `get`/`set`/`read` access to a camera.
///
/// All operations take `&mut self`: node reads and writes share one control
/// channel and must not interleave. Once [`release`](Self::release) has been
/// called every operation fails with [`CameraError::NotOpened`].
pub struct VideoCapture<D: CameraDevice> {
    device: Option<D>,
    engine: PropertyEngine,
    auto_software_trigger: bool,
}

impl<D: CameraDevice> VideoCapture<D> {
    pub fn new(device: D) -> Self {
        Self::with_engine(device, PropertyEngine::default())
    }

    pub fn with_engine(device: D, engine: PropertyEngine) -> Self {
        Self {
            device: Some(device),
            engine,
            auto_software_trigger: false,
        }
    }

    pub fn is_opened(&self) -> bool {
        self.device.is_some()
    }

    pub fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> Option<&mut D> {
        self.device.as_mut()
    }

    fn opened(&mut self) -> CameraResult<&mut D> {
        self.device.as_mut().ok_or(CameraError::NotOpened)
    }

    pub fn get(&mut self, id: PropertyId) -> CameraResult<PropertyValue> {
        let device = self.device.as_mut().ok_or(CameraError::NotOpened)?;
        let nodes = NodeAccessor::new(device.nodes_mut());
        self.engine.get_property(&nodes, id)
    }

    /// Set property `id`. `-1` selects automatic control for exposure and
    /// gain; see [`PropertyEngine::set_property`] for partial failures.
    pub fn set(&mut self, id: PropertyId, value: impl Into<PropertyValue>) -> CameraResult<()> {
        let value = value.into();
        let device = self.device.as_mut().ok_or(CameraError::NotOpened)?;
        let mut nodes = NodeAccessor::new(device.nodes_mut());
        self.engine.set_property(&mut nodes, id, value)
    }

    /// [`get`](Self::get) addressed by `CAP_PROP_*` code.
    pub fn get_code(&mut self, code: i32) -> CameraResult<PropertyValue> {
        self.get(PropertyId::from_code(code)?)
    }

    pub fn set_code(&mut self, code: i32, value: impl Into<PropertyValue>) -> CameraResult<()> {
        self.set(PropertyId::from_code(code)?, value)
    }

    /// Read any node by name, bypassing the property rules.
    pub fn get_node_value(&mut self, name: &str) -> CameraResult<NodeValue> {
        let device = self.opened()?;
        NodeAccessor::new(device.nodes_mut()).node_value(name)
    }

    pub fn set_node_value(&mut self, name: &str, value: NodeValue) -> CameraResult<()> {
        let device = self.opened()?;
        NodeAccessor::new(device.nodes_mut()).set_node_value(name, value)
    }

    /// Execute `TriggerSoftware` before every [`read`](Self::read) while
    /// the node is writable.
    pub fn set_auto_software_trigger(&mut self, enabled: bool) {
        self.auto_software_trigger = enabled;
    }

    pub fn auto_software_trigger(&self) -> bool {
        self.auto_software_trigger
    }

    /// Grab the next frame.
    pub fn read(&mut self) -> CameraResult<Frame> {
        let auto_trigger = self.auto_software_trigger;
        let device = self.opened()?;
        if auto_trigger {
            let mut nodes = NodeAccessor::new(device.nodes_mut());
            if nodes.is_writable(TRIGGER_SOFTWARE) {
                nodes.execute(TRIGGER_SOFTWARE)?;
            } else {
                debug!("{} not writable, waiting for hardware trigger", TRIGGER_SOFTWARE);
            }
        }
        device.next_frame()
    }

    /// Release the camera. Calling it again is harmless.
    pub fn release(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.release();
            info!("Camera released");
        }
    }

    /// Read every property the rule table knows about.
    pub fn snapshot(&mut self) -> CameraResult<PropertySnapshot> {
        self.opened()?;
        let mut snapshot = PropertySnapshot::default();
        let ids: Vec<PropertyId> = self.engine.rules().ids().collect();
        for id in ids {
            match self.get(id) {
                Ok(value) => {
                    snapshot.values.insert(id.name().to_string(), value);
                }
                Err(e) => {
                    warn!("Could not read {}: {}", id, e);
                    snapshot.errors.insert(id.name().to_string(), e.to_string());
                }
            }
        }
        Ok(snapshot)
    }

    /// Names of every node the device exposes.
    pub fn node_names(&mut self) -> CameraResult<Vec<String>> {
        Ok(self.opened()?.nodes().node_names())
    }
}

impl<D: CameraDevice> Drop for VideoCapture<D> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::SimulatedCamera;
    use crate::property::rules::*;

    fn capture() -> VideoCapture<SimulatedCamera> {
        VideoCapture::new(SimulatedCamera::open(0).unwrap())
    }

    #[test]
    fn test_get_and_set_through_codes() {
        let mut cap = capture();
        assert!(cap.is_opened());
        assert_eq!(cap.get_code(3).unwrap(), PropertyValue::Integer(640));

        cap.set_code(15, 5000.0).unwrap();
        assert_eq!(cap.get(PropertyId::Exposure).unwrap(), PropertyValue::Float(5000.0));
        assert_eq!(
            cap.get_node_value(EXPOSURE_AUTO).unwrap(),
            NodeValue::Enumeration("Off".to_string())
        );
        assert!(matches!(
            cap.get_code(999),
            Err(CameraError::UnsupportedProperty(_))
        ));
    }

    #[test]
    fn test_released_capture_refuses_everything() {
        let mut cap = capture();
        cap.release();
        cap.release();
        assert!(!cap.is_opened());
        assert_eq!(cap.get(PropertyId::Gain).err(), Some(CameraError::NotOpened));
        assert_eq!(cap.set(PropertyId::Gain, 1.0).err(), Some(CameraError::NotOpened));
        assert!(matches!(cap.read(), Err(CameraError::NotOpened)));
        assert!(cap.snapshot().is_err());
    }

    #[test]
    fn test_auto_software_trigger() {
        let mut cap = capture();
        cap.set_node_value(TRIGGER_MODE, NodeValue::Enumeration("On".to_string()))
            .unwrap();
        cap.set_node_value(TRIGGER_SOURCE, NodeValue::Enumeration("Software".to_string()))
            .unwrap();
        assert!(cap.read().is_err());

        cap.set_auto_software_trigger(true);
        let first = cap.read().unwrap();
        let second = cap.read().unwrap();
        assert_eq!(second.nframe, first.nframe + 1);
    }

    #[test]
    fn test_snapshot_collects_values_and_errors() {
        let mut cap = capture();
        let snapshot = cap.snapshot().unwrap();
        assert_eq!(snapshot.values.len() + snapshot.errors.len(), PropertyId::ALL.len());
        assert_eq!(snapshot.values.get("frame_height"), Some(&PropertyValue::Integer(480)));

        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(json["values"]["frame_width"], 640);
    }
}
