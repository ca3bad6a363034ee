use super::types::{NodeDescriptor, RawValue};
use crate::error::CameraResult;

/// The device's configuration surface: named, typed nodes.
///
/// Implemented by whatever owns the device connection. Implementations
/// answer queries against live device state; callers go through
/// [`NodeAccessor`](super::NodeAccessor), which performs capability and type
/// checks before reaching `read`/`write`.
pub trait NodeMap {
    /// Current descriptor for `name`, or `None` if the node does not exist.
    fn descriptor(&self, name: &str) -> Option<NodeDescriptor>;

    fn read(&self, name: &str) -> CameraResult<RawValue>;

    /// Write a raw value. Rejects values outside the node's declared range or
    /// enumeration domain with `OutOfRange`.
    fn write(&mut self, name: &str, value: RawValue) -> CameraResult<()>;

    /// Integer code of the enumeration entry `entry` of node `node`.
    fn enum_entry_code(&self, node: &str, entry: &str) -> Option<i64>;

    /// Symbolic name of the enumeration entry with code `code`.
    fn enum_entry_name(&self, node: &str, code: i64) -> Option<String>;

    /// Declared `(min, max)` of a numeric node.
    fn numeric_limits(&self, _name: &str) -> Option<(f64, f64)> {
        None
    }

    fn node_names(&self) -> Vec<String> {
        Vec::new()
    }
}

impl<T: NodeMap + ?Sized> NodeMap for &mut T {
    fn descriptor(&self, name: &str) -> Option<NodeDescriptor> {
        (**self).descriptor(name)
    }

    fn read(&self, name: &str) -> CameraResult<RawValue> {
        (**self).read(name)
    }

    fn write(&mut self, name: &str, value: RawValue) -> CameraResult<()> {
        (**self).write(name, value)
    }

    fn enum_entry_code(&self, node: &str, entry: &str) -> Option<i64> {
        (**self).enum_entry_code(node, entry)
    }

    fn enum_entry_name(&self, node: &str, code: i64) -> Option<String> {
        (**self).enum_entry_name(node, code)
    }

    fn numeric_limits(&self, name: &str) -> Option<(f64, f64)> {
        (**self).numeric_limits(name)
    }

    fn node_names(&self) -> Vec<String> {
        (**self).node_names()
    }
}
