use log::trace;

use super::map::NodeMap;
use super::types::{NodeDescriptor, NodeType, NodeValue, RawValue};
use crate::error::{CameraError, CameraResult};

/// Checked, by-name access to a [`NodeMap`].
///
/// Every call re-queries the node's descriptor, so availability changes
/// caused by earlier writes are always observed.
pub struct NodeAccessor<M> {
    map: M,
}

impl<M: NodeMap> NodeAccessor<M> {
    pub fn new(map: M) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    fn lookup(&self, name: &str) -> CameraResult<NodeDescriptor> {
        self.map
            .descriptor(name)
            .ok_or_else(|| CameraError::node_not_found(name))
    }

    pub fn node_type(&self, name: &str) -> CameraResult<NodeType> {
        Ok(self.lookup(name)?.value_type)
    }

    /// `false` for missing nodes as well as unreadable ones.
    pub fn is_readable(&self, name: &str) -> bool {
        self.map.descriptor(name).is_some_and(|d| d.can_read())
    }

    pub fn is_writable(&self, name: &str) -> bool {
        self.map.descriptor(name).is_some_and(|d| d.can_write())
    }

    pub fn limits(&self, name: &str) -> CameraResult<(f64, f64)> {
        let descriptor = self.lookup(name)?;
        if !descriptor.value_type.is_numeric() {
            return Err(CameraError::type_mismatch(
                name,
                NodeType::Float,
                descriptor.value_type,
            ));
        }
        self.map
            .numeric_limits(name)
            .ok_or_else(|| CameraError::device(format!("node '{name}' declares no limits")))
    }

    /// Read `name`, requiring it to be of type `expected`.
    pub fn get_node_value(&self, name: &str, expected: NodeType) -> CameraResult<NodeValue> {
        let descriptor = self.lookup(name)?;
        if !descriptor.can_read() {
            return Err(CameraError::not_readable(name));
        }
        if descriptor.value_type != expected {
            return Err(CameraError::type_mismatch(
                name,
                expected,
                descriptor.value_type,
            ));
        }

        let value = match self.map.read(name)? {
            RawValue::Integer(v) => NodeValue::Integer(v),
            RawValue::Float(v) => NodeValue::Float(v),
            RawValue::Boolean(v) => NodeValue::Boolean(v),
            RawValue::EnumCode(code) => {
                let entry = self
                    .map
                    .enum_entry_name(name, code)
                    .ok_or_else(|| CameraError::unknown_enum_entry(name, code.to_string()))?;
                NodeValue::Enumeration(entry)
            }
            RawValue::Command => NodeValue::Command,
            RawValue::String(s) => NodeValue::String(s),
        };
        if value.node_type() != descriptor.value_type {
            return Err(CameraError::device(format!(
                "node '{name}' returned a {} value for a {} node",
                value.node_type(),
                descriptor.value_type
            )));
        }

        trace!("Read {} = {}", name, value);
        Ok(value)
    }

    /// Read `name` as whatever type the node declares.
    pub fn node_value(&self, name: &str) -> CameraResult<NodeValue> {
        let value_type = self.node_type(name)?;
        self.get_node_value(name, value_type)
    }

    /// Write `value` to `name`; the value's tag is the expected node type.
    ///
    /// May change the availability of other nodes.
    pub fn set_node_value(&mut self, name: &str, value: NodeValue) -> CameraResult<()> {
        let descriptor = self.lookup(name)?;
        if !descriptor.can_write() {
            return Err(CameraError::not_writable(name));
        }
        if descriptor.value_type != value.node_type() {
            return Err(CameraError::type_mismatch(
                name,
                value.node_type(),
                descriptor.value_type,
            ));
        }

        trace!("Write {} <- {}", name, value);
        let raw = match value {
            NodeValue::Integer(v) => RawValue::Integer(v),
            NodeValue::Float(v) => RawValue::Float(v),
            NodeValue::Boolean(v) => RawValue::Boolean(v),
            NodeValue::Enumeration(entry) => {
                let code = self
                    .map
                    .enum_entry_code(name, &entry)
                    .ok_or_else(|| CameraError::unknown_enum_entry(name, entry))?;
                RawValue::EnumCode(code)
            }
            NodeValue::Command => RawValue::Command,
            NodeValue::String(s) => RawValue::String(s),
        };
        self.map.write(name, raw)
    }

    pub fn float(&self, name: &str) -> CameraResult<f64> {
        match self.get_node_value(name, NodeType::Float)? {
            NodeValue::Float(v) => Ok(v),
            other => Err(CameraError::type_mismatch(name, NodeType::Float, other.node_type())),
        }
    }

    pub fn integer(&self, name: &str) -> CameraResult<i64> {
        match self.get_node_value(name, NodeType::Integer)? {
            NodeValue::Integer(v) => Ok(v),
            other => Err(CameraError::type_mismatch(name, NodeType::Integer, other.node_type())),
        }
    }

    pub fn boolean(&self, name: &str) -> CameraResult<bool> {
        match self.get_node_value(name, NodeType::Boolean)? {
            NodeValue::Boolean(v) => Ok(v),
            other => Err(CameraError::type_mismatch(name, NodeType::Boolean, other.node_type())),
        }
    }

    /// Current entry name of an enumeration node.
    pub fn enumeration(&self, name: &str) -> CameraResult<String> {
        match self.get_node_value(name, NodeType::Enumeration)? {
            NodeValue::Enumeration(entry) => Ok(entry),
            other => Err(CameraError::type_mismatch(
                name,
                NodeType::Enumeration,
                other.node_type(),
            )),
        }
    }

    pub fn set_enumeration(&mut self, name: &str, entry: &str) -> CameraResult<()> {
        self.set_node_value(name, NodeValue::Enumeration(entry.to_string()))
    }

    pub fn execute(&mut self, name: &str) -> CameraResult<()> {
        self.set_node_value(name, NodeValue::Command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::memory::{MemoryNodeMap, SimNode};

    fn stub() -> MemoryNodeMap {
        MemoryNodeMap::new()
            .with_node(SimNode::integer("Width", 1440, 16, 4096).read_only())
            .with_node(SimNode::float("Gain", 0.0, 0.0, 47.0))
            .with_node(SimNode::enumeration("GainAuto", &["Off", "Once", "Continuous"], "Off"))
            .with_node(SimNode::boolean("GammaEnable", false))
            .with_node(SimNode::float("Gamma", 1.0, 0.25, 4.0).writable_when_true("GammaEnable"))
            .with_node(SimNode::command("TriggerSoftware"))
    }

    #[test]
    fn test_get_returns_configured_value() {
        let nodes = NodeAccessor::new(stub());
        assert_eq!(
            nodes.get_node_value("Width", NodeType::Integer),
            Ok(NodeValue::Integer(1440))
        );
        assert_eq!(nodes.node_value("Gain"), Ok(NodeValue::Float(0.0)));
    }

    #[test]
    fn test_missing_node() {
        let mut nodes = NodeAccessor::new(stub());
        assert_eq!(
            nodes.node_value("Hoge"),
            Err(CameraError::NodeNotFound("Hoge".into()))
        );
        assert_eq!(
            nodes.set_node_value("Hoge", NodeValue::Integer(1)),
            Err(CameraError::NodeNotFound("Hoge".into()))
        );
    }

    #[test]
    fn test_read_only_node_rejects_write() {
        let mut nodes = NodeAccessor::new(stub());
        assert_eq!(
            nodes.set_node_value("Width", NodeValue::Integer(256)),
            Err(CameraError::NotWritable("Width".into()))
        );
        assert_eq!(nodes.integer("Width"), Ok(1440));
    }

    #[test]
    fn test_type_checked_both_ways() {
        let mut nodes = NodeAccessor::new(stub());
        assert_eq!(
            nodes.get_node_value("Width", NodeType::Float),
            Err(CameraError::type_mismatch("Width", NodeType::Float, NodeType::Integer))
        );
        assert_eq!(
            nodes.set_node_value("Gain", NodeValue::Integer(3)),
            Err(CameraError::type_mismatch("Gain", NodeType::Integer, NodeType::Float))
        );
    }

    #[test]
    fn test_enumeration_by_entry_name() {
        let mut nodes = NodeAccessor::new(stub());
        nodes.set_enumeration("GainAuto", "Continuous").unwrap();
        assert_eq!(nodes.enumeration("GainAuto").unwrap(), "Continuous");

        assert_eq!(
            nodes.set_enumeration("GainAuto", "hoge"),
            Err(CameraError::unknown_enum_entry("GainAuto", "hoge"))
        );
        assert_eq!(nodes.enumeration("GainAuto").unwrap(), "Continuous");
    }

    #[test]
    fn test_enum_code_without_entry_is_reported() {
        let mut map = stub();
        map.force("GainAuto", RawValue::EnumCode(7));
        let nodes = NodeAccessor::new(map);
        assert_eq!(
            nodes.enumeration("GainAuto"),
            Err(CameraError::unknown_enum_entry("GainAuto", "7"))
        );
        assert_eq!(
            nodes.node_value("GainAuto"),
            Err(CameraError::unknown_enum_entry("GainAuto", "7"))
        );
    }

    #[test]
    fn test_out_of_range_leaves_value() {
        let mut nodes = NodeAccessor::new(stub());
        let err = nodes.set_node_value("Gain", NodeValue::Float(60.0)).unwrap_err();
        assert!(matches!(err, CameraError::OutOfRange { .. }));
        assert_eq!(nodes.float("Gain"), Ok(0.0));
    }

    #[test]
    fn test_availability_is_requeried_after_writes() {
        let mut nodes = NodeAccessor::new(stub());
        assert!(!nodes.is_writable("Gamma"));
        assert_eq!(
            nodes.set_node_value("Gamma", NodeValue::Float(2.0)),
            Err(CameraError::NotWritable("Gamma".into()))
        );

        nodes.set_node_value("GammaEnable", NodeValue::Boolean(true)).unwrap();
        assert!(nodes.is_writable("Gamma"));
        nodes.set_node_value("Gamma", NodeValue::Float(2.0)).unwrap();
        assert_eq!(nodes.float("Gamma"), Ok(2.0));
    }

    #[test]
    fn test_command_nodes_execute_but_do_not_read() {
        let mut nodes = NodeAccessor::new(stub());
        nodes.execute("TriggerSoftware").unwrap();
        assert_eq!(nodes.map().writes_to("TriggerSoftware"), 1);
        assert_eq!(
            nodes.node_value("TriggerSoftware"),
            Err(CameraError::NotReadable("TriggerSoftware".into()))
        );
    }

    #[test]
    fn test_limits() {
        let nodes = NodeAccessor::new(stub());
        assert_eq!(nodes.limits("Gamma"), Ok((0.25, 4.0)));
        assert!(matches!(
            nodes.limits("GainAuto"),
            Err(CameraError::TypeMismatch { .. })
        ));
    }
}
