use serde::{Deserialize, Serialize};
use std::fmt;

/// Interface type of a node, as declared by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Integer,
    Float,
    Boolean,
    Enumeration,
    Command,
    String,
}

impl NodeType {
    pub fn is_numeric(self) -> bool {
        matches!(self, NodeType::Integer | NodeType::Float)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Integer => "Integer",
            NodeType::Float => "Float",
            NodeType::Boolean => "Boolean",
            NodeType::Enumeration => "Enumeration",
            NodeType::Command => "Command",
            NodeType::String => "String",
        };
        f.write_str(name)
    }
}

/// A value read from or written to a node.
///
/// Enumerations travel by symbolic entry name (`"Continuous"`, `"Off"`),
/// never by the device's integer code. `Command` carries no data; writing
/// it executes the command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Enumeration(String),
    Command,
    String(String),
}

impl NodeValue {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeValue::Integer(_) => NodeType::Integer,
            NodeValue::Float(_) => NodeType::Float,
            NodeValue::Boolean(_) => NodeType::Boolean,
            NodeValue::Enumeration(_) => NodeType::Enumeration,
            NodeValue::Command => NodeType::Command,
            NodeValue::String(_) => NodeType::String,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            NodeValue::Integer(v) => Some(v as f64),
            NodeValue::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Integer(v) => write!(f, "{v}"),
            NodeValue::Float(v) => write!(f, "{v}"),
            NodeValue::Boolean(v) => write!(f, "{v}"),
            NodeValue::Enumeration(entry) => f.write_str(entry),
            NodeValue::Command => f.write_str("<command>"),
            NodeValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Node value as the adapter stores it: enumerations by integer code.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    EnumCode(i64),
    Command,
    String(String),
}

/// Snapshot of one node's identity and access state.
///
/// Availability depends on other nodes and may change after any write, so a
/// descriptor is only valid at the moment it was queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub name: String,
    pub value_type: NodeType,
    pub readable: bool,
    pub writable: bool,
    pub available: bool,
}

impl NodeDescriptor {
    pub fn can_read(&self) -> bool {
        self.available && self.readable
    }

    pub fn can_write(&self) -> bool {
        self.available && self.writable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(readable: bool, writable: bool, available: bool) -> NodeDescriptor {
        NodeDescriptor {
            name: "Gain".to_string(),
            value_type: NodeType::Float,
            readable,
            writable,
            available,
        }
    }

    #[test]
    fn test_access_requires_availability() {
        assert!(descriptor(true, true, true).can_read());
        assert!(descriptor(true, true, true).can_write());
        assert!(!descriptor(true, true, false).can_read());
        assert!(!descriptor(true, true, false).can_write());
        assert!(!descriptor(false, true, true).can_read());
        assert!(!descriptor(true, false, true).can_write());
    }

    #[test]
    fn test_value_tags() {
        assert_eq!(NodeValue::Float(1.0).node_type(), NodeType::Float);
        assert_eq!(
            NodeValue::Enumeration("Off".into()).node_type(),
            NodeType::Enumeration
        );
        assert_eq!(NodeValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(NodeValue::Boolean(true).as_f64(), None);
    }
}
