use serde::{Deserialize, Serialize};
use std::fmt;

use crate::node::{NodeType, NodeValue};

/// Value passed to or returned from a generic property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
}

/// Input value that switches an auto-capable property to automatic mode.
pub const AUTO_SENTINEL: f64 = -1.0;

impl PropertyValue {
    pub fn as_f64(self) -> Option<f64> {
        match self {
            PropertyValue::Integer(v) => Some(v as f64),
            PropertyValue::Float(v) => Some(v),
            PropertyValue::Boolean(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn value_type(self) -> NodeType {
        match self {
            PropertyValue::Boolean(_) => NodeType::Boolean,
            PropertyValue::Integer(_) => NodeType::Integer,
            PropertyValue::Float(_) => NodeType::Float,
        }
    }

    /// Convert for a write to a node of type `target`.
    ///
    /// Float nodes take integers too; integer nodes take floats only when
    /// they have no fractional part.
    pub fn to_node_value(self, target: NodeType) -> Option<NodeValue> {
        match (target, self) {
            (NodeType::Integer, PropertyValue::Integer(v)) => Some(NodeValue::Integer(v)),
            (NodeType::Integer, PropertyValue::Float(v))
                if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 =>
            {
                Some(NodeValue::Integer(v as i64))
            }
            (NodeType::Float, PropertyValue::Float(v)) => Some(NodeValue::Float(v)),
            (NodeType::Float, PropertyValue::Integer(v)) => Some(NodeValue::Float(v as f64)),
            (NodeType::Boolean, PropertyValue::Boolean(v)) => Some(NodeValue::Boolean(v)),
            _ => None,
        }
    }

    pub fn from_node_value(value: &NodeValue) -> Option<Self> {
        match *value {
            NodeValue::Integer(v) => Some(PropertyValue::Integer(v)),
            NodeValue::Float(v) => Some(PropertyValue::Float(v)),
            NodeValue::Boolean(v) => Some(PropertyValue::Boolean(v)),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Boolean(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Integer(i64::from(v))
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(f64::from(v))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(v) => write!(f, "{v}"),
            PropertyValue::Integer(v) => write!(f, "{v}"),
            PropertyValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Requested mode of a property whose auto and manual modes are mutually
/// exclusive entries of one device enumeration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoOr<T> {
    Auto,
    Manual(T),
}

impl AutoOr<PropertyValue> {
    /// `-1` (integer or float) selects auto mode.
    pub fn from_value(value: PropertyValue) -> Self {
        match value.as_f64() {
            Some(v) if v == AUTO_SENTINEL => AutoOr::Auto,
            _ => AutoOr::Manual(value),
        }
    }
}
