//! In-memory node map.
//!
//! Backs the simulated camera and doubles as the device stub in tests: it
//! counts writes per node (and can record their order), can be told to fail
//! writes to a given node, and supports availability/writability that
//! depends on other nodes.

use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::map::NodeMap;
use super::types::{NodeDescriptor, NodeType, RawValue};
use crate::error::{CameraError, CameraResult};

/// Condition on another node's current value.
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    BoolIs(String, bool),
    EntryIs(String, String),
}

/// One node of a [`MemoryNodeMap`].
#[derive(Debug, Clone)]
pub struct SimNode {
    name: String,
    value_type: NodeType,
    value: RawValue,
    readable: bool,
    writable: bool,
    limits: Option<(f64, f64)>,
    entries: Vec<String>,
    available_when: Option<Condition>,
    writable_when: Option<Condition>,
}

impl SimNode {
    fn new(name: &str, value_type: NodeType, value: RawValue) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            value,
            readable: true,
            writable: true,
            limits: None,
            entries: Vec::new(),
            available_when: None,
            writable_when: None,
        }
    }

    pub fn integer(name: &str, value: i64, min: i64, max: i64) -> Self {
        let mut node = Self::new(name, NodeType::Integer, RawValue::Integer(value));
        node.limits = Some((min as f64, max as f64));
        node
    }

    pub fn float(name: &str, value: f64, min: f64, max: f64) -> Self {
        let mut node = Self::new(name, NodeType::Float, RawValue::Float(value));
        node.limits = Some((min, max));
        node
    }

    pub fn boolean(name: &str, value: bool) -> Self {
        Self::new(name, NodeType::Boolean, RawValue::Boolean(value))
    }

    /// Entry codes are the positions in `entries`. An unknown `current`
    /// falls back to the first entry.
    pub fn enumeration(name: &str, entries: &[&str], current: &str) -> Self {
        let code = entries.iter().position(|e| *e == current).unwrap_or(0);
        let mut node = Self::new(name, NodeType::Enumeration, RawValue::EnumCode(code as i64));
        node.entries = entries.iter().map(|e| e.to_string()).collect();
        node
    }

    pub fn command(name: &str) -> Self {
        let mut node = Self::new(name, NodeType::Command, RawValue::Command);
        node.readable = false;
        node
    }

    pub fn string(name: &str, value: &str) -> Self {
        Self::new(name, NodeType::String, RawValue::String(value.to_string()))
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub fn writable_when_true(mut self, node: &str) -> Self {
        self.writable_when = Some(Condition::BoolIs(node.to_string(), true));
        self
    }

    pub fn writable_when_entry(mut self, node: &str, entry: &str) -> Self {
        self.writable_when = Some(Condition::EntryIs(node.to_string(), entry.to_string()));
        self
    }

    pub fn available_when_entry(mut self, node: &str, entry: &str) -> Self {
        self.available_when = Some(Condition::EntryIs(node.to_string(), entry.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Recomputes a node's value from the rest of the map after each write.
pub type Derivation = fn(&MemoryNodeMap) -> Option<RawValue>;

#[derive(Default)]
pub struct MemoryNodeMap {
    nodes: BTreeMap<String, SimNode>,
    derived: Vec<(String, Derivation)>,
    failures: HashMap<String, CameraError>,
    write_counts: HashMap<String, usize>,
    write_log: Option<Vec<String>>,
}

impl fmt::Debug for MemoryNodeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryNodeMap")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("failures", &self.failures)
            .field("writes", &self.write_counts.values().sum::<usize>())
            .finish()
    }
}

impl MemoryNodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: SimNode) -> Self {
        self.insert(node);
        self
    }

    pub fn with_derived(mut self, name: &str, derivation: Derivation) -> Self {
        self.derived.push((name.to_string(), derivation));
        self.refresh_derived();
        self
    }

    pub fn insert(&mut self, node: SimNode) {
        self.nodes.insert(node.name.clone(), node);
    }

    /// Make every subsequent write to `name` fail with `error`.
    pub fn fail_writes_to(&mut self, name: &str, error: CameraError) {
        self.failures.insert(name.to_string(), error);
    }

    /// Also record the order of successful writes; see
    /// [`write_log`](Self::write_log).
    pub fn recording_writes(mut self) -> Self {
        self.write_log = Some(Vec::new());
        self
    }

    /// Names of the nodes written so far, in order. Empty unless built with
    /// [`recording_writes`](Self::recording_writes). Failed writes are not
    /// recorded.
    pub fn write_log(&self) -> &[String] {
        self.write_log.as_deref().unwrap_or(&[])
    }

    /// Successful writes to `name`, counted whether or not the order is
    /// recorded.
    pub fn writes_to(&self, name: &str) -> usize {
        self.write_counts.get(name).copied().unwrap_or(0)
    }

    /// Overwrite a node's value, bypassing every check. Simulates changes
    /// made by the device itself.
    pub fn force(&mut self, name: &str, value: RawValue) {
        if let Some(node) = self.nodes.get_mut(name) {
            node.value = value;
        }
        self.refresh_derived();
    }

    /// Force an enumeration node to `entry`, which must be in its domain.
    pub fn force_entry(&mut self, name: &str, entry: &str) {
        let code = self
            .nodes
            .get(name)
            .and_then(|node| node.entries.iter().position(|e| e == entry));
        if let Some(code) = code {
            self.force(name, RawValue::EnumCode(code as i64));
        }
    }

    pub fn raw(&self, name: &str) -> Option<&RawValue> {
        self.nodes.get(name).map(|node| &node.value)
    }

    pub fn float_value(&self, name: &str) -> Option<f64> {
        match self.raw(name)? {
            RawValue::Float(v) => Some(*v),
            RawValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn bool_value(&self, name: &str) -> Option<bool> {
        match self.raw(name)? {
            RawValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn entry(&self, name: &str) -> Option<&str> {
        let node = self.nodes.get(name)?;
        match node.value {
            RawValue::EnumCode(code) => usize::try_from(code)
                .ok()
                .and_then(|idx| node.entries.get(idx))
                .map(String::as_str),
            _ => None,
        }
    }

    fn holds(&self, condition: &Option<Condition>) -> bool {
        match condition {
            None => true,
            Some(Condition::BoolIs(node, expected)) => self.bool_value(node) == Some(*expected),
            Some(Condition::EntryIs(node, expected)) => self.entry(node) == Some(expected.as_str()),
        }
    }

    fn refresh_derived(&mut self) {
        let derived = self.derived.clone();
        for (name, derivation) in derived {
            if let Some(value) = derivation(self) {
                if let Some(node) = self.nodes.get_mut(&name) {
                    node.value = value;
                }
            }
        }
    }

    fn check_value(node: &SimNode, value: &RawValue) -> CameraResult<()> {
        let name = node.name.as_str();
        let numeric = match (node.value_type, value) {
            (NodeType::Integer, RawValue::Integer(v)) => Some(*v as f64),
            (NodeType::Float, RawValue::Float(v)) => Some(*v),
            (NodeType::Boolean, RawValue::Boolean(_))
            | (NodeType::Command, RawValue::Command)
            | (NodeType::String, RawValue::String(_)) => None,
            (NodeType::Enumeration, RawValue::EnumCode(code)) => {
                let known = usize::try_from(*code).is_ok_and(|idx| idx < node.entries.len());
                if !known {
                    return Err(CameraError::out_of_range(
                        name,
                        code,
                        "not in the enumeration domain",
                    ));
                }
                None
            }
            (_, other) => {
                return Err(CameraError::device(format!(
                    "{other:?} cannot be stored in {} node '{name}'",
                    node.value_type
                )))
            }
        };

        if let (Some(v), Some((min, max))) = (numeric, node.limits) {
            if !v.is_finite() || v < min || v > max {
                return Err(CameraError::out_of_range(
                    name,
                    v,
                    format!("must be in the range of [{min}, {max}]"),
                ));
            }
        }
        Ok(())
    }
}

impl NodeMap for MemoryNodeMap {
    fn descriptor(&self, name: &str) -> Option<NodeDescriptor> {
        let node = self.nodes.get(name)?;
        Some(NodeDescriptor {
            name: node.name.clone(),
            value_type: node.value_type,
            readable: node.readable,
            writable: node.writable && self.holds(&node.writable_when),
            available: self.holds(&node.available_when),
        })
    }

    fn read(&self, name: &str) -> CameraResult<RawValue> {
        self.nodes
            .get(name)
            .map(|node| node.value.clone())
            .ok_or_else(|| CameraError::node_not_found(name))
    }

    fn write(&mut self, name: &str, value: RawValue) -> CameraResult<()> {
        if let Some(error) = self.failures.get(name) {
            return Err(error.clone());
        }
        let node = self
            .nodes
            .get_mut(name)
            .ok_or_else(|| CameraError::node_not_found(name))?;
        Self::check_value(node, &value)?;

        debug!("Node {} <- {:?}", name, value);
        if node.value_type != NodeType::Command {
            node.value = value;
        }
        *self.write_counts.entry(name.to_string()).or_insert(0) += 1;
        if let Some(log) = self.write_log.as_mut() {
            log.push(name.to_string());
        }
        self.refresh_derived();
        Ok(())
    }

    fn enum_entry_code(&self, node: &str, entry: &str) -> Option<i64> {
        self.nodes
            .get(node)?
            .entries
            .iter()
            .position(|e| e == entry)
            .and_then(|idx| i64::try_from(idx).ok())
    }

    fn enum_entry_name(&self, node: &str, code: i64) -> Option<String> {
        let idx = usize::try_from(code).ok()?;
        self.nodes.get(node)?.entries.get(idx).cloned()
    }

    fn numeric_limits(&self, name: &str) -> Option<(f64, f64)> {
        self.nodes.get(name)?.limits
    }

    fn node_names(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }
}
