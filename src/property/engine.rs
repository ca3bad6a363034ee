use log::debug;

use super::id::PropertyId;
use super::rules::{
    EnumSwitch, GetProcedure, PropertyRule, RuleTable, SetProcedure, AUTO_CONTINUOUS, AUTO_OFF,
};
use super::value::{AutoOr, PropertyValue};
use crate::error::{CameraError, CameraResult};
use crate::node::{NodeAccessor, NodeMap, NodeType, NodeValue};

/// Translates generic properties into node reads and writes.
///
/// Holds no device state: every call is driven by the rule table and the
/// node tree as it is at that moment.
#[derive(Debug, Clone)]
pub struct PropertyEngine {
    rules: RuleTable,
}

impl Default for PropertyEngine {
    fn default() -> Self {
        Self::new(RuleTable::standard())
    }
}

impl PropertyEngine {
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn rule(&self, id: PropertyId) -> CameraResult<&PropertyRule> {
        self.rules
            .rule(id)
            .ok_or_else(|| CameraError::unsupported_property(id))
    }

    pub fn get_property<M: NodeMap>(
        &self,
        nodes: &NodeAccessor<M>,
        id: PropertyId,
    ) -> CameraResult<PropertyValue> {
        match &self.rule(id)?.get {
            GetProcedure::Node(node) => read_value(nodes, node),
            GetProcedure::Switch(switch) => read_switch(nodes, switch).map(PropertyValue::Boolean),
        }
    }

    /// Apply `value` to property `id`.
    ///
    /// The value is converted to the target node's type before anything is
    /// written, so a value of the wrong kind leaves the device untouched.
    /// Rules that write two nodes stop at the first failure and do not roll
    /// back: if the second write fails, the first one (enable flag or
    /// auto-mode change) stays applied. After an error, read the property or
    /// its nodes back to learn the actual device state.
    pub fn set_property<M: NodeMap>(
        &self,
        nodes: &mut NodeAccessor<M>,
        id: PropertyId,
        value: PropertyValue,
    ) -> CameraResult<()> {
        debug!("Set {} = {}", id, value);
        match &self.rule(id)?.set {
            SetProcedure::ReadOnly => Err(CameraError::ReadOnlyProperty(id)),
            SetProcedure::Direct(node) => {
                let value = convert(nodes, node, value)?;
                nodes.set_node_value(node, value)
            }
            SetProcedure::EnableThenSet { enable, node } => {
                let value = convert(nodes, node, value)?;
                nodes.set_node_value(enable, NodeValue::Boolean(true))?;
                nodes.set_node_value(node, value)
            }
            SetProcedure::AutoSentinel { mode, node } => match AutoOr::from_value(value) {
                AutoOr::Auto => nodes.set_enumeration(mode, AUTO_CONTINUOUS),
                AutoOr::Manual(value) => {
                    let value = convert(nodes, node, value)?;
                    nodes.set_enumeration(mode, AUTO_OFF)?;
                    nodes.set_node_value(node, value)
                }
            },
            SetProcedure::Switch(switch) => {
                let on = value.as_bool().ok_or_else(|| {
                    CameraError::type_mismatch(&switch.node, value.value_type(), NodeType::Boolean)
                })?;
                nodes.set_enumeration(&switch.node, switch.entry_for(on))
            }
        }
    }

    /// [`get_property`](Self::get_property) addressed by `CAP_PROP_*` code.
    pub fn get_property_code<M: NodeMap>(
        &self,
        nodes: &NodeAccessor<M>,
        code: i32,
    ) -> CameraResult<PropertyValue> {
        self.get_property(nodes, PropertyId::from_code(code)?)
    }

    pub fn set_property_code<M: NodeMap>(
        &self,
        nodes: &mut NodeAccessor<M>,
        code: i32,
        value: PropertyValue,
    ) -> CameraResult<()> {
        self.set_property(nodes, PropertyId::from_code(code)?, value)
    }
}

fn read_value<M: NodeMap>(nodes: &NodeAccessor<M>, node: &str) -> CameraResult<PropertyValue> {
    let value = nodes.node_value(node)?;
    PropertyValue::from_node_value(&value)
        .ok_or_else(|| CameraError::type_mismatch(node, NodeType::Float, value.node_type()))
}

fn read_switch<M: NodeMap>(nodes: &NodeAccessor<M>, switch: &EnumSwitch) -> CameraResult<bool> {
    let entry = nodes.enumeration(&switch.node)?;
    switch
        .value_of(&entry)
        .ok_or_else(|| CameraError::inconsistent_state(&switch.node, entry))
}

fn convert<M: NodeMap>(
    nodes: &NodeAccessor<M>,
    node: &str,
    value: PropertyValue,
) -> CameraResult<NodeValue> {
    let target = nodes.node_type(node)?;
    value
        .to_node_value(target)
        .ok_or_else(|| CameraError::type_mismatch(node, value.value_type(), target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{MemoryNodeMap, SimNode};
    use crate::property::rules::*;

    fn stub() -> NodeAccessor<MemoryNodeMap> {
        NodeAccessor::new(
            MemoryNodeMap::new()
                .recording_writes()
                .with_node(SimNode::integer(WIDTH, 1440, 16, 1440).read_only())
                .with_node(SimNode::float(DEVICE_TEMPERATURE, 41.5, -20.0, 100.0).read_only())
                .with_node(SimNode::enumeration(EXPOSURE_AUTO, &["Off", "Once", "Continuous"], "Continuous"))
                .with_node(
                    SimNode::float(EXPOSURE_TIME, 10_000.0, 6.0, 30_000_000.0)
                        .writable_when_entry(EXPOSURE_AUTO, "Off"),
                )
                .with_node(SimNode::boolean(GAMMA_ENABLE, false))
                .with_node(SimNode::float(GAMMA, 0.8, 0.25, 4.0).writable_when_true(GAMMA_ENABLE))
                .with_node(SimNode::enumeration(TRIGGER_MODE, &["Off", "On"], "Off")),
        )
    }

    #[test]
    fn test_read_only_properties_reject_writes() {
        let engine = PropertyEngine::default();
        let mut nodes = stub();
        assert_eq!(
            engine.set_property(&mut nodes, PropertyId::FrameWidth, 640.into()),
            Err(CameraError::ReadOnlyProperty(PropertyId::FrameWidth))
        );
        assert_eq!(
            engine.get_property(&nodes, PropertyId::FrameWidth),
            Ok(PropertyValue::Integer(1440))
        );
        assert_eq!(
            engine.get_property(&nodes, PropertyId::Temperature),
            Ok(PropertyValue::Float(41.5))
        );
        assert!(nodes.map().write_log().is_empty());
    }

    #[test]
    fn test_manual_exposure_switches_mode_first() {
        let engine = PropertyEngine::default();
        let mut nodes = stub();
        engine
            .set_property(&mut nodes, PropertyId::Exposure, 5000.into())
            .unwrap();
        assert_eq!(nodes.map().write_log(), [EXPOSURE_AUTO, EXPOSURE_TIME]);
        assert_eq!(nodes.map().entry(EXPOSURE_AUTO), Some("Off"));
        assert_eq!(
            engine.get_property(&nodes, PropertyId::Exposure),
            Ok(PropertyValue::Float(5000.0))
        );
    }

    #[test]
    fn test_auto_exposure_touches_only_the_mode() {
        let engine = PropertyEngine::default();
        let mut nodes = stub();
        engine
            .set_property(&mut nodes, PropertyId::Exposure, (-1).into())
            .unwrap();
        assert_eq!(nodes.map().write_log(), [EXPOSURE_AUTO]);
        assert_eq!(nodes.map().entry(EXPOSURE_AUTO), Some("Continuous"));
    }

    #[test]
    fn test_gamma_enables_before_writing() {
        let engine = PropertyEngine::default();
        let mut nodes = stub();
        engine
            .set_property(&mut nodes, PropertyId::Gamma, 1.5.into())
            .unwrap();
        assert_eq!(nodes.map().write_log(), [GAMMA_ENABLE, GAMMA]);
        assert_eq!(
            engine.get_property(&nodes, PropertyId::Gamma),
            Ok(PropertyValue::Float(1.5))
        );
    }

    #[test]
    fn test_switch_requires_boolean() {
        let engine = PropertyEngine::default();
        let mut nodes = stub();
        assert_eq!(
            engine.set_property(&mut nodes, PropertyId::Trigger, 1.into()),
            Err(CameraError::type_mismatch(
                TRIGGER_MODE,
                NodeType::Integer,
                NodeType::Boolean
            ))
        );
        assert!(nodes.map().write_log().is_empty());
    }

    #[test]
    fn test_missing_node_propagates_unchanged() {
        let engine = PropertyEngine::default();
        let mut nodes = stub();
        assert_eq!(
            engine.get_property(&nodes, PropertyId::Backlight),
            Err(CameraError::NodeNotFound(DEVICE_INDICATOR_MODE.into()))
        );
        assert_eq!(
            engine.set_property(&mut nodes, PropertyId::Fps, 30.0.into()),
            Err(CameraError::NodeNotFound(ACQUISITION_FRAME_RATE.into()))
        );
        assert!(nodes.map().write_log().is_empty());
    }

    #[test]
    fn test_wrong_kind_of_value_writes_nothing() {
        let engine = PropertyEngine::default();
        let mut nodes = stub();
        assert_eq!(
            engine.set_property(&mut nodes, PropertyId::Exposure, true.into()),
            Err(CameraError::type_mismatch(
                EXPOSURE_TIME,
                NodeType::Boolean,
                NodeType::Float
            ))
        );
        assert_eq!(
            engine.set_property(&mut nodes, PropertyId::Gamma, false.into()),
            Err(CameraError::type_mismatch(GAMMA, NodeType::Boolean, NodeType::Float))
        );
        assert!(nodes.map().write_log().is_empty());
        assert_eq!(nodes.map().entry(EXPOSURE_AUTO), Some("Continuous"));
        assert_eq!(nodes.map().bool_value(GAMMA_ENABLE), Some(false));
    }

    #[test]
    fn test_integer_node_takes_whole_floats_only() {
        let engine = PropertyEngine::new(
            RuleTable::empty().with_rule(PropertyId::Brightness, PropertyRule::direct("BlackLevelRaw")),
        );
        let mut nodes = NodeAccessor::new(
            MemoryNodeMap::new()
                .recording_writes()
                .with_node(SimNode::integer("BlackLevelRaw", 1, 1, 10)),
        );
        assert_eq!(
            engine.set_property(&mut nodes, PropertyId::Brightness, 2.5.into()),
            Err(CameraError::type_mismatch("BlackLevelRaw", NodeType::Float, NodeType::Integer))
        );
        assert!(nodes.map().write_log().is_empty());

        engine
            .set_property(&mut nodes, PropertyId::Brightness, 3.0.into())
            .unwrap();
        assert_eq!(
            engine.get_property(&nodes, PropertyId::Brightness),
            Ok(PropertyValue::Integer(3))
        );
    }

    #[test]
    fn test_rules_absent_from_table_are_unsupported() {
        let engine = PropertyEngine::new(RuleTable::standard().without(PropertyId::Gamma));
        let mut nodes = stub();
        assert_eq!(
            engine.get_property(&nodes, PropertyId::Gamma),
            Err(CameraError::UnsupportedProperty("gamma".into()))
        );
        assert_eq!(
            engine.set_property(&mut nodes, PropertyId::Gamma, 1.0.into()),
            Err(CameraError::UnsupportedProperty("gamma".into()))
        );
    }

    #[test]
    fn test_code_addressing() {
        let engine = PropertyEngine::default();
        let mut nodes = stub();
        assert_eq!(
            engine.get_property_code(&nodes, 3),
            Ok(PropertyValue::Integer(1440))
        );
        assert!(matches!(
            engine.get_property_code(&nodes, 27),
            Err(CameraError::UnsupportedProperty(_))
        ));
        assert!(matches!(
            engine.set_property_code(&mut nodes, 27, 1.0.into()),
            Err(CameraError::UnsupportedProperty(_))
        ));
    }
}
