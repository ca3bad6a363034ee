use std::collections::{BTreeMap, HashSet};

use super::id::PropertyId;

// Standard Feature Naming Convention node names used by the standard table.
pub const WIDTH: &str = "Width";
pub const HEIGHT: &str = "Height";
pub const ACQUISITION_FRAME_RATE_ENABLE: &str = "AcquisitionFrameRateEnable";
pub const ACQUISITION_FRAME_RATE: &str = "AcquisitionFrameRate";
pub const ACQUISITION_RESULTING_FRAME_RATE: &str = "AcquisitionResultingFrameRate";
pub const EV_COMPENSATION: &str = "AutoExposureEVCompensation";
pub const GAIN_AUTO: &str = "GainAuto";
pub const GAIN: &str = "Gain";
pub const EXPOSURE_AUTO: &str = "ExposureAuto";
pub const EXPOSURE_TIME: &str = "ExposureTime";
pub const GAMMA_ENABLE: &str = "GammaEnable";
pub const GAMMA: &str = "Gamma";
pub const DEVICE_TEMPERATURE: &str = "DeviceTemperature";
pub const TRIGGER_MODE: &str = "TriggerMode";
pub const TRIGGER_DELAY: &str = "TriggerDelay";
pub const DEVICE_INDICATOR_MODE: &str = "DeviceIndicatorMode";
pub const BALANCE_WHITE_AUTO: &str = "BalanceWhiteAuto";
pub const TRIGGER_SELECTOR: &str = "TriggerSelector";
pub const TRIGGER_SOURCE: &str = "TriggerSource";
pub const TRIGGER_SOFTWARE: &str = "TriggerSoftware";

/// Mode entry selecting automatic control.
pub const AUTO_CONTINUOUS: &str = "Continuous";
/// Mode entry selecting manual control.
pub const AUTO_OFF: &str = "Off";

/// A two-entry view of an enumeration node, read and written as a boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSwitch {
    pub node: String,
    pub on: String,
    pub off: String,
}

impl EnumSwitch {
    pub fn new(node: &str, on: &str, off: &str) -> Self {
        Self {
            node: node.to_string(),
            on: on.to_string(),
            off: off.to_string(),
        }
    }

    pub fn entry_for(&self, value: bool) -> &str {
        if value {
            &self.on
        } else {
            &self.off
        }
    }

    /// `None` when `entry` is neither of the two expected entries.
    pub fn value_of(&self, entry: &str) -> Option<bool> {
        if entry == self.on {
            Some(true)
        } else if entry == self.off {
            Some(false)
        } else {
            None
        }
    }
}

/// How a property's value is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetProcedure {
    /// Read an integer, float or boolean node as-is.
    Node(String),
    /// Read an enumeration and map its entry back to a boolean.
    Switch(EnumSwitch),
}

/// How a property's value is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetProcedure {
    ReadOnly,
    Direct(String),
    /// Write `enable` to `true`, then the value to `node`.
    EnableThenSet { enable: String, node: String },
    /// The sentinel selects `Continuous` on `mode`; any other value selects
    /// `Off` and is then written to `node`.
    AutoSentinel { mode: String, node: String },
    Switch(EnumSwitch),
}

/// Static translation of one generic property to device nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRule {
    pub get: GetProcedure,
    pub set: SetProcedure,
}

impl PropertyRule {
    pub fn read_only(node: &str) -> Self {
        Self {
            get: GetProcedure::Node(node.to_string()),
            set: SetProcedure::ReadOnly,
        }
    }

    pub fn direct(node: &str) -> Self {
        Self {
            get: GetProcedure::Node(node.to_string()),
            set: SetProcedure::Direct(node.to_string()),
        }
    }

    /// `report` is the node read back, which may differ from the node
    /// written (requested vs. achieved values).
    pub fn enable_then_set(enable: &str, node: &str, report: &str) -> Self {
        Self {
            get: GetProcedure::Node(report.to_string()),
            set: SetProcedure::EnableThenSet {
                enable: enable.to_string(),
                node: node.to_string(),
            },
        }
    }

    pub fn auto_sentinel(mode: &str, node: &str) -> Self {
        Self {
            get: GetProcedure::Node(node.to_string()),
            set: SetProcedure::AutoSentinel {
                mode: mode.to_string(),
                node: node.to_string(),
            },
        }
    }

    pub fn switch(node: &str, on: &str, off: &str) -> Self {
        let switch = EnumSwitch::new(node, on, off);
        Self {
            get: GetProcedure::Switch(switch.clone()),
            set: SetProcedure::Switch(switch),
        }
    }

    pub fn supports_auto(&self) -> bool {
        matches!(self.set, SetProcedure::AutoSentinel { .. })
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.set, SetProcedure::ReadOnly)
    }

    /// Every node the rule touches, get source first.
    pub fn nodes(&self) -> Vec<&str> {
        let mut nodes = vec![match &self.get {
            GetProcedure::Node(node) => node.as_str(),
            GetProcedure::Switch(switch) => switch.node.as_str(),
        }];
        let written: Vec<&str> = match &self.set {
            SetProcedure::ReadOnly => Vec::new(),
            SetProcedure::Direct(node) => vec![node.as_str()],
            SetProcedure::EnableThenSet { enable, node } => vec![enable.as_str(), node.as_str()],
            SetProcedure::AutoSentinel { mode, node } => vec![mode.as_str(), node.as_str()],
            SetProcedure::Switch(switch) => vec![switch.node.as_str()],
        };
        for node in written {
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }
        nodes
    }
}

/// Immutable lookup from property to rule, injected into the engine.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: BTreeMap<PropertyId, PropertyRule>,
}

impl RuleTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rules for SFNC-compliant devices.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(PropertyId::FrameWidth, PropertyRule::read_only(WIDTH))
            .with_rule(PropertyId::FrameHeight, PropertyRule::read_only(HEIGHT))
            .with_rule(
                PropertyId::Fps,
                PropertyRule::enable_then_set(
                    ACQUISITION_FRAME_RATE_ENABLE,
                    ACQUISITION_FRAME_RATE,
                    ACQUISITION_RESULTING_FRAME_RATE,
                ),
            )
            .with_rule(PropertyId::Brightness, PropertyRule::direct(EV_COMPENSATION))
            .with_rule(PropertyId::Gain, PropertyRule::auto_sentinel(GAIN_AUTO, GAIN))
            .with_rule(
                PropertyId::Exposure,
                PropertyRule::auto_sentinel(EXPOSURE_AUTO, EXPOSURE_TIME),
            )
            .with_rule(
                PropertyId::Gamma,
                PropertyRule::enable_then_set(GAMMA_ENABLE, GAMMA, GAMMA),
            )
            .with_rule(PropertyId::Temperature, PropertyRule::read_only(DEVICE_TEMPERATURE))
            .with_rule(PropertyId::Trigger, PropertyRule::switch(TRIGGER_MODE, "On", "Off"))
            .with_rule(PropertyId::TriggerDelay, PropertyRule::direct(TRIGGER_DELAY))
            .with_rule(
                PropertyId::Backlight,
                PropertyRule::switch(DEVICE_INDICATOR_MODE, "Active", "Inactive"),
            )
            .with_rule(
                PropertyId::AutoWb,
                PropertyRule::switch(BALANCE_WHITE_AUTO, AUTO_CONTINUOUS, AUTO_OFF),
            )
    }

    pub fn with_rule(mut self, id: PropertyId, rule: PropertyRule) -> Self {
        self.rules.insert(id, rule);
        self
    }

    pub fn without(mut self, id: PropertyId) -> Self {
        self.rules.remove(&id);
        self
    }

    pub fn rule(&self, id: PropertyId) -> Option<&PropertyRule> {
        self.rules.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.rules.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Nodes touched by more than one property.
    pub fn shared_nodes(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut shared = Vec::new();
        for rule in self.rules.values() {
            for node in rule.nodes() {
                if !seen.insert(node) && !shared.iter().any(|s: &String| s == node) {
                    shared.push(node.to_string());
                }
            }
        }
        shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_covers_every_property() {
        let table = RuleTable::standard();
        assert_eq!(table.len(), PropertyId::ALL.len());
        for id in PropertyId::ALL {
            assert!(table.rule(id).is_some(), "{id} missing");
        }
    }

    #[test]
    fn test_standard_table_has_no_shared_nodes() {
        assert!(RuleTable::standard().shared_nodes().is_empty());
    }

    #[test]
    fn test_auto_capable_properties() {
        let table = RuleTable::standard();
        let auto: Vec<PropertyId> = table
            .ids()
            .filter(|id| table.rule(*id).is_some_and(PropertyRule::supports_auto))
            .collect();
        assert_eq!(auto, vec![PropertyId::Gain, PropertyId::Exposure]);
    }

    #[test]
    fn test_read_only_properties() {
        let table = RuleTable::standard();
        let read_only: Vec<PropertyId> = table
            .ids()
            .filter(|id| table.rule(*id).is_some_and(PropertyRule::is_read_only))
            .collect();
        assert_eq!(
            read_only,
            vec![
                PropertyId::FrameWidth,
                PropertyId::FrameHeight,
                PropertyId::Temperature
            ]
        );
    }

    #[test]
    fn test_fps_reports_resulting_rate() {
        let table = RuleTable::standard();
        let rule = table.rule(PropertyId::Fps).unwrap();
        assert_eq!(
            rule.get,
            GetProcedure::Node(ACQUISITION_RESULTING_FRAME_RATE.to_string())
        );
        assert_eq!(
            rule.nodes(),
            vec![
                ACQUISITION_RESULTING_FRAME_RATE,
                ACQUISITION_FRAME_RATE_ENABLE,
                ACQUISITION_FRAME_RATE
            ]
        );
    }

    #[test]
    fn test_switch_mapping() {
        let switch = EnumSwitch::new(DEVICE_INDICATOR_MODE, "Active", "Inactive");
        assert_eq!(switch.entry_for(true), "Active");
        assert_eq!(switch.value_of("Inactive"), Some(false));
        assert_eq!(switch.value_of("ErrorStatus"), None);
    }

    #[test]
    fn test_without_removes_rule() {
        let table = RuleTable::standard().without(PropertyId::Gamma);
        assert!(table.rule(PropertyId::Gamma).is_none());
        assert_eq!(table.len(), PropertyId::ALL.len() - 1);
    }
}
