use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CameraError;

/// Generic capture property identifiers.
///
/// The numeric codes are those of OpenCV's `CAP_PROP_*` constants, so code
/// written against that vocabulary can address the same properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyId {
    FrameWidth,
    FrameHeight,
    Fps,
    Brightness,
    Gain,
    Exposure,
    Gamma,
    Temperature,
    Trigger,
    TriggerDelay,
    Backlight,
    AutoWb,
}

impl PropertyId {
    pub const ALL: [PropertyId; 12] = [
        PropertyId::FrameWidth,
        PropertyId::FrameHeight,
        PropertyId::Fps,
        PropertyId::Brightness,
        PropertyId::Gain,
        PropertyId::Exposure,
        PropertyId::Gamma,
        PropertyId::Temperature,
        PropertyId::Trigger,
        PropertyId::TriggerDelay,
        PropertyId::Backlight,
        PropertyId::AutoWb,
    ];

    pub fn code(self) -> i32 {
        match self {
            PropertyId::FrameWidth => 3,
            PropertyId::FrameHeight => 4,
            PropertyId::Fps => 5,
            PropertyId::Brightness => 10,
            PropertyId::Gain => 14,
            PropertyId::Exposure => 15,
            PropertyId::Gamma => 22,
            PropertyId::Temperature => 23,
            PropertyId::Trigger => 24,
            PropertyId::TriggerDelay => 25,
            PropertyId::Backlight => 32,
            PropertyId::AutoWb => 44,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, CameraError> {
        Self::ALL
            .into_iter()
            .find(|id| id.code() == code)
            .ok_or_else(|| CameraError::unsupported_property(format!("code {code}")))
    }

    pub fn name(self) -> &'static str {
        match self {
            PropertyId::FrameWidth => "frame_width",
            PropertyId::FrameHeight => "frame_height",
            PropertyId::Fps => "fps",
            PropertyId::Brightness => "brightness",
            PropertyId::Gain => "gain",
            PropertyId::Exposure => "exposure",
            PropertyId::Gamma => "gamma",
            PropertyId::Temperature => "temperature",
            PropertyId::Trigger => "trigger",
            PropertyId::TriggerDelay => "trigger_delay",
            PropertyId::Backlight => "backlight",
            PropertyId::AutoWb => "auto_wb",
        }
    }
}

impl TryFrom<i32> for PropertyId {
    type Error = CameraError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl FromStr for PropertyId {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| CameraError::unsupported_property(s))
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for id in PropertyId::ALL {
            assert_eq!(PropertyId::from_code(id.code()), Ok(id));
            assert_eq!(id.name().parse::<PropertyId>(), Ok(id));
        }
    }

    #[test]
    fn test_unknown_codes_are_unsupported() {
        // CAP_PROP_POS_MSEC, CAP_PROP_ZOOM
        for code in [0, 27, -1, 1000] {
            assert!(matches!(
                PropertyId::try_from(code),
                Err(CameraError::UnsupportedProperty(_))
            ));
        }
        assert!("zoom".parse::<PropertyId>().is_err());
    }

    #[test]
    fn test_parse_is_lenient_about_case_and_dashes() {
        assert_eq!("Trigger-Delay".parse::<PropertyId>(), Ok(PropertyId::TriggerDelay));
        assert_eq!(" AUTO_WB ".parse::<PropertyId>(), Ok(PropertyId::AutoWb));
    }
}
