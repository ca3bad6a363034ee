//! Generic capture properties for GenICam-style cameras.
//!
//! This library provides:
//! - Checked, by-name access to a device's node tree
//! - Translation of OpenCV-style capture properties (`CAP_PROP_*`) into node
//!   reads and writes through a static rule table
//! - A `VideoCapture` facade with averaging, exposure bracketing and HDR
//! - A simulated camera for running everything without hardware

pub mod camera;
pub mod capture;
pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod logging;
pub mod node;
pub mod property;

pub use camera::CameraConfig;
pub use capture::{HdrCapture, PropertySnapshot, VideoCapture};
pub use config::Config;
pub use device::{CameraDevice, ChannelCamera, SimulatedCamera};
pub use error::{AppError, CameraError, CameraResult, Result};
pub use frame::{Frame, FrameBuffer, FrameProcessor};
pub use node::{MemoryNodeMap, NodeAccessor, NodeMap, NodeType, NodeValue};
pub use property::{PropertyEngine, PropertyId, PropertyValue, RuleTable};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Set up logging and announce the library version.
///
/// # Arguments
///
/// * `verbosity` - 0 for info, 1 for debug, 2 or more for trace
/// * `log_file` - Optional path to a log file. If None, logs will only be output to stdout.
pub fn initialize(verbosity: u8, log_file: Option<&str>) -> anyhow::Result<()> {
    logging::setup_logging(verbosity, log_file)?;
    logging::log_app_start(VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty(), "Version should not be empty");
    }
}
