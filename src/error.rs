use thiserror::Error;

use crate::node::NodeType;
use crate::property::PropertyId;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Frame processing error: {0}")]
    FrameProcessing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Failures raised by the node accessor, the property engine and the
/// device collaborators behind the capture facade.
///
/// None of these are fatal. A failed multi-node `set` may have left the
/// device partially changed; re-read to confirm the actual state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Node '{0}' does not exist")]
    NodeNotFound(String),

    #[error("Node '{0}' is not readable")]
    NotReadable(String),

    #[error("Node '{0}' is not writable")]
    NotWritable(String),

    #[error("Node '{node}' holds {actual} values, not {expected}")]
    TypeMismatch {
        node: String,
        expected: NodeType,
        actual: NodeType,
    },

    #[error("Value {value} rejected by node '{node}': {reason}")]
    OutOfRange {
        node: String,
        value: String,
        reason: String,
    },

    #[error("Node '{node}' has no enumeration entry '{entry}'")]
    UnknownEnumEntry { node: String, entry: String },

    #[error("Property {0} is not supported")]
    UnsupportedProperty(String),

    #[error("Property {0} is read-only")]
    ReadOnlyProperty(PropertyId),

    #[error("Node '{node}' reports unexpected entry '{entry}'")]
    InconsistentDeviceState { node: String, entry: String },

    #[error("Camera is not open")]
    NotOpened,

    #[error("Failed to capture frame: {0}")]
    FrameCapture(String),

    #[error("Device error: {0}")]
    Device(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Result type for the translation core and device collaborators.
pub type CameraResult<T> = std::result::Result<T, CameraError>;

// Helper functions for creating errors
impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    pub fn frame_processing(msg: impl Into<String>) -> Self {
        AppError::FrameProcessing(msg.into())
    }
}

impl CameraError {
    pub fn node_not_found(node: impl Into<String>) -> Self {
        CameraError::NodeNotFound(node.into())
    }

    pub fn not_readable(node: impl Into<String>) -> Self {
        CameraError::NotReadable(node.into())
    }

    pub fn not_writable(node: impl Into<String>) -> Self {
        CameraError::NotWritable(node.into())
    }

    pub fn type_mismatch(node: impl Into<String>, expected: NodeType, actual: NodeType) -> Self {
        CameraError::TypeMismatch {
            node: node.into(),
            expected,
            actual,
        }
    }

    pub fn out_of_range(
        node: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        CameraError::OutOfRange {
            node: node.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unknown_enum_entry(node: impl Into<String>, entry: impl Into<String>) -> Self {
        CameraError::UnknownEnumEntry {
            node: node.into(),
            entry: entry.into(),
        }
    }

    pub fn unsupported_property(what: impl ToString) -> Self {
        CameraError::UnsupportedProperty(what.to_string())
    }

    pub fn inconsistent_state(node: impl Into<String>, entry: impl Into<String>) -> Self {
        CameraError::InconsistentDeviceState {
            node: node.into(),
            entry: entry.into(),
        }
    }

    pub fn frame_capture(msg: impl Into<String>) -> Self {
        CameraError::FrameCapture(msg.into())
    }

    pub fn device(msg: impl Into<String>) -> Self {
        CameraError::Device(msg.into())
    }
}
