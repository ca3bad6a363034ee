//! Collaborators behind the capture facade: a connected device's node tree
//! plus the stream of frames it acquires.

mod channel;
mod simulated;

pub use channel::ChannelCamera;
pub use simulated::{simulated_node_map, SimulatedCamera};

use crate::error::CameraResult;
use crate::frame::Frame;
use crate::node::NodeMap;

/// An already-connected camera.
///
/// Opening, acquisition start/stop and frame transport are the
/// implementation's business; the facade only uses the node tree, the next
/// frame, and teardown.
pub trait CameraDevice {
    type Nodes: NodeMap;

    fn nodes(&self) -> &Self::Nodes;

    fn nodes_mut(&mut self) -> &mut Self::Nodes;

    /// Block until the next acquired frame is available.
    fn next_frame(&mut self) -> CameraResult<Frame>;

    /// Release the connection. Calling it twice is harmless.
    fn release(&mut self);
}
