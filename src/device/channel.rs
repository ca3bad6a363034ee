use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info};
use std::time::Duration;

use super::CameraDevice;
use crate::error::{CameraError, CameraResult};
use crate::frame::Frame;
use crate::node::NodeMap;

/// Node tree paired with frames pushed by an acquisition thread.
pub struct ChannelCamera<M> {
    nodes: M,
    frames: Option<Receiver<Frame>>,
    timeout: Option<Duration>,
}

impl<M: NodeMap> ChannelCamera<M> {
    pub fn new(nodes: M, frames: Receiver<Frame>) -> Self {
        Self {
            nodes,
            frames: Some(frames),
            timeout: None,
        }
    }

    /// Give up waiting for a frame after `timeout` instead of blocking.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl<M: NodeMap> CameraDevice for ChannelCamera<M> {
    type Nodes = M;

    fn nodes(&self) -> &M {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut M {
        &mut self.nodes
    }

    fn next_frame(&mut self) -> CameraResult<Frame> {
        let frames = self
            .frames
            .as_ref()
            .ok_or_else(|| CameraError::frame_capture("acquisition stream released"))?;

        let frame = match self.timeout {
            Some(timeout) => frames.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => {
                    CameraError::frame_capture(format!("no frame within {timeout:?}"))
                }
                RecvTimeoutError::Disconnected => {
                    CameraError::frame_capture("acquisition stream closed")
                }
            })?,
            None => frames
                .recv()
                .map_err(|_| CameraError::frame_capture("acquisition stream closed"))?,
        };
        debug!("Received frame {}", frame.nframe);
        Ok(frame)
    }

    fn release(&mut self) {
        if self.frames.take().is_some() {
            info!("Released acquisition stream");
        }
    }
}
