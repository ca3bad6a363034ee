mod buffer;
mod processor;
mod types;

pub use buffer::FrameBuffer;
pub use processor::{FrameProcessor, FrameStats};
pub use types::{ArcFrame, Frame, HdrImage};
