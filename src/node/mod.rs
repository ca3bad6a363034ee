mod accessor;
mod map;
pub mod memory;
mod types;

pub use accessor::NodeAccessor;
pub use map::NodeMap;
pub use memory::{MemoryNodeMap, SimNode};
pub use types::{NodeDescriptor, NodeType, NodeValue, RawValue};
