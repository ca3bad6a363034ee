mod loader;

pub use loader::{Config, StreamConfig};
