mod camera;
mod scene;

pub use camera::{Camera, Projection};
pub use scene::{Node, NodeId, Scene};
pub use vantage_base::{Error, Result};
