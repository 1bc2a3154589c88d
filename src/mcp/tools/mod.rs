pub mod bundle_visuals;
pub mod generate_visual;
pub mod registry;

pub use registry::{ToolDescriptor, ToolRegistry};
