pub mod common;
pub mod community;
pub mod layout;

pub use common::GraphView;
pub use community::{weakly_connected_components, WccResult};
pub use layout::{spring_layout, LayoutConfig, LARGE_GRAPH_THRESHOLD};
