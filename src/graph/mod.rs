//! Map data structures and layout algorithms.

pub mod animation;
pub mod curve;
pub mod layout;
pub mod types;

pub use animation::LayoutAnimation;
pub use curve::EdgeCurve;
pub use layout::{initialize_positions, run_simulation, simulate_tick, ForceLayout, RunLimits, RunSummary};
pub use types::{ConnectionType, MapData, MapEdge, MapFileError, MapNode};
