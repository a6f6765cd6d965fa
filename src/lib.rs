//! Multiverse map: force-directed layout of simulations and their
//! cross-simulation connections.

pub mod graph;
pub mod settings;
pub mod theme;

pub use graph::{
    initialize_positions, run_simulation, simulate_tick, ForceLayout, LayoutAnimation, MapData,
    MapEdge, MapNode, RunLimits, RunSummary,
};
