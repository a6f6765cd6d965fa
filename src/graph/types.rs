//! Map data types matching the simulation API payload.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Kind of cross-simulation connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// Echo bleed between two simulations
    #[default]
    Echo,
    /// Diplomatic embassy link
    Embassy,
}

impl ConnectionType {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionType::Echo => "Echo",
            ConnectionType::Embassy => "Embassy",
        }
    }
}

/// A simulation on the multiverse map.
///
/// Display attributes are carried through untouched; the layout engine
/// only reads and writes `x`, `y`, `vx` and `vy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub agent_count: u32,
    #[serde(default)]
    pub building_count: u32,
    #[serde(default)]
    pub event_count: u32,
    #[serde(default)]
    pub echo_count: u32,
    #[serde(default)]
    pub banner_url: Option<String>,

    // Physical state, owned by the layout engine
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub vx: f32,
    #[serde(default)]
    pub vy: f32,
}

impl MapNode {
    /// Create a node with only identity set; counts zero, resting at the origin.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            slug: id.clone(),
            id,
            name: name.into(),
            theme: String::new(),
            agent_count: 0,
            building_count: 0,
            event_count: 0,
            echo_count: 0,
            banner_url: None,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
        }
    }

    /// Builder-style theme setter
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Builder-style position/velocity setter
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn moving(mut self, vx: f32, vy: f32) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    /// Squared speed, the node's contribution to layout energy
    pub fn speed_sq(&self) -> f32 {
        self.vx * self.vx + self.vy * self.vy
    }

    pub fn distance_to(&self, other: &MapNode) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// One-line stats summary: agents / buildings / events
    pub fn stats_label(&self) -> String {
        format!(
            "{}A / {}B / {}E",
            self.agent_count, self.building_count, self.event_count
        )
    }
}

fn default_strength() -> f32 {
    1.0
}

/// An undirected connection between two simulations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapEdge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub bleed_vectors: Vec<String>,
    /// Spring stiffness multiplier, roughly 0.0 - 2.0
    #[serde(default = "default_strength")]
    pub strength: f32,
}

impl MapEdge {
    /// Create an echo edge with id `source-target`
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>, strength: f32) -> Self {
        let source_id = source_id.into();
        let target_id = target_id.into();
        Self {
            id: format!("{}-{}", source_id, target_id),
            source_id,
            target_id,
            connection_type: ConnectionType::Echo,
            bleed_vectors: Vec::new(),
            strength,
        }
    }

    pub fn is_self_edge(&self) -> bool {
        self.source_id == self.target_id
    }
}

/// Errors raised while reading map data files
#[derive(Debug, Error)]
pub enum MapFileError {
    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid map data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Theme tags used when generating a demo multiverse
const DEMO_THEMES: &[&str] = &[
    "dystopian",
    "fantasy",
    "utopian",
    "scifi",
    "historical",
    "custom",
    "deep-space-horror",
];

/// Bleed vector tags used when generating a demo multiverse
pub const BLEED_VECTORS: &[&str] = &[
    "commerce",
    "language",
    "memory",
    "resonance",
    "architecture",
    "dream",
    "desire",
];

/// Complete map payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub nodes: Vec<MapNode>,
    #[serde(default)]
    pub edges: Vec<MapEdge>,
}

impl MapData {
    /// Parse map data from a JSON document
    pub fn from_json(json: &str) -> Result<Self, MapFileError> {
        let data: MapData = serde_json::from_str(json)?;
        for edge in data.dangling_edges() {
            tracing::warn!(
                edge = %edge.id,
                source = %edge.source_id,
                target = %edge.target_id,
                "edge references an unknown simulation and will be ignored by the layout"
            );
        }
        Ok(data)
    }

    /// Read and parse a map JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapFileError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let data = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            nodes = data.nodes.len(),
            edges = data.edges.len(),
            "loaded map data"
        );
        Ok(data)
    }

    /// Get a node by ID
    pub fn node(&self, id: &str) -> Option<&MapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges with at least one endpoint missing from the node set
    pub fn dangling_edges(&self) -> Vec<&MapEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.source_id.as_str()) || !ids.contains(e.target_id.as_str()))
            .collect()
    }

    /// Generate a sample multiverse: a ring of echo connections plus a few
    /// random embassies.
    pub fn demo<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Self {
        let nodes: Vec<MapNode> = (0..count)
            .map(|i| {
                let theme = DEMO_THEMES.choose(rng).copied().unwrap_or("custom");
                let mut node = MapNode::new(format!("sim-{}", i), format!("Simulation {}", i + 1))
                    .with_theme(theme);
                node.agent_count = rng.gen_range(1..40);
                node.building_count = rng.gen_range(0..25);
                node.event_count = rng.gen_range(0..120);
                node
            })
            .collect();

        let mut edges = Vec::new();
        if count >= 2 {
            for i in 0..count {
                let j = (i + 1) % count;
                if count == 2 && i == 1 {
                    break; // a two-node ring is a single edge
                }
                let mut edge = MapEdge::new(&nodes[i].id, &nodes[j].id, rng.gen_range(0.2..1.2));
                let vector_count = rng.gen_range(1..=3);
                edge.bleed_vectors = BLEED_VECTORS
                    .choose_multiple(rng, vector_count)
                    .map(|v| v.to_string())
                    .collect();
                edges.push(edge);
            }

            for _ in 0..count / 3 {
                let a = rng.gen_range(0..count);
                let b = rng.gen_range(0..count);
                if a == b {
                    continue;
                }
                let mut edge = MapEdge::new(&nodes[a].id, &nodes[b].id, rng.gen_range(0.5..2.0));
                edge.id = format!("embassy-{}", edge.id);
                edge.connection_type = ConnectionType::Embassy;
                edges.push(edge);
            }
        }

        let mut data = Self { nodes, edges };
        data.count_echoes();
        data
    }

    /// Recompute each node's echo count from its incident edges
    pub fn count_echoes(&mut self) {
        for node in &mut self.nodes {
            node.echo_count = self
                .edges
                .iter()
                .filter(|e| {
                    e.connection_type == ConnectionType::Echo
                        && (e.source_id == node.id || e.target_id == node.id)
                })
                .count() as u32;
        }
    }
}
