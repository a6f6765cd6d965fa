//! Force-directed map layout.
//!
//! Implements a simple force-directed layout with:
//! - Repulsion between all node pairs (inverse square)
//! - Attraction along edges (Hooke's law, scaled by edge strength)
//! - Gravity toward the canvas center
//! - Damping so the simulation settles
//! - Clamping so no node leaves the visible canvas
//!
//! The engine is a step function over caller-owned nodes. Node positions
//! are written in place; edges are only read.

use super::types::{MapEdge, MapNode};
use egui::Vec2;
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, TAU};

/// Golden angle in radians, spreads coincident pairs in distinct directions
const GOLDEN_ANGLE: f32 = 2.399_963;

/// Force-directed layout parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ForceLayout {
    /// Repulsion strength between nodes
    pub repulsion: f32,
    /// Spring constant along edges
    pub attraction: f32,
    /// Rest length of an edge spring
    pub ideal_length: f32,
    /// Pull toward the canvas center
    pub gravity: f32,
    /// Velocity multiplier applied after integration (0.0 - 1.0, exclusive)
    pub damping: f32,
    /// Force-to-velocity scale per tick
    pub time_step: f32,
    /// Maximum speed per tick
    pub max_velocity: f32,
    /// Distance substituted for coincident nodes
    pub min_distance: f32,
    /// Visual node radius, used for boundary clamping
    pub node_radius: f32,
    /// Extra margin between a node's rim and the canvas edge
    pub padding: f32,
    /// Initial circle radius as a fraction of the smaller canvas side
    pub init_radius_fraction: f32,
}

// With these constants an edge-free graph is overdamped: once energy has
// peaked it only falls.
impl Default for ForceLayout {
    fn default() -> Self {
        Self {
            repulsion: 60000.0,
            attraction: 0.005,
            ideal_length: 180.0,
            gravity: 0.045,
            damping: 0.4,
            time_step: 1.0,
            max_velocity: 50.0,
            min_distance: 0.01,
            node_radius: 60.0,
            padding: 10.0,
            init_radius_fraction: 0.35,
        }
    }
}

/// Termination policy for [`ForceLayout::run`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunLimits {
    pub max_iterations: usize,
    /// Stop once tick energy drops below this
    pub energy_threshold: f32,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_iterations: 300,
            energy_threshold: 0.1,
        }
    }
}

/// What a synchronous run did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub iterations: usize,
    /// Energy returned by the last tick (0.0 when nothing ran)
    pub energy: f32,
    /// False when the iteration cap was hit first
    pub converged: bool,
}

impl ForceLayout {
    /// Margin kept between node centers and the canvas edge
    pub fn margin(&self) -> f32 {
        self.node_radius + self.padding
    }

    /// Place nodes evenly on a circle around the canvas center, first node at
    /// the top, and zero every velocity.
    pub fn initialize_positions(&self, nodes: &mut [MapNode], width: f32, height: f32) {
        let n = nodes.len();
        if n == 0 {
            return;
        }

        let center_x = width / 2.0;
        let center_y = height / 2.0;
        let radius = width.min(height) * self.init_radius_fraction;
        let step = TAU / n as f32;

        for (i, node) in nodes.iter_mut().enumerate() {
            let angle = -FRAC_PI_2 + i as f32 * step;
            node.x = center_x + radius * angle.cos();
            node.y = center_y + radius * angle.sin();
            node.vx = 0.0;
            node.vy = 0.0;
        }
    }

    /// Advance the simulation by one step.
    ///
    /// Returns the total kinetic energy (sum of squared speeds) after damping.
    pub fn tick(&self, nodes: &mut [MapNode], edges: &[MapEdge], width: f32, height: f32) -> f32 {
        if nodes.is_empty() {
            return 0.0;
        }

        let mut forces: Vec<Vec2> = vec![Vec2::ZERO; nodes.len()];

        self.apply_repulsion(nodes, &mut forces);

        // Edge endpoints are resolved by id; self edges and dangling references are skipped
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();
        for edge in edges {
            if edge.is_self_edge() {
                continue;
            }
            let (Some(&source), Some(&target)) = (
                index.get(edge.source_id.as_str()),
                index.get(edge.target_id.as_str()),
            ) else {
                continue;
            };
            self.apply_edge_force(nodes, source, target, edge.strength, &mut forces);
        }

        // Center gravity
        let center = Vec2::new(width / 2.0, height / 2.0);
        for (node, force) in nodes.iter().zip(forces.iter_mut()) {
            let to_center = center - Vec2::new(node.x, node.y);
            *force += to_center * self.gravity;
        }

        let (min_x, max_x) = self.axis_bounds(width);
        let (min_y, max_y) = self.axis_bounds(height);

        let mut energy = 0.0;
        for (node, force) in nodes.iter_mut().zip(forces) {
            let mut vel = Vec2::new(node.vx, node.vy) + force * self.time_step;

            // Clamp velocity
            if vel.length() > self.max_velocity {
                vel = vel.normalized() * self.max_velocity;
            }

            node.x += vel.x;
            node.y += vel.y;

            vel *= self.damping;
            node.vx = vel.x;
            node.vy = vel.y;

            clamp_axis(&mut node.x, &mut node.vx, min_x, max_x);
            clamp_axis(&mut node.y, &mut node.vy, min_y, max_y);

            energy += node.speed_sq();
        }

        energy
    }

    /// Lay nodes out from scratch: initialize on the circle, then settle.
    pub fn run(
        &self,
        nodes: &mut [MapNode],
        edges: &[MapEdge],
        width: f32,
        height: f32,
        limits: RunLimits,
    ) -> RunSummary {
        self.initialize_positions(nodes, width, height);
        self.settle(nodes, edges, width, height, limits)
    }

    /// Tick from the nodes' current state until energy drops below the
    /// threshold or the iteration cap is hit.
    pub fn settle(
        &self,
        nodes: &mut [MapNode],
        edges: &[MapEdge],
        width: f32,
        height: f32,
        limits: RunLimits,
    ) -> RunSummary {
        let mut summary = RunSummary {
            iterations: 0,
            energy: 0.0,
            converged: nodes.is_empty(),
        };
        if nodes.is_empty() {
            return summary;
        }

        while summary.iterations < limits.max_iterations {
            summary.energy = self.tick(nodes, edges, width, height);
            summary.iterations += 1;
            if self.is_settled(summary.energy, &limits) {
                summary.converged = true;
                break;
            }
        }

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            iterations = summary.iterations,
            energy = summary.energy,
            converged = summary.converged,
            "layout run finished"
        );

        summary
    }

    /// Check if a tick's energy means the layout has settled
    pub fn is_settled(&self, energy: f32, limits: &RunLimits) -> bool {
        energy < limits.energy_threshold
    }

    /// Inverse-square repulsion over every unordered pair
    fn apply_repulsion(&self, nodes: &[MapNode], forces: &mut [Vec2]) {
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let delta = Vec2::new(nodes[i].x - nodes[j].x, nodes[i].y - nodes[j].y);
                let length = delta.length();

                let (direction, distance) = if length > f32::EPSILON {
                    (delta / length, length.max(self.min_distance))
                } else {
                    // Coincident: no geometric direction, derive one from the pair
                    let angle = (i * 31 + j) as f32 * GOLDEN_ANGLE;
                    (Vec2::angled(angle), self.min_distance)
                };

                let push = direction * (self.repulsion / (distance * distance));
                forces[i] += push;
                forces[j] -= push;
            }
        }
    }

    /// Spring force for a single edge
    fn apply_edge_force(
        &self,
        nodes: &[MapNode],
        source: usize,
        target: usize,
        strength: f32,
        forces: &mut [Vec2],
    ) {
        let delta = Vec2::new(nodes[target].x - nodes[source].x, nodes[target].y - nodes[source].y);
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return;
        }

        let displacement = distance - self.ideal_length;
        let force = delta / distance * (self.attraction * displacement * strength);
        forces[source] += force;
        forces[target] -= force;
    }

    /// Allowed center range on one axis. Canvases narrower than two margins
    /// collapse to the center line.
    fn axis_bounds(&self, extent: f32) -> (f32, f32) {
        let low = self.margin();
        let high = extent - self.margin();
        if high < low {
            let mid = extent / 2.0;
            (mid, mid)
        } else {
            (low, high)
        }
    }
}

/// Clamp a coordinate into `[min, max]`, zeroing velocity that points outward
fn clamp_axis(pos: &mut f32, vel: &mut f32, min: f32, max: f32) {
    if *pos < min {
        *pos = min;
        if *vel < 0.0 {
            *vel = 0.0;
        }
    } else if *pos > max {
        *pos = max;
        if *vel > 0.0 {
            *vel = 0.0;
        }
    }
}

/// Place nodes on the starting circle using default parameters.
pub fn initialize_positions(nodes: &mut [MapNode], width: f32, height: f32) {
    ForceLayout::default().initialize_positions(nodes, width, height);
}

/// One physics step with default parameters; returns kinetic energy.
pub fn simulate_tick(nodes: &mut [MapNode], edges: &[MapEdge], width: f32, height: f32) -> f32 {
    ForceLayout::default().tick(nodes, edges, width, height)
}

/// Synchronous one-shot layout with default parameters.
///
/// `max_iterations` defaults to 300 and `energy_threshold` to 0.1.
pub fn run_simulation(
    nodes: &mut [MapNode],
    edges: &[MapEdge],
    width: f32,
    height: f32,
    max_iterations: Option<usize>,
    energy_threshold: Option<f32>,
) -> RunSummary {
    let defaults = RunLimits::default();
    let limits = RunLimits {
        max_iterations: max_iterations.unwrap_or(defaults.max_iterations),
        energy_threshold: energy_threshold.unwrap_or(defaults.energy_threshold),
    };
    ForceLayout::default().run(nodes, edges, width, height, limits)
}
