//! Frame-driven layout: one tick per rendered frame until the map settles.

use super::layout::{ForceLayout, RunLimits};
use super::types::{MapEdge, MapNode};

/// Drives a [`ForceLayout`] incrementally from a render loop.
///
/// The host calls [`LayoutAnimation::restart`] whenever the node/edge set or
/// the canvas changes, then [`LayoutAnimation::frame`] once per frame for as
/// long as it returns `true`.
#[derive(Debug, Clone)]
pub struct LayoutAnimation {
    layout: ForceLayout,
    limits: RunLimits,
    running: bool,
    iterations: usize,
    last_energy: Option<f32>,
}

impl LayoutAnimation {
    pub fn new(layout: ForceLayout, limits: RunLimits) -> Self {
        Self {
            layout,
            limits,
            running: false,
            iterations: 0,
            last_energy: None,
        }
    }

    pub fn layout(&self) -> &ForceLayout {
        &self.layout
    }

    pub fn limits(&self) -> RunLimits {
        self.limits
    }

    /// Swap parameters; takes effect on the next frame
    pub fn set_params(&mut self, layout: ForceLayout, limits: RunLimits) {
        self.layout = layout;
        self.limits = limits;
    }

    /// Place nodes on the starting circle and start ticking.
    /// With no nodes there is nothing to animate.
    pub fn restart(&mut self, nodes: &mut [MapNode], width: f32, height: f32) {
        self.iterations = 0;
        self.last_energy = None;
        self.running = !nodes.is_empty();
        if !self.running {
            return;
        }

        self.layout.initialize_positions(nodes, width, height);
        tracing::debug!(nodes = nodes.len(), width, height, "layout animation restarted");
    }

    /// Advance one frame. Returns whether another frame should be scheduled.
    pub fn frame(&mut self, nodes: &mut [MapNode], edges: &[MapEdge], width: f32, height: f32) -> bool {
        if !self.running {
            return false;
        }

        let energy = self.layout.tick(nodes, edges, width, height);
        self.iterations += 1;
        self.last_energy = Some(energy);

        if self.layout.is_settled(energy, &self.limits) || self.iterations >= self.limits.max_iterations {
            self.running = false;
            tracing::debug!(
                iterations = self.iterations,
                energy,
                "layout animation stopped"
            );
        }

        self.running
    }

    /// Stop scheduling ticks; positions computed so far stand
    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn last_energy(&self) -> Option<f32> {
        self.last_energy
    }
}

impl Default for LayoutAnimation {
    fn default() -> Self {
        Self::new(ForceLayout::default(), RunLimits::default())
    }
}
