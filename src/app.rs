//! Map viewer state and UI.

use eframe::egui::{self, Color32, Pos2, Stroke, Vec2};
use multiverse_map::graph::curve::{stroke_width, EdgeCurve};
use multiverse_map::graph::{ConnectionType, LayoutAnimation, MapData, MapEdge, MapNode};
use multiverse_map::settings::Settings;
use multiverse_map::theme;
use std::path::PathBuf;
use std::time::Instant;

/// Nodes in a generated demo multiverse
const DEMO_SIZE: usize = 8;

/// Segments used to approximate an edge curve
const CURVE_SEGMENTS: usize = 24;

/// Pointer distance (screen px) that still counts as hitting an edge
const EDGE_HIT_DISTANCE: f32 = 6.0;

/// Clicked item shown in the detail panel
#[derive(Debug, Clone, PartialEq)]
enum Selection {
    Node(String),
    Edge(String),
}

/// Main viewer application
pub struct MapApp {
    data: MapData,
    source_label: String,
    animation: LayoutAnimation,

    // Canvas size the current layout was computed for
    canvas_size: Vec2,

    // Viewport state
    pan_offset: Vec2,
    zoom: f32,

    // Interaction state
    hovered: Option<usize>,
    selection: Option<Selection>,
    last_run: Option<String>,

    // Settings persistence
    settings: Settings,
    settings_dirty: bool,
    last_settings_save: Instant,
}

impl MapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, map_path: Option<PathBuf>) -> Self {
        let settings = Settings::load();
        let animation = LayoutAnimation::new(settings.layout(), settings.limits());

        let (data, source_label) = match map_path {
            Some(path) => match MapData::load(&path) {
                Ok(data) => (data, path.display().to_string()),
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "could not load map, showing demo");
                    (demo_data(), "demo multiverse".to_string())
                }
            },
            None => (demo_data(), "demo multiverse".to_string()),
        };

        Self {
            data,
            source_label,
            animation,
            canvas_size: Vec2::ZERO,
            pan_offset: Vec2::ZERO,
            zoom: 1.0,
            hovered: None,
            selection: None,
            last_run: None,
            settings,
            settings_dirty: false,
            last_settings_save: Instant::now(),
        }
    }

    /// Replace the map and lay it out from scratch
    fn set_data(&mut self, data: MapData, label: String) {
        self.data = data;
        self.source_label = label;
        self.selection = None;
        self.hovered = None;
        self.restart_layout();
    }

    fn restart_layout(&mut self) {
        self.last_run = None;
        self.animation
            .restart(&mut self.data.nodes, self.canvas_size.x, self.canvas_size.y);
    }

    /// Finish the current layout synchronously instead of animating it
    fn settle_now(&mut self) {
        self.animation.cancel();
        let summary = self.animation.layout().settle(
            &mut self.data.nodes,
            &self.data.edges,
            self.canvas_size.x,
            self.canvas_size.y,
            self.animation.limits(),
        );
        self.last_run = Some(format!(
            "{} ticks, energy {:.3}{}",
            summary.iterations,
            summary.energy,
            if summary.converged { "" } else { " (cap reached)" }
        ));
    }

    /// Push edited physics settings into the layout and restart it
    fn apply_settings(&mut self) {
        self.animation
            .set_params(self.settings.layout(), self.settings.limits());
        self.settings_dirty = true;
        self.restart_layout();
    }

    /// Save settings if dirty and enough time has passed (debounce)
    fn maybe_save_settings(&mut self) {
        if self.settings_dirty && self.last_settings_save.elapsed().as_secs() >= 2 {
            self.settings.save();
            self.settings_dirty = false;
            self.last_settings_save = Instant::now();
        }
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Multiverse Map");
        ui.label(&self.source_label);
        ui.label(format!(
            "{} simulations, {} connections",
            self.data.nodes.len(),
            self.data.edges.len()
        ));
        let dangling = self.data.dangling_edges().len();
        if dangling > 0 {
            ui.colored_label(
                theme::accent::EMBASSY,
                format!("{} connections reference missing simulations", dangling),
            );
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Re-run layout").clicked() {
                self.restart_layout();
            }
            if ui.button("Settle now").clicked() {
                self.settle_now();
            }
        });
        if ui.button("New demo multiverse").clicked() {
            self.set_data(demo_data(), "demo multiverse".to_string());
        }

        if self.animation.is_running() {
            ui.label(format!("Simulating... tick {}", self.animation.iterations()));
        } else if let Some(ref run) = self.last_run {
            ui.label(format!("Settled: {}", run));
        } else {
            ui.label(format!("Settled after {} ticks", self.animation.iterations()));
        }
        if let Some(energy) = self.animation.last_energy() {
            ui.label(format!("Energy: {:.3}", energy));
        }

        ui.separator();
        ui.label("Physics");
        let mut changed = false;
        changed |= ui
            .add(egui::Slider::new(&mut self.settings.repulsion, 5000.0..=200000.0).logarithmic(true).text("Repulsion"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.settings.attraction, 0.0..=0.05).text("Attraction"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.settings.ideal_length, 50.0..=400.0).text("Edge length"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.settings.gravity, 0.0..=0.1).text("Gravity"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.settings.damping, 0.1..=0.95).text("Damping"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.settings.max_iterations, 10..=1000).text("Max ticks"))
            .changed();
        if changed {
            self.apply_settings();
        }

        ui.separator();
        ui.label("Display");
        if ui.checkbox(&mut self.settings.show_stats, "Show stats").changed() {
            self.settings_dirty = true;
        }
        if ui.checkbox(&mut self.settings.animate_edges, "Animate edges").changed() {
            self.settings_dirty = true;
        }
        ui.horizontal(|ui| {
            ui.label(format!("Zoom: {:.0}%", self.zoom * 100.0));
            if ui.button("Reset view").clicked() {
                self.zoom = 1.0;
                self.pan_offset = Vec2::ZERO;
            }
        });

        ui.separator();
        self.render_selection(ui);
    }

    fn render_selection(&self, ui: &mut egui::Ui) {
        match &self.selection {
            None => {
                ui.label("Click a simulation or connection for details.");
            }
            Some(Selection::Node(id)) => {
                if let Some(node) = self.data.node(id) {
                    ui.colored_label(theme::theme_color(&node.theme), node.name.to_uppercase());
                    ui.label(format!("Theme: {}", node.theme));
                    ui.label(node.stats_label());
                    ui.label(format!("Echoes: {}", node.echo_count));
                }
            }
            Some(Selection::Edge(id)) => {
                if let Some(edge) = self.data.edges.iter().find(|e| &e.id == id) {
                    self.render_connection_panel(ui, edge);
                }
            }
        }
    }

    fn render_connection_panel(&self, ui: &mut egui::Ui, edge: &MapEdge) {
        let name = |id: &str| {
            self.data
                .node(id)
                .map(|n| n.name.clone())
                .unwrap_or_else(|| format!("{} (missing)", id))
        };

        ui.label(format!("{} Connection", edge.connection_type.label()));
        ui.label(format!("{}  \u{2194}  {}", name(&edge.source_id), name(&edge.target_id)));
        for vector in &edge.bleed_vectors {
            ui.label(format!("{} {}", theme::vector_icon(vector), theme::vector_label(vector)));
        }
        ui.add(
            egui::ProgressBar::new((edge.strength / 2.0).clamp(0.0, 1.0))
                .text(format!("Strength {:.2}", edge.strength)),
        );
    }

    fn render_map(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        let center = rect.center();

        // Canvas resize invalidates the layout
        if (rect.size() - self.canvas_size).length() > 1.0 {
            self.canvas_size = rect.size();
            self.restart_layout();
        }

        let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
        let zoom_delta = ui.input(|i| i.zoom_delta());
        let hover_pos = response.hover_pos();

        if response.dragged_by(egui::PointerButton::Primary) {
            self.pan_offset += response.drag_delta();
        }

        // Plain wheel zooms, like the web map
        let wheel_zoom = if scroll_delta.y != 0.0 && response.hovered() {
            if scroll_delta.y > 0.0 { 1.1 } else { 0.9 }
        } else {
            1.0
        };
        let zoom_delta = zoom_delta * wheel_zoom;
        if let Some(cursor_pos) = hover_pos {
            if zoom_delta != 1.0 {
                let new_zoom = (self.zoom * zoom_delta).clamp(0.5, 3.0);
                let cursor_offset = cursor_pos - center - self.pan_offset;
                let zoom_factor = 1.0 - new_zoom / self.zoom;
                self.pan_offset += cursor_offset * zoom_factor;
                self.zoom = new_zoom;
            }
        }

        // One physics tick per frame while the layout is settling
        self.animation.frame(
            &mut self.data.nodes,
            &self.data.edges,
            self.canvas_size.x,
            self.canvas_size.y,
        );

        let pan_offset = self.pan_offset;
        let zoom = self.zoom;
        let canvas_center = (self.canvas_size / 2.0).to_pos2();

        // Transform helper: graph space -> screen space
        let transform = |pos: Pos2| -> Pos2 { center + (pos - canvas_center) * zoom + pan_offset };

        let node_radius = self.animation.layout().node_radius * zoom;

        // Edges first (behind nodes)
        let time = ui.input(|i| i.time) as f32;
        let mut hovered_edge: Option<String> = None;
        for edge in &self.data.edges {
            let (Some(source), Some(target)) = (self.data.node(&edge.source_id), self.data.node(&edge.target_id)) else {
                continue;
            };
            let Some(curve) = EdgeCurve::between(node_pos(source), node_pos(target)) else {
                continue;
            };
            let curve = curve.map(transform);

            let color = match edge.connection_type {
                ConnectionType::Embassy => theme::accent::EMBASSY,
                ConnectionType::Echo => theme::theme_color(&source.theme),
            };
            let is_selected = self.selection == Some(Selection::Edge(edge.id.clone()));
            let opacity = if is_selected { 0.9 } else { 0.5 };
            let stroke = Stroke::new(stroke_width(edge.strength) * zoom, color.gamma_multiply(opacity));
            painter.add(egui::Shape::line(curve.sample(CURVE_SEGMENTS), stroke));

            // Flow marker travelling from source to target
            if self.settings.animate_edges {
                let t = (time * 0.5).fract();
                painter.circle_filled(curve.point_at(t), 2.5 * zoom, color);
            }

            if let Some(pointer) = hover_pos {
                if curve.distance_to(pointer, CURVE_SEGMENTS) < EDGE_HIT_DISTANCE {
                    hovered_edge = Some(edge.id.clone());
                }
            }
        }

        // Hover: nearest node whose disc contains the pointer
        self.hovered = hover_pos.and_then(|pointer| {
            self.data
                .nodes
                .iter()
                .enumerate()
                .map(|(i, n)| (i, transform(node_pos(n)).distance(pointer)))
                .filter(|(_, d)| *d <= node_radius)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i)
        });

        for (i, node) in self.data.nodes.iter().enumerate() {
            let screen_pos = transform(node_pos(node));
            let color = theme::theme_color(&node.theme);
            let is_hovered = self.hovered == Some(i);
            let is_selected = self.selection == Some(Selection::Node(node.id.clone()));

            let glow = if is_hovered {
                color.gamma_multiply(0.6)
            } else {
                theme::glow_color(&node.theme)
            };
            painter.circle_filled(screen_pos, node_radius + 12.0 * zoom, glow);
            painter.circle_filled(screen_pos, node_radius - 3.0 * zoom, theme::bg::NODE_SURFACE);

            let border = if is_selected { theme::accent::SELECTED } else { color };
            painter.circle_stroke(screen_pos, node_radius, Stroke::new(3.0, border));

            let label_pos = screen_pos + Vec2::new(0.0, node_radius + 18.0 * zoom);
            painter.text(
                label_pos,
                egui::Align2::CENTER_CENTER,
                node.name.to_uppercase(),
                egui::FontId::monospace(11.0 * zoom),
                theme::text::PRIMARY,
            );
            if self.settings.show_stats {
                painter.text(
                    label_pos + Vec2::new(0.0, 14.0 * zoom),
                    egui::Align2::CENTER_CENTER,
                    node.stats_label(),
                    egui::FontId::monospace(9.0 * zoom),
                    theme::text::MUTED,
                );
            }
        }

        // Click selects the hovered node, else the hovered edge, else clears
        if response.clicked() {
            self.selection = match (self.hovered, hovered_edge) {
                (Some(i), _) => Some(Selection::Node(self.data.nodes[i].id.clone())),
                (None, Some(edge_id)) => Some(Selection::Edge(edge_id)),
                (None, None) => None,
            };
        }

        // Tooltip for hovered node
        if let (Some(i), Some(pointer)) = (self.hovered, hover_pos) {
            let node = &self.data.nodes[i];
            let tooltip_text = format!(
                "{}\nTheme: {}\n{}\nEchoes: {}",
                node.name,
                if node.theme.is_empty() { "unknown" } else { node.theme.as_str() },
                node.stats_label(),
                node.echo_count
            );
            let galley = painter.layout_no_wrap(tooltip_text, egui::FontId::default(), Color32::WHITE);
            let tooltip_pos = pointer + Vec2::new(16.0, 16.0);
            let tooltip_rect = egui::Rect::from_min_size(tooltip_pos, galley.size() + Vec2::splat(16.0));
            painter.rect_filled(tooltip_rect, 4.0, theme::bg::TOOLTIP);
            painter.galley(tooltip_pos + Vec2::splat(8.0), galley, Color32::WHITE);
        }

        if self.data.nodes.is_empty() {
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                "No simulations to map",
                egui::FontId::proportional(24.0),
                theme::text::MUTED,
            );
        }
    }
}

impl eframe::App for MapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.maybe_save_settings();

        ctx.set_visuals(egui::Visuals::dark());

        egui::SidePanel::left("sidebar")
            .min_width(240.0)
            .frame(egui::Frame::none().fill(theme::bg::PANEL).inner_margin(egui::Margin::same(10.0)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_sidebar(ui);
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(theme::bg::MAP))
            .show(ctx, |ui| {
                self.render_map(ui);
            });

        // Keep frames coming while the layout settles or edges animate
        if self.animation.is_running() || self.settings.animate_edges {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Force save settings on exit
        if self.settings_dirty {
            self.settings.save();
        }
    }
}

fn node_pos(node: &MapNode) -> Pos2 {
    Pos2::new(node.x, node.y)
}

fn demo_data() -> MapData {
    MapData::demo(&mut rand::thread_rng(), DEMO_SIZE)
}
