//! Persistent settings for the map viewer.

use crate::graph::{ForceLayout, RunLimits};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// All persistable viewer and physics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Physics
    pub repulsion: f32,
    pub attraction: f32,
    pub ideal_length: f32,
    pub gravity: f32,
    pub damping: f32,
    pub max_velocity: f32,

    // Geometry
    pub node_radius: f32,
    pub padding: f32,

    // Convergence
    pub max_iterations: usize,
    pub energy_threshold: f32,

    // Display
    pub show_stats: bool,
    pub animate_edges: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let layout = ForceLayout::default();
        let limits = RunLimits::default();
        Self {
            repulsion: layout.repulsion,
            attraction: layout.attraction,
            ideal_length: layout.ideal_length,
            gravity: layout.gravity,
            damping: layout.damping,
            max_velocity: layout.max_velocity,
            node_radius: layout.node_radius,
            padding: layout.padding,
            max_iterations: limits.max_iterations,
            energy_threshold: limits.energy_threshold,
            show_stats: true,
            animate_edges: true,
        }
    }
}

impl Settings {
    /// Build layout parameters from these settings.
    ///
    /// Damping is kept inside (0, 1) so a hand-edited file cannot stop the
    /// simulation from converging.
    pub fn layout(&self) -> ForceLayout {
        ForceLayout {
            repulsion: self.repulsion.max(0.0),
            attraction: self.attraction.max(0.0),
            ideal_length: self.ideal_length.max(0.0),
            gravity: self.gravity.max(0.0),
            damping: self.damping.clamp(0.01, 0.99),
            max_velocity: self.max_velocity.max(1.0),
            node_radius: self.node_radius.max(0.0),
            padding: self.padding.max(0.0),
            ..ForceLayout::default()
        }
    }

    pub fn limits(&self) -> RunLimits {
        RunLimits {
            max_iterations: self.max_iterations,
            energy_threshold: self.energy_threshold.max(0.0),
        }
    }

    /// Get the path to the settings file
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("multiverse-map");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the user config directory, returning defaults if
    /// the file doesn't exist or is invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("could not determine config directory, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from an explicit path, returning defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    tracing::info!(path = %path.display(), "loaded settings");
                    settings
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to parse settings file, using defaults");
                    Self::default()
                }
            },
            // File doesn't exist yet, that's fine
            Err(_) => Self::default(),
        }
    }

    /// Save settings to the user config directory
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            tracing::warn!("could not determine config directory, settings not saved");
            return;
        };
        if let Err(e) = self.save_to(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to save settings");
        }
    }

    /// Save settings to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "saved settings");
        Ok(())
    }
}
