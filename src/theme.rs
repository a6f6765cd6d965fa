//! Theme and color constants for the map viewer.
//!
//! Simulation theme tags map to a single accent color which is used for
//! node borders, glows and outgoing edges. UI panel colors live here too so
//! the map and the sidebar stay consistent.

use egui::Color32;

/// Background colors for different layers
pub mod bg {
    use super::*;

    /// Map canvas background - darkest layer
    pub const MAP: Color32 = Color32::from_rgb(10, 10, 12);

    /// Panel backgrounds
    pub const PANEL: Color32 = Color32::from_rgb(20, 22, 28);

    /// Node interior when no banner is available
    pub const NODE_SURFACE: Color32 = Color32::from_rgb(10, 10, 10);

    /// Tooltip background
    pub const TOOLTIP: Color32 = Color32::from_rgba_premultiplied(18, 18, 24, 235);
}

/// Text colors at different emphasis levels
pub mod text {
    use super::*;

    /// Primary text - high contrast
    pub const PRIMARY: Color32 = Color32::from_rgb(240, 240, 240);

    /// Muted text for stats lines
    pub const MUTED: Color32 = Color32::from_rgb(119, 119, 119);
}

/// Accent colors
pub mod accent {
    use super::*;

    /// Embassy edges, warm orange distinct from echo bleed
    pub const EMBASSY: Color32 = Color32::from_rgb(249, 115, 22);

    /// Selection highlight
    pub const SELECTED: Color32 = Color32::from_rgb(255, 220, 80);

    /// Fallback for unknown themes
    pub const UNKNOWN: Color32 = Color32::from_rgb(136, 136, 136);
}

/// Accent color for a simulation theme tag
pub fn theme_color(theme: &str) -> Color32 {
    match theme {
        "dystopian" | "dark" => Color32::from_rgb(239, 68, 68),
        "fantasy" => Color32::from_rgb(245, 158, 11),
        "utopian" => Color32::from_rgb(34, 197, 94),
        "scifi" | "deep-space-horror" => Color32::from_rgb(6, 182, 212),
        "historical" => Color32::from_rgb(167, 139, 250),
        "custom" => Color32::from_rgb(168, 85, 247),
        "arc-raiders" => Color32::from_rgb(217, 119, 6),
        _ => accent::UNKNOWN,
    }
}

/// Semi-transparent theme color for node glows (0x66 alpha)
pub fn glow_color(theme: &str) -> Color32 {
    let c = theme_color(theme);
    Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), 0x66)
}

/// Display label for a bleed vector tag
pub fn vector_label(vector: &str) -> &str {
    match vector {
        "commerce" => "Commerce",
        "language" => "Language",
        "memory" => "Memory",
        "resonance" => "Resonance",
        "architecture" => "Architecture",
        "dream" => "Dream",
        "desire" => "Desire",
        other => other,
    }
}

/// Compact icon for a bleed vector tag
pub fn vector_icon(vector: &str) -> &'static str {
    match vector {
        "commerce" => "\u{1F4B0}",
        "language" => "\u{1F4DC}",
        "memory" => "\u{1F9E0}",
        "resonance" => "\u{1F50A}",
        "architecture" => "\u{1F3DB}",
        "dream" => "\u{1F311}",
        "desire" => "\u{2764}",
        _ => "\u{2022}",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_aliases_share_colors() {
        assert_eq!(theme_color("dark"), theme_color("dystopian"));
        assert_eq!(theme_color("deep-space-horror"), theme_color("scifi"));
    }

    #[test]
    fn unknown_theme_falls_back_to_grey() {
        assert_eq!(theme_color("no-such-theme"), accent::UNKNOWN);
        assert_eq!(theme_color(""), accent::UNKNOWN);
    }

    #[test]
    fn glow_keeps_hue_with_reduced_alpha() {
        let glow = glow_color("utopian");
        assert_eq!(glow.a(), 0x66);
        assert!(glow.g() > glow.r());
    }

    #[test]
    fn unknown_vectors_pass_through() {
        assert_eq!(vector_label("memory"), "Memory");
        assert_eq!(vector_label("gossip"), "gossip");
    }
}
