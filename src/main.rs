//! Multiverse Map viewer
//!
//! Renders simulations and their connections with an animated
//! force-directed layout.

mod app;

use eframe::egui;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let map_path = std::env::args().nth(1).map(std::path::PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Multiverse Map"),
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native(
        "Multiverse Map",
        options,
        Box::new(move |cc| Ok(Box::new(app::MapApp::new(cc, map_path)))),
    )
}
