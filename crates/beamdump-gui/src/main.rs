//! Beam dump viewer entry point.

mod app;
mod panels;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "beamdump-gui")]
#[command(about = "Interactive viewer for the beam dump geometry")]
#[command(version)]
struct Args {
    /// Job configuration to start from (defaults if omitted).
    config: Option<PathBuf>,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let job = match &args.config {
        Some(path) => beamdump_core::config::load_config(path).unwrap_or_else(|e| {
            log::error!("Failed to load {}: {}; using defaults", path.display(), e);
            Default::default()
        }),
        None => Default::default(),
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Beam Dump Geometry",
        options,
        Box::new(|_cc| Ok(Box::new(app::BeamDumpApp::new(job)))),
    )
}
