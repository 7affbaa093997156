//! Main application state and egui integration.

use eframe::egui;

use beamdump_core::build_model;
use beamdump_core::config::JobConfig;
use beamdump_geometry::overlaps::OverlapReport;
use beamdump_geometry::registry::VolumeWireframe;
use beamdump_geometry::Registry;

use crate::panels;

/// Circle segments used for tube wireframes.
const WIREFRAME_SEGMENTS: usize = 48;

/// The current job and the model built from it.
pub struct ModelState {
    pub job: JobConfig,
    pub registry: Option<Registry>,
    pub wireframe: Vec<VolumeWireframe>,
    pub report: Option<OverlapReport>,
    pub error: Option<String>,
    /// Last export or check message for the status line.
    pub status: Option<String>,
}

impl ModelState {
    pub fn new(job: JobConfig) -> Self {
        let mut state = Self {
            job,
            registry: None,
            wireframe: Vec::new(),
            report: None,
            error: None,
            status: None,
        };
        state.rebuild();
        state
    }

    /// Rebuild the registry from the current job. Clears any previous
    /// overlap report and status message.
    pub fn rebuild(&mut self) {
        self.report = None;
        self.status = None;
        self.wireframe.clear();
        match build_model(&self.job.dimensions, &self.job.materials, &self.job.build) {
            Ok(registry) => {
                if registry.has_world() {
                    match registry.world_wireframe(WIREFRAME_SEGMENTS) {
                        Ok(wireframe) => self.wireframe = wireframe,
                        Err(e) => log::error!("Failed to build wireframe: {}", e),
                    }
                }
                log::info!("model rebuilt: {} placements", registry.physical_volumes().count());
                self.registry = Some(registry);
                self.error = None;
            }
            Err(e) => {
                log::error!("Model build failed: {}", e);
                self.registry = None;
                self.error = Some(e.to_string());
            }
        }
    }
}

/// The beam dump viewer application.
pub struct BeamDumpApp {
    /// Which panel is currently selected in the sidebar.
    active_panel: Panel,
    model: ModelState,
    pub view_state: panels::view::ViewPanel,
    pub build_state: panels::build::BuildPanel,
    pub materials_state: panels::materials::MaterialsPanel,
}

/// Sidebar navigation panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    View,
    Build,
    Materials,
}

impl BeamDumpApp {
    pub fn new(job: JobConfig) -> Self {
        Self {
            active_panel: Panel::View,
            model: ModelState::new(job),
            view_state: panels::view::ViewPanel::default(),
            build_state: panels::build::BuildPanel::default(),
            materials_state: panels::materials::MaterialsPanel::default(),
        }
    }
}

impl eframe::App for BeamDumpApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("nav_panel")
            .resizable(false)
            .default_width(200.0)
            .show(ctx, |ui| {
                ui.heading("Beam Dump");
                ui.separator();

                ui.selectable_value(&mut self.active_panel, Panel::View, "View");
                ui.selectable_value(&mut self.active_panel, Panel::Build, "Build");
                ui.selectable_value(&mut self.active_panel, Panel::Materials, "Materials");

                ui.add_space(12.0);
                ui.separator();
                panels::build::toggles_ui(ui, &mut self.model);
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.active_panel {
            Panel::View => self.view_state.ui(ui, &self.model),
            Panel::Build => self.build_state.ui(ui, &mut self.model),
            Panel::Materials => self.materials_state.ui(ui, &self.model),
        });
    }
}
