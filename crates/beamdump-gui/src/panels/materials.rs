//! Materials panel: NIST catalogue and the materials used by the model.

use egui::Ui;

use beamdump_materials::{lead_glass_tf1, nist, MaterialProperties, NistMaterial};

use crate::app::ModelState;

/// State for the materials panel.
#[derive(Debug)]
pub struct MaterialsPanel {
    catalogue: Vec<NistMaterial>,
    pub show_catalogue: bool,
}

impl Default for MaterialsPanel {
    fn default() -> Self {
        Self {
            catalogue: nist::catalogue(),
            show_catalogue: true,
        }
    }
}

impl MaterialsPanel {
    pub fn ui(&mut self, ui: &mut Ui, model: &ModelState) {
        ui.heading("Materials");
        ui.separator();

        ui.strong("In use");
        if let Some(registry) = &model.registry {
            egui::Grid::new("used_materials_grid")
                .striped(true)
                .min_col_width(120.0)
                .show(ui, |ui| {
                    ui.strong("Name");
                    ui.strong("Density (g/cm\u{00b3})");
                    ui.strong("State");
                    ui.strong("Defined in GDML");
                    ui.end_row();
                    for m in registry.materials() {
                        ui.label(m.name());
                        ui.label(format!("{:.4}", m.density()));
                        ui.label(m.state().as_str());
                        ui.label(if m.needs_definition() { "yes" } else { "no" });
                        ui.end_row();
                    }
                });
        }

        ui.add_space(12.0);
        let tf1 = lead_glass_tf1();
        ui.strong(format!("{} lead glass, {} g/cm\u{00b3}", tf1.name(), tf1.density()));
        for c in tf1.components() {
            ui.label(format!("  {:.0} % {}", 100.0 * c.mass_fraction, c.reference));
        }

        ui.add_space(12.0);
        ui.checkbox(&mut self.show_catalogue, "Show NIST catalogue");
        if self.show_catalogue {
            egui::ScrollArea::vertical()
                .max_height(300.0)
                .show(ui, |ui| {
                    egui::Grid::new("nist_grid")
                        .striped(true)
                        .min_col_width(120.0)
                        .show(ui, |ui| {
                            for m in &self.catalogue {
                                ui.label(m.name());
                                ui.label(format!("{:.4}", m.density()));
                                ui.label(m.state().as_str());
                                ui.end_row();
                            }
                        });
                });
        }
    }
}
