//! Build panel: component toggles, dimensions, overlap check and export.

use egui::{Color32, Ui};

use beamdump_geometry::gdml::write_gdml_file;
use beamdump_geometry::overlaps::{check_overlaps, OverlapKind, OverlapOptions};

use crate::app::ModelState;

/// Checkboxes for the seven component toggles. Any change rebuilds the model.
pub fn toggles_ui(ui: &mut Ui, model: &mut ModelState) {
    ui.strong("Components");
    let toggles = &mut model.job.build;
    let mut changed = false;
    changed |= ui.checkbox(&mut toggles.world, "World").changed();
    changed |= ui.checkbox(&mut toggles.leading_cylinder, "Leading cylinder").changed();
    changed |= ui.checkbox(&mut toggles.second_cylinder, "Second cylinder").changed();
    changed |= ui.checkbox(&mut toggles.pipe, "Pipe").changed();
    changed |= ui.checkbox(&mut toggles.argon_pipe, "Argon fill").changed();
    changed |= ui.checkbox(&mut toggles.lead_glass_bars, "Lead-glass bars").changed();
    changed |= ui.checkbox(&mut toggles.lead_cube_dump, "Lead cube").changed();
    if changed {
        model.rebuild();
    }
}

/// State for the build panel.
#[derive(Debug)]
pub struct BuildPanel {
    /// Surface samples per direction for the overlap check.
    pub resolution: usize,
}

impl Default for BuildPanel {
    fn default() -> Self {
        Self { resolution: 12 }
    }
}

impl BuildPanel {
    pub fn ui(&mut self, ui: &mut Ui, model: &mut ModelState) {
        ui.heading("Build");
        ui.separator();

        let mut changed = false;
        ui.horizontal(|ui| {
            ui.label("Bars in ring:");
            changed |= ui
                .add(egui::DragValue::new(&mut model.job.dimensions.n_bars).range(1..=64))
                .changed();
        });
        if changed {
            model.rebuild();
        }

        ui.add_space(8.0);
        dimensions_grid(ui, model);

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            ui.add(egui::Slider::new(&mut self.resolution, 2..=32).text("Samples"));
            if ui.button("Check overlaps").clicked() {
                self.run_check(model);
            }
            if ui.button("Export GDML").clicked() {
                export_gdml(model);
            }
        });

        if let Some(error) = &model.error {
            ui.colored_label(Color32::from_rgb(220, 50, 50), error);
        }
        if let Some(status) = &model.status {
            ui.label(status);
        }

        if let Some(report) = &model.report {
            ui.add_space(8.0);
            ui.label(format!("{} volumes sampled", report.volumes_checked));
            if report.is_clean() {
                ui.colored_label(Color32::from_rgb(50, 180, 80), "No overlaps or protrusions");
            }
            for finding in &report.findings {
                let relation = match finding.kind {
                    OverlapKind::Protrusion => "protrudes from",
                    OverlapKind::Overlap => "overlaps",
                };
                ui.colored_label(
                    Color32::from_rgb(220, 140, 40),
                    format!(
                        "{} {} {} ({} samples, {:.3} mm)",
                        finding.volume, relation, finding.other, finding.samples, finding.depth
                    ),
                );
            }
        }
    }

    fn run_check(&self, model: &mut ModelState) {
        let Some(registry) = &model.registry else {
            return;
        };
        let options = OverlapOptions {
            resolution: self.resolution,
            ..Default::default()
        };
        match check_overlaps(registry, &options) {
            Ok(report) => {
                model.status = Some(format!("Overlap check: {} finding(s)", report.findings.len()));
                model.report = Some(report);
            }
            Err(e) => log::error!("Overlap check failed: {}", e),
        }
    }
}

fn dimensions_grid(ui: &mut Ui, model: &ModelState) {
    let d = &model.job.dimensions;
    let rows = [
        ("World edge", d.world_size),
        ("Cylinder radius", d.cylinder_radius),
        ("Cylinder thickness", d.cylinder_thickness),
        ("Leading cylinder z", d.leading_cylinder_z),
        ("Second cylinder z", d.second_cylinder_z()),
        ("Pipe inner radius", d.pipe_inner_radius()),
        ("Pipe outer radius", d.pipe_outer_radius()),
        ("Pipe length", d.pipe_length()),
        ("Pipe z", d.pipe_z()),
        ("Bar ring radius", d.bar_ring_radius()),
        ("Bar ring z", d.bar_ring_z),
        ("Lead cube edge", d.lead_cube_size),
        ("Lead cube z", d.lead_cube_z()),
    ];

    egui::Grid::new("dimensions_grid")
        .striped(true)
        .min_col_width(140.0)
        .show(ui, |ui| {
            ui.strong("Quantity");
            ui.strong("mm");
            ui.end_row();
            for (label, value) in rows {
                ui.label(label);
                ui.label(format!("{:.1}", value));
                ui.end_row();
            }
        });
}

fn export_gdml(model: &mut ModelState) {
    let Some(registry) = &model.registry else {
        model.status = Some("Nothing to export: the model failed to build".into());
        return;
    };
    let path = model.job.output.gdml_path();
    match write_gdml_file(registry, &path) {
        Ok(()) => model.status = Some(format!("GDML written to {}", path.display())),
        Err(e) => {
            log::error!("Failed to export: {}", e);
            model.status = Some(format!("Export failed: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamdump_core::config::JobConfig;

    #[test]
    fn test_export_without_model_reports_status() {
        let mut job = JobConfig::default();
        job.build.world = false;
        let mut model = ModelState::new(job);
        export_gdml(&mut model);
        assert_eq!(
            model.status.as_deref(),
            Some("Nothing to export: the model failed to build")
        );
    }
}
