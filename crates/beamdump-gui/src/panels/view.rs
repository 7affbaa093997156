//! View panel: projected wireframe of the placed volumes.

use std::collections::BTreeMap;

use egui::{Color32, Ui};

use crate::app::ModelState;

/// Length of the drawn coordinate axes (mm).
const AXIS_LENGTH: f64 = 1000.0;

/// Plane the wireframe is projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Side view, beam running left to right.
    ZX,
    /// Looking down the beam axis.
    XY,
    /// Top view, beam running left to right.
    ZY,
}

impl Projection {
    pub fn label(&self) -> &'static str {
        match self {
            Projection::ZX => "Side (z, x)",
            Projection::XY => "Beam (x, y)",
            Projection::ZY => "Top (z, y)",
        }
    }

    pub fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            Projection::ZX => ("z (mm)", "x (mm)"),
            Projection::XY => ("x (mm)", "y (mm)"),
            Projection::ZY => ("z (mm)", "y (mm)"),
        }
    }

    pub fn project(&self, p: &[f64; 3]) -> [f64; 2] {
        match self {
            Projection::ZX => [p[2], p[0]],
            Projection::XY => [p[0], p[1]],
            Projection::ZY => [p[2], p[1]],
        }
    }
}

/// State for the view panel.
#[derive(Debug)]
pub struct ViewPanel {
    pub projection: Projection,
    pub show_world: bool,
    pub show_axes: bool,
    pub show_volume_list: bool,
}

impl Default for ViewPanel {
    fn default() -> Self {
        Self {
            projection: Projection::ZX,
            show_world: false,
            show_axes: true,
            show_volume_list: false,
        }
    }
}

impl ViewPanel {
    pub fn ui(&mut self, ui: &mut Ui, model: &ModelState) {
        ui.heading("Geometry View");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Projection:");
            for projection in [Projection::ZX, Projection::XY, Projection::ZY] {
                ui.selectable_value(&mut self.projection, projection, projection.label());
            }
        });
        ui.horizontal(|ui| {
            ui.checkbox(&mut self.show_world, "World box");
            ui.checkbox(&mut self.show_axes, "Axes");
            ui.checkbox(&mut self.show_volume_list, "Volume list");
        });

        if let Some(error) = &model.error {
            ui.colored_label(Color32::from_rgb(220, 50, 50), error);
            return;
        }
        if model.wireframe.is_empty() {
            ui.label("Nothing to show: enable the world volume.");
            return;
        }

        ui.add_space(4.0);

        let colours = material_colours(model);
        let (x_label, y_label) = self.projection.axis_labels();
        let plot_height = if self.show_volume_list { 420.0 } else { 620.0 };

        egui_plot::Plot::new("geometry_view")
            .height(plot_height)
            .data_aspect(1.0)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .legend(egui_plot::Legend::default())
            .show(ui, |plot_ui| {
                // The world comes first in the wireframe list.
                let skip = usize::from(!self.show_world);
                for volume in model.wireframe.iter().skip(skip) {
                    let colour = colours
                        .get(volume.material.as_str())
                        .copied()
                        .unwrap_or(Color32::GRAY);
                    for [a, b] in &volume.edges {
                        let points: egui_plot::PlotPoints =
                            vec![self.projection.project(a), self.projection.project(b)].into();
                        plot_ui.line(
                            egui_plot::Line::new(points)
                                .name(&volume.material)
                                .color(colour)
                                .width(1.0),
                        );
                    }
                }

                if self.show_axes {
                    for (axis, colour) in axes() {
                        let points: egui_plot::PlotPoints = vec![
                            self.projection.project(&[0.0; 3]),
                            self.projection.project(&axis),
                        ]
                        .into();
                        plot_ui.line(egui_plot::Line::new(points).color(colour).width(2.0));
                    }
                }
            });

        if self.show_volume_list {
            ui.add_space(8.0);
            volume_list(ui, model);
        }
    }
}

/// x, y and z axes of [`AXIS_LENGTH`], coloured red, green, blue.
fn axes() -> [([f64; 3], Color32); 3] {
    [
        ([AXIS_LENGTH, 0.0, 0.0], Color32::from_rgb(220, 50, 50)),
        ([0.0, AXIS_LENGTH, 0.0], Color32::from_rgb(50, 180, 80)),
        ([0.0, 0.0, AXIS_LENGTH], Color32::from_rgb(50, 120, 220)),
    ]
}

/// One fixed colour per material, in order of first appearance.
fn material_colours(model: &ModelState) -> BTreeMap<&str, Color32> {
    const PALETTE: [Color32; 6] = [
        Color32::from_rgb(120, 120, 120),
        Color32::from_rgb(200, 140, 40),
        Color32::from_rgb(60, 140, 200),
        Color32::from_rgb(160, 90, 200),
        Color32::from_rgb(40, 170, 150),
        Color32::from_rgb(210, 80, 120),
    ];
    let mut colours = BTreeMap::new();
    for volume in &model.wireframe {
        let next = PALETTE[colours.len() % PALETTE.len()];
        colours.entry(volume.material.as_str()).or_insert(next);
    }
    colours
}

fn volume_list(ui: &mut Ui, model: &ModelState) {
    let Some(registry) = &model.registry else {
        return;
    };
    let summary = match registry.summary() {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("Failed to summarise registry: {}", e);
            return;
        }
    };

    egui::ScrollArea::vertical()
        .max_height(200.0)
        .show(ui, |ui| {
            egui::Grid::new("volume_grid")
                .striped(true)
                .min_col_width(90.0)
                .show(ui, |ui| {
                    ui.strong("Placement");
                    ui.strong("Solid");
                    ui.strong("Material");
                    ui.strong("Position (mm)");
                    ui.strong("Rotation z (rad)");
                    ui.end_row();

                    for p in &summary.placements {
                        ui.label(&p.physical);
                        ui.label(&p.solid);
                        ui.label(&p.material);
                        ui.label(format!(
                            "({:.1}, {:.1}, {:.1})",
                            p.position[0], p.position[1], p.position[2]
                        ));
                        ui.label(format!("{:.4}", p.rotation[2]));
                        ui.end_row();
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projections_pick_coordinates() {
        let p = [1.0, 2.0, 3.0];
        assert_eq!(Projection::ZX.project(&p), [3.0, 1.0]);
        assert_eq!(Projection::XY.project(&p), [1.0, 2.0]);
        assert_eq!(Projection::ZY.project(&p), [3.0, 2.0]);
    }

    #[test]
    fn test_beam_axis_collapses_in_beam_view() {
        let [_, _, z_axis] = axes();
        assert_eq!(Projection::XY.project(&z_axis.0), [0.0, 0.0]);
        assert_eq!(Projection::ZX.project(&z_axis.0), [AXIS_LENGTH, 0.0]);
    }
}
