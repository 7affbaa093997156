//! Per-component volume builders.
//!
//! Every `make_*` method creates one solid, attaches one material and
//! returns the resulting logical volume; the matching `place_*` method puts
//! that volume into the world. Names follow a fixed pattern
//! (`{name}_solid`, `{name}_lv`, `{name}_pv`) so that samplers and analysis
//! code downstream can refer to them.

use std::f64::consts::TAU;

use beamdump_geometry::{Expr, GeometryError, LogicalId, PhysicalId, Placement, Registry, Solid};
use beamdump_materials::{lead_glass_tf1, Material};
use log::{debug, info};

use crate::dimensions::{DimensionError, DumpDimensions};
use crate::model::{ModelError, ModelMaterials};

/// Named constants shared by the tube solids.
#[derive(Debug, Clone)]
pub struct Defines {
    pub zero: Expr,
    pub twopi: Expr,
}

/// Create an empty registry holding the `zero` and `twopi` constants.
pub fn setup_registry() -> Result<(Registry, Defines), GeometryError> {
    let mut registry = Registry::new();
    let zero = registry.add_constant("zero", "0", 0.0)?;
    let twopi = registry.add_constant("twopi", "2*pi", TAU)?;
    Ok((registry, Defines { zero, twopi }))
}

/// Placements of `n_bars` bars evenly spaced on a ring of radius `distance`
/// at height `z`. Bar `i` sits at angle `i * 2pi / n` and is rotated by
/// minus that angle so that one face always points at the beam axis.
pub fn ring_placements(
    distance: f64,
    n_bars: usize,
    z: f64,
) -> Result<Vec<Placement>, DimensionError> {
    if n_bars == 0 {
        return Err(DimensionError::NoBars);
    }
    if !(distance >= 0.0) {
        return Err(DimensionError::Negative {
            field: "bar_ring_radius",
            value: distance,
        });
    }
    let step = TAU / n_bars as f64;
    Ok((0..n_bars)
        .map(|i| {
            let angle = i as f64 * step;
            Placement::at([distance * angle.cos(), distance * angle.sin(), z])
                .with_rotation([0.0, 0.0, -angle])
        })
        .collect())
}

/// Incrementally assembles the beam dump into a [`Registry`].
pub struct DumpBuilder<'a> {
    registry: Registry,
    defines: Defines,
    dims: &'a DumpDimensions,
    materials: &'a ModelMaterials,
    world: Option<LogicalId>,
}

impl<'a> DumpBuilder<'a> {
    pub fn new(dims: &'a DumpDimensions, materials: &'a ModelMaterials) -> Result<Self, ModelError> {
        let (registry, defines) = setup_registry()?;
        Ok(Self {
            registry,
            defines,
            dims,
            materials,
            world: None,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn finish(self) -> Registry {
        self.registry
    }

    // ── World ──────────────────────────────────────────────────────────

    /// Cubic world box; becomes the registry world.
    pub fn make_world(&mut self) -> Result<LogicalId, ModelError> {
        let size = self.dims.world_size;
        let material = Material::predefined(&self.materials.world)?;
        let lv = self.logical("world", Solid::new_box("world_solid", size, size, size), material)?;
        self.registry.set_world(lv)?;
        self.world = Some(lv);
        info!("world: {} mm cube of {}", size, self.materials.world);
        Ok(lv)
    }

    // ── Window cylinders ───────────────────────────────────────────────

    pub fn make_cylinder(&mut self, name: &str) -> Result<LogicalId, ModelError> {
        let solid = Solid::new_tube(
            format!("{}_solid", name),
            &self.defines.zero,
            self.dims.cylinder_radius,
            self.dims.cylinder_thickness,
            0.0,
            &self.defines.twopi,
        );
        let material = Material::predefined(&self.materials.cylinder)?;
        self.logical(name, solid, material)
    }

    pub fn place_cylinder(
        &mut self,
        cylinder: LogicalId,
        z: f64,
        name: &str,
    ) -> Result<PhysicalId, ModelError> {
        info!("{}: window cylinder at z = {} mm", name, z);
        self.place(cylinder, Placement::on_axis(z), name)
    }

    // ── Pipe ───────────────────────────────────────────────────────────

    pub fn make_pipe(&mut self, name: &str) -> Result<LogicalId, ModelError> {
        let solid = Solid::new_tube(
            format!("{}_solid", name),
            self.dims.pipe_inner_radius(),
            self.dims.pipe_outer_radius(),
            self.dims.pipe_length(),
            0.0,
            &self.defines.twopi,
        );
        let material = Material::predefined(&self.materials.pipe)?;
        self.logical(name, solid, material)
    }

    pub fn place_pipe(&mut self, pipe: LogicalId, name: &str) -> Result<PhysicalId, ModelError> {
        let z = self.dims.pipe_z();
        info!("{}: pipe of length {} mm at z = {} mm", name, self.dims.pipe_length(), z);
        self.place(pipe, Placement::on_axis(z), name)
    }

    // ── Argon fill ─────────────────────────────────────────────────────

    pub fn make_argon_pipe(&mut self, name: &str) -> Result<LogicalId, ModelError> {
        let solid = Solid::new_tube(
            format!("{}_solid", name),
            self.dims.argon_inner_radius(),
            self.dims.argon_outer_radius(),
            self.dims.argon_length(),
            0.0,
            &self.defines.twopi,
        );
        let material = Material::predefined(&self.materials.argon)?;
        self.logical(name, solid, material)
    }

    pub fn place_argon_pipe(
        &mut self,
        argon: LogicalId,
        name: &str,
    ) -> Result<PhysicalId, ModelError> {
        let z = self.dims.argon_z();
        info!("{}: argon fill at z = {} mm", name, z);
        self.place(argon, Placement::on_axis(z), name)
    }

    // ── Calorimeter bars ───────────────────────────────────────────────

    /// A TF1 lead-glass bar with a square `cross` x `cross` section.
    pub fn make_lead_glass_bar(
        &mut self,
        cross: f64,
        length: f64,
        name: &str,
    ) -> Result<LogicalId, ModelError> {
        let solid = Solid::new_box(format!("{}_solid", name), cross, cross, length);
        self.logical(name, solid, lead_glass_tf1())
    }

    /// Build one `lg_bar` volume and place it `n_bars` times around the
    /// beam axis. Placements are named `lg_bar_pv_{i}`.
    pub fn place_calorimeter_bars(
        &mut self,
        distance: f64,
        n_bars: usize,
        z: f64,
    ) -> Result<Vec<PhysicalId>, ModelError> {
        let placements = ring_placements(distance, n_bars, z)?;
        let bar = self.make_lead_glass_bar(self.dims.bar_cross_section, self.dims.bar_length, "lg_bar")?;
        info!("lg_bar: {} bars on a ring of radius {} mm at z = {} mm", n_bars, distance, z);
        placements
            .into_iter()
            .enumerate()
            .map(|(i, placement)| self.place_named(bar, placement, &format!("lg_bar_pv_{}", i)))
            .collect()
    }

    // ── Lead absorber ──────────────────────────────────────────────────

    pub fn make_lead_cube_dump(&mut self, size: f64, name: &str) -> Result<LogicalId, ModelError> {
        let solid = Solid::new_box(format!("{}_solid", name), size, size, size);
        let material = Material::predefined(&self.materials.lead_cube)?;
        self.logical(name, solid, material)
    }

    pub fn place_lead_cube_dump(
        &mut self,
        cube: LogicalId,
        z: f64,
        name: &str,
    ) -> Result<PhysicalId, ModelError> {
        info!("{}: lead cube at z = {} mm", name, z);
        self.place(cube, Placement::on_axis(z), name)
    }

    // ── Helpers ────────────────────────────────────────────────────────

    fn logical(
        &mut self,
        name: &str,
        solid: Solid,
        material: impl Into<Material>,
    ) -> Result<LogicalId, ModelError> {
        let solid = self.registry.add_solid(solid)?;
        let material = self.registry.add_material(material)?;
        let lv = self
            .registry
            .add_logical_volume(&format!("{}_lv", name), solid, material)?;
        Ok(lv)
    }

    /// Place as `{name}_pv`.
    fn place(
        &mut self,
        lv: LogicalId,
        placement: Placement,
        name: &str,
    ) -> Result<PhysicalId, ModelError> {
        self.place_named(lv, placement, &format!("{}_pv", name))
    }

    fn place_named(
        &mut self,
        lv: LogicalId,
        placement: Placement,
        pv_name: &str,
    ) -> Result<PhysicalId, ModelError> {
        let world = self.world.ok_or_else(|| ModelError::WorldRequired {
            component: pv_name.to_string(),
        })?;
        debug!("placing {} at {:?}", pv_name, placement.position);
        Ok(self
            .registry
            .add_physical_volume(pv_name, lv, world, placement)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_setup_registry_defines_constants() {
        let (reg, defines) = setup_registry().unwrap();
        assert_eq!(reg.evaluate(&defines.zero).unwrap(), 0.0);
        assert_relative_eq!(reg.evaluate(&defines.twopi).unwrap(), TAU);
        assert_eq!(reg.constants()[1].expression, "2*pi");
    }

    #[test]
    fn test_ring_placements_closed_form() {
        let ring = ring_placements(462.0, 8, 0.0).unwrap();
        assert_eq!(ring.len(), 8);
        assert_relative_eq!(ring[0].position[0], 462.0);
        assert_relative_eq!(ring[2].position[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(ring[2].position[1], 462.0, epsilon = 1e-9);
        assert_relative_eq!(ring[2].rotation[2], -FRAC_PI_2, epsilon = 1e-12);
        for p in &ring {
            let r = p.position[0].hypot(p.position[1]);
            assert_relative_eq!(r, 462.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_ring_requires_bars() {
        assert_eq!(ring_placements(10.0, 0, 0.0), Err(DimensionError::NoBars));
        assert!(ring_placements(-1.0, 4, 0.0).is_err());
    }

    #[test]
    fn test_zero_radius_ring_is_allowed() {
        let ring = ring_placements(0.0, 3, 5.0).unwrap();
        assert!(ring.iter().all(|p| p.position == [0.0, 0.0, 5.0]));
    }

    #[test]
    fn test_placement_without_world_fails() {
        let dims = DumpDimensions::default();
        let materials = ModelMaterials::default();
        let mut builder = DumpBuilder::new(&dims, &materials).unwrap();
        let cyl = builder.make_cylinder("lead_cyl").unwrap();
        let err = builder.place_cylinder(cyl, 0.0, "lead_cyl").unwrap_err();
        assert!(matches!(err, ModelError::WorldRequired { ref component } if component == "lead_cyl_pv"));
    }

    #[test]
    fn test_cylinder_uses_named_constants() {
        let dims = DumpDimensions::default();
        let materials = ModelMaterials::default();
        let mut builder = DumpBuilder::new(&dims, &materials).unwrap();
        let cyl = builder.make_cylinder("lead_cyl").unwrap();
        let reg = builder.registry();
        let lv = reg.logical(cyl).unwrap();
        assert_eq!(lv.name, "lead_cyl_lv");
        let solid = reg.solid(lv.solid).unwrap();
        assert_eq!(solid.name, "lead_cyl_solid");
        match &solid.kind {
            beamdump_geometry::SolidKind::Tube { rmin, delta_phi, .. } => {
                assert_eq!(rmin, &Expr::constant("zero"));
                assert_eq!(delta_phi, &Expr::constant("twopi"));
            }
            other => panic!("expected a tube, got {:?}", other),
        }
    }

    #[test]
    fn test_bars_share_one_logical_volume() {
        let dims = DumpDimensions::default();
        let materials = ModelMaterials::default();
        let mut builder = DumpBuilder::new(&dims, &materials).unwrap();
        builder.make_world().unwrap();
        let pvs = builder.place_calorimeter_bars(462.0, 8, 0.0).unwrap();
        assert_eq!(pvs.len(), 8);
        let reg = builder.finish();
        let bar = reg.find_logical("lg_bar_lv").unwrap();
        for (i, pv) in pvs.iter().enumerate() {
            let pv = reg.physical(*pv).unwrap();
            assert_eq!(pv.logical, bar);
            assert_eq!(pv.name, format!("lg_bar_pv_{}", i));
        }
    }
}
