//! Full model assembly.

use beamdump_geometry::{GeometryError, Registry};
use beamdump_materials::{nist, MaterialError};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builders::DumpBuilder;
use crate::dimensions::{DimensionError, DumpDimensions};
use crate::toggles::BuildToggles;

/// Errors raised while configuring or assembling the model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid dimensions: {0}")]
    Dimension(#[from] DimensionError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Material error: {0}")]
    Material(#[from] MaterialError),

    #[error("Cannot place '{component}' without a world volume")]
    WorldRequired { component: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// NIST material identifiers for the single-material components. The
/// calorimeter bars are always TF1 lead glass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelMaterials {
    pub world: String,
    pub cylinder: String,
    pub pipe: String,
    pub argon: String,
    pub lead_cube: String,
}

impl Default for ModelMaterials {
    fn default() -> Self {
        Self {
            world: "G4_Galactic".into(),
            cylinder: "G4_GRAPHITE".into(),
            pipe: "G4_STAINLESS-STEEL".into(),
            argon: "G4_Ar".into(),
            lead_cube: "G4_Pb".into(),
        }
    }
}

impl ModelMaterials {
    /// Every identifier must name a known NIST material.
    pub fn validate(&self) -> Result<(), MaterialError> {
        for name in [
            &self.world,
            &self.cylinder,
            &self.pipe,
            &self.argon,
            &self.lead_cube,
        ] {
            nist::lookup(name)?;
        }
        Ok(())
    }
}

/// Build the beam dump.
///
/// Components are created in a fixed order (world, leading window, second
/// window, pipe, argon fill, bars, lead cube) so that the registry and the
/// GDML written from it are reproducible. Disabled components are skipped
/// entirely; enabling any placed component without the world is an error.
pub fn build_model(
    dims: &DumpDimensions,
    materials: &ModelMaterials,
    toggles: &BuildToggles,
) -> Result<Registry, ModelError> {
    dims.validate()?;
    materials.validate()?;

    if !toggles.world {
        if let Some(component) = toggles.placed_components().first() {
            return Err(ModelError::WorldRequired {
                component: component.to_string(),
            });
        }
    }

    let mut builder = DumpBuilder::new(dims, materials)?;

    if toggles.world {
        builder.make_world()?;
    }
    if toggles.leading_cylinder {
        let lv = builder.make_cylinder("lead_cyl")?;
        builder.place_cylinder(lv, dims.leading_cylinder_z, "lead_cyl")?;
    }
    if toggles.second_cylinder {
        let lv = builder.make_cylinder("sec_cyl")?;
        builder.place_cylinder(lv, dims.second_cylinder_z(), "sec_cyl")?;
    }
    if toggles.pipe {
        let lv = builder.make_pipe("window_pipe")?;
        builder.place_pipe(lv, "window_pipe")?;
    }
    if toggles.argon_pipe {
        let lv = builder.make_argon_pipe("argon_pipe")?;
        builder.place_argon_pipe(lv, "argon_pipe")?;
    }
    if toggles.lead_glass_bars {
        builder.place_calorimeter_bars(dims.bar_ring_radius(), dims.n_bars, dims.bar_ring_z)?;
    }
    if toggles.lead_cube_dump {
        let lv = builder.make_lead_cube_dump(dims.lead_cube_size, "lead_cube_dump")?;
        builder.place_lead_cube_dump(lv, dims.lead_cube_z(), "lead_cube_dump")?;
    }

    let registry = builder.finish();
    info!(
        "model built: {} solids, {} materials, {} placements",
        registry.solids().len(),
        registry.materials().len(),
        registry.physical_volumes().count()
    );
    Ok(registry)
}
